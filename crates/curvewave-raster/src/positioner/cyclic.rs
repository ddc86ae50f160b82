//! Periodic wrapping.

use super::Positioned;
use crate::intercept::Intercept;

/// Copies made on each side before the margin test may stop wrapping.
pub const MIN_WRAP_ITERATIONS: usize = 2;

/// Extends both ends with copies of the opposite end shifted by whole
/// periods.
///
/// Each side keeps copying (walking backwards through the list for the
/// front, forwards for the back, one period further per pass) until at
/// least [`MIN_WRAP_ITERATIONS`] copies were made and the distance covered
/// exceeds `padding`.
pub(super) fn adjust(points: Vec<Intercept>, padding: f64) -> Positioned {
    let n = points.len();
    if n == 0 {
        return Positioned::sorted(points);
    }
    debug_assert!(
        points
            .iter()
            .all(|p| (-1e-9..=1.0 + 1e-9).contains(&p.adjusted_x)),
        "cyclic wrap expects phases within [0, 1]"
    );

    let first_x = points[0].adjusted_x;
    let last_x = points[n - 1].adjusted_x;

    let mut front = Vec::new();
    for k in 0.. {
        let period = (k / n + 1) as f64;
        let copy = points[n - 1 - k % n].shifted(-period);
        let margin = first_x - copy.adjusted_x;
        front.push(copy);
        if k + 1 >= MIN_WRAP_ITERATIONS && margin > padding {
            break;
        }
    }
    front.reverse();

    let mut back = Vec::new();
    for k in 0.. {
        let period = (k / n + 1) as f64;
        let copy = points[k % n].shifted(period);
        let margin = copy.adjusted_x - last_x;
        back.push(copy);
        if k + 1 >= MIN_WRAP_ITERATIONS && margin > padding {
            break;
        }
    }

    let mut wrapped = front;
    wrapped.extend(points);
    wrapped.extend(back);

    // Points at exactly 0 and 1 produce coincident copies.
    Positioned::unsorted(wrapped)
}
