//! Flat padding for clamped curves.

use super::Positioned;
use crate::intercept::Intercept;

/// Smallest distance a pad point is placed from the boundary.
const MIN_PAD_DISTANCE: f64 = 1e-3;

/// Adds a flat copy of each boundary point `padding` beyond it.
pub(super) fn adjust(mut points: Vec<Intercept>, padding: f64) -> Positioned {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Positioned::sorted(points);
    };
    let distance = padding.max(MIN_PAD_DISTANCE);

    let mut front = first.shifted(-distance);
    front.shp = 0.0;
    front.cell = None;
    front.pad_before = true;

    let mut back = last.shifted(distance);
    back.shp = 0.0;
    back.cell = None;
    back.pad_after = true;

    points.insert(0, front);
    points.push(back);
    Positioned::sorted(points)
}
