//! Envelope sustain hold.

use super::Positioned;
use crate::intercept::Intercept;
use crate::params::RasterizerParameters;

/// Longest gap between the sustain point and its inserted hold point.
pub const SUSTAIN_HOLD: f64 = 0.05;

/// Sustain levels at or above this get a hold point.
pub const SUSTAIN_THRESHOLD: f64 = 0.5;

/// Inserts a sharp copy of the sustain point just after it, so the curve
/// stays level for a moment before heading to the release.
pub(super) fn adjust(mut points: Vec<Intercept>, params: &RasterizerParameters) -> Positioned {
    if params.cyclic {
        return Positioned::sorted(points);
    }
    let Some(index) = params.sustain_index else {
        return Positioned::sorted(points);
    };
    let (Some(sustain), Some(next)) = (points.get(index), points.get(index + 1)) else {
        return Positioned::sorted(points);
    };
    if sustain.y < SUSTAIN_THRESHOLD {
        return Positioned::sorted(points);
    }

    let gap = SUSTAIN_HOLD.min(0.5 * (next.adjusted_x - sustain.adjusted_x));
    let mut hold = Intercept::new(sustain.x + gap, sustain.y, 1.0);
    hold.adjusted_x = sustain.adjusted_x + gap;
    hold.cell = sustain.cell.clone();

    points.insert(index + 1, hold);
    Positioned::unsorted(points)
}
