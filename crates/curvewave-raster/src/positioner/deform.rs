//! Path deformation of control points.

use super::{PositionContext, Positioned};
use crate::intercept::Intercept;

/// Adds path jitter to points whose owning cell references a path.
///
/// Progress along the path is the morph position's fraction through the
/// cell along the path's axis. Phase jitter that leaves [0, 1) on a cyclic
/// curve is wrapped back and the point is flagged.
pub(super) fn adjust(mut points: Vec<Intercept>, ctx: &PositionContext<'_>) -> Positioned {
    let Some(paths) = ctx.paths else {
        return Positioned::sorted(points);
    };
    let noise = ctx.params.noise();
    let cyclic = ctx.params.cyclic;

    let mut moved = false;
    for point in &mut points {
        let Some(cell) = point.cell() else {
            continue;
        };
        let Some(path) = cell.path() else {
            continue;
        };

        let progress = cell.progress(path.axis, &ctx.morph);
        let jitter = paths.jitter(path.channel, progress, noise);

        let shift = path.phase_gain * jitter;
        if shift != 0.0 {
            let mut x = point.adjusted_x + shift;
            if cyclic && !(0.0..1.0).contains(&x) {
                x = x.rem_euclid(1.0);
                point.is_wrapped = true;
            }
            point.adjusted_x = x;
            moved = true;
        }
        point.y += path.amp_gain * jitter;
    }

    if moved {
        Positioned::unsorted(points)
    } else {
        Positioned::sorted(points)
    }
}
