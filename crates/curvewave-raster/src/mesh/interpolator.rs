//! Mesh evaluation at a morph position.

use std::sync::Arc;

use tracing::debug;

use super::{MeshCell, MeshProvider, MorphPosition};
use crate::intercept::{sort_and_dedup, Intercept};

/// Evaluates every cell overlapping a morph position into one control point.
///
/// Each cell contributes the trilinear blend of its corners' phase, amplitude
/// and sharpness. The resulting list is sorted and deduplicated by phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator;

impl Interpolator {
    /// Creates an interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Produces the raw control points for `morph`.
    ///
    /// The points refer to their cells weakly. A provider that allocates
    /// fresh cells per call loses them when this returns; use
    /// [`Interpolator::interpolate_cells`] and keep the cells alive instead.
    pub fn interpolate<M: MeshProvider + ?Sized>(
        &self,
        mesh: &M,
        morph: &MorphPosition,
    ) -> Vec<Intercept> {
        self.interpolate_cells(&mesh.cells_at(morph), morph)
    }

    /// Produces the raw control points of `cells` at `morph`.
    pub fn interpolate_cells(&self, cells: &[Arc<MeshCell>], morph: &MorphPosition) -> Vec<Intercept> {
        let mut points: Vec<Intercept> = cells
            .iter()
            .map(|cell| {
                let v = cell.interpolate(morph);
                Intercept::new(v.phase, v.amp, v.curve).with_cell(cell)
            })
            .collect();
        sort_and_dedup(&mut points);

        debug!(
            "interpolate: {} cells -> {} points at {:?}",
            cells.len(),
            points.len(),
            morph
        );
        points
    }
}
