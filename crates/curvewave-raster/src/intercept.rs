//! Control points ("intercepts") produced by evaluating the mesh.

use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use crate::mesh::{CellPath, MeshCell};

/// Two points closer than this along x are treated as duplicates.
pub const DEDUP_EPSILON: f64 = 1e-9;

/// A control point of the waveform.
#[derive(Debug, Clone, Default)]
pub struct Intercept {
    /// Phase as evaluated from the mesh.
    pub x: f64,
    /// Amplitude.
    pub y: f64,
    /// Sharpness (0.0 to 1.0).
    pub shp: f64,
    /// Phase after positioning; curve geometry is built from this.
    pub adjusted_x: f64,
    /// Synthetic flat point before the first real point.
    pub pad_before: bool,
    /// Synthetic flat point after the last real point.
    pub pad_after: bool,
    /// Phase was re-wrapped into [0, 1) by path deformation.
    pub is_wrapped: bool,
    /// Owning mesh cell.
    pub cell: Option<Weak<MeshCell>>,
}

impl Intercept {
    /// Creates a control point with no owning cell.
    pub fn new(x: f64, y: f64, shp: f64) -> Self {
        Self {
            x,
            y,
            shp: shp.clamp(0.0, 1.0),
            adjusted_x: x,
            ..Default::default()
        }
    }

    /// Attaches the owning cell.
    pub fn with_cell(mut self, cell: &Arc<MeshCell>) -> Self {
        self.cell = Some(Arc::downgrade(cell));
        self
    }

    /// Whether this is a synthetic padding point.
    pub fn is_pad(&self) -> bool {
        self.pad_before || self.pad_after
    }

    /// Owning cell, if it is still alive.
    pub fn cell(&self) -> Option<Arc<MeshCell>> {
        self.cell.as_ref().and_then(Weak::upgrade)
    }

    /// Path reference of the owning cell.
    pub fn path(&self) -> Option<CellPath> {
        self.cell().and_then(|cell| cell.path())
    }

    /// Copy moved by `offset` along x, without pad or wrap flags.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            x: self.x + offset,
            adjusted_x: self.adjusted_x + offset,
            pad_before: false,
            pad_after: false,
            is_wrapped: false,
            ..self.clone()
        }
    }
}

/// Sorts points by adjusted phase and drops near-duplicates, keeping the
/// first of each run.
pub fn sort_and_dedup(points: &mut Vec<Intercept>) {
    points.retain(|p| p.adjusted_x.is_finite());
    points.sort_by(|a, b| {
        a.adjusted_x
            .partial_cmp(&b.adjusted_x)
            .unwrap_or(Ordering::Equal)
    });
    points.dedup_by(|later, earlier| (later.adjusted_x - earlier.adjusted_x).abs() < DEDUP_EPSILON);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MorphPosition;

    #[test]
    fn test_new_clamps_sharpness() {
        assert_eq!(Intercept::new(0.0, 0.0, 2.0).shp, 1.0);
        assert_eq!(Intercept::new(0.0, 0.0, -1.0).shp, 0.0);
        assert_eq!(Intercept::new(0.3, 0.0, 0.0).adjusted_x, 0.3);
    }

    #[test]
    fn test_sort_and_dedup() {
        let mut points = vec![
            Intercept::new(0.5, 1.0, 0.0),
            Intercept::new(0.1, 0.2, 0.0),
            Intercept::new(0.5 + 1e-12, 0.0, 0.0),
            Intercept::new(f64::NAN, 0.0, 0.0),
            Intercept::new(0.9, 0.3, 0.0),
        ];
        sort_and_dedup(&mut points);
        let xs: Vec<f64> = points.iter().map(|p| p.adjusted_x).collect();
        assert_eq!(xs.len(), 3);
        assert_eq!(xs[0], 0.1);
        assert_eq!(points[1].y, 1.0);
        assert_eq!(xs[2], 0.9);
    }

    #[test]
    fn test_weak_cell_reference() {
        let cell = Arc::new(MeshCell::uniform(
            MorphPosition::new(0.0, 0.0, 0.0),
            MorphPosition::new(1.0, 1.0, 1.0),
            0.0,
            0.0,
            0.0,
        ));
        let point = Intercept::new(0.0, 0.0, 0.0).with_cell(&cell);
        assert!(point.cell().is_some());
        drop(cell);
        assert!(point.cell().is_none());
        assert!(point.path().is_none());
    }

    #[test]
    fn test_shifted_clears_flags() {
        let mut point = Intercept::new(0.2, 0.5, 0.3);
        point.pad_before = true;
        let moved = point.shifted(-1.0);
        assert!((moved.adjusted_x + 0.8).abs() < 1e-12);
        assert!(!moved.is_pad());
        assert_eq!(moved.shp, 0.3);
    }
}
