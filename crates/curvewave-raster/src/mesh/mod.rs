//! Mesh cells and the morph space they span.
//!
//! The mesh itself is owned outside the rasterizer. This module only models
//! what the rasterizer reads from it: cells whose eight corners carry values
//! across the six dimensions, and an optional path reference that enables
//! path deformation for the control points a cell produces.
//!
//! ```text
//!  corner bits: time = bit 0, red = bit 1, blue = bit 2
//!
//!        6 -------- 7
//!       /|         /|
//!      4 -------- 5 |      blue
//!      | 2 -------|-3       ^  red
//!      |/         |/        | /
//!      0 -------- 1         +---> time
//! ```

mod interpolator;

pub use interpolator::Interpolator;

use std::sync::Arc;

/// One of the six values stored per vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Morph axis: time.
    Time,
    /// Morph axis: red.
    Red,
    /// Morph axis: blue.
    Blue,
    /// Control point phase.
    Phase,
    /// Control point amplitude.
    Amp,
    /// Control point sharpness.
    Curve,
}

/// The three axes of morph space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphAxis {
    /// Time axis.
    Time,
    /// Red axis.
    Red,
    /// Blue axis.
    Blue,
}

impl MorphAxis {
    /// Vertex dimension holding this axis.
    pub fn dim(self) -> Dim {
        match self {
            MorphAxis::Time => Dim::Time,
            MorphAxis::Red => Dim::Red,
            MorphAxis::Blue => Dim::Blue,
        }
    }

    /// Corner-index bit selecting the upper side of this axis.
    fn corner_bit(self) -> usize {
        match self {
            MorphAxis::Time => 1,
            MorphAxis::Red => 2,
            MorphAxis::Blue => 4,
        }
    }

    /// All morph axes in corner-bit order.
    pub const ALL: [MorphAxis; 3] = [MorphAxis::Time, MorphAxis::Red, MorphAxis::Blue];
}

/// A position in morph space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphPosition {
    /// Time coordinate.
    pub time: f64,
    /// Red coordinate.
    pub red: f64,
    /// Blue coordinate.
    pub blue: f64,
}

impl MorphPosition {
    /// Creates a morph position.
    pub fn new(time: f64, red: f64, blue: f64) -> Self {
        Self { time, red, blue }
    }

    /// Coordinate along one axis.
    pub fn get(&self, axis: MorphAxis) -> f64 {
        match axis {
            MorphAxis::Time => self.time,
            MorphAxis::Red => self.red,
            MorphAxis::Blue => self.blue,
        }
    }
}

/// A mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Time coordinate.
    pub time: f64,
    /// Red coordinate.
    pub red: f64,
    /// Blue coordinate.
    pub blue: f64,
    /// Phase (0.0 to 1.0).
    pub phase: f64,
    /// Amplitude (0.0 to 1.0 before scaling).
    pub amp: f64,
    /// Sharpness (0.0 to 1.0).
    pub curve: f64,
}

impl Vertex {
    /// Creates a vertex.
    pub fn new(time: f64, red: f64, blue: f64, phase: f64, amp: f64, curve: f64) -> Self {
        Self {
            time,
            red,
            blue,
            phase,
            amp,
            curve,
        }
    }

    /// Value along one dimension.
    pub fn get(&self, dim: Dim) -> f64 {
        match dim {
            Dim::Time => self.time,
            Dim::Red => self.red,
            Dim::Blue => self.blue,
            Dim::Phase => self.phase,
            Dim::Amp => self.amp,
            Dim::Curve => self.curve,
        }
    }

    fn scaled_add(&mut self, other: &Vertex, weight: f64) {
        self.time += other.time * weight;
        self.red += other.red * weight;
        self.blue += other.blue * weight;
        self.phase += other.phase * weight;
        self.amp += other.amp * weight;
        self.curve += other.curve * weight;
    }
}

/// Path reference attached to a mesh cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPath {
    /// Path table channel.
    pub channel: usize,
    /// Morph axis along which path progress is measured.
    pub axis: MorphAxis,
    /// Gain applied to jitter added to phase.
    pub phase_gain: f64,
    /// Gain applied to jitter added to amplitude.
    pub amp_gain: f64,
}

/// A cube of eight vertices spanning a box of morph space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCell {
    corners: [Vertex; 8],
    path: Option<CellPath>,
}

impl MeshCell {
    /// Creates a cell from its corners, ordered by corner bits.
    pub fn new(corners: [Vertex; 8]) -> Self {
        Self {
            corners,
            path: None,
        }
    }

    /// Creates a cell whose corners share one phase/amp/curve value, spanning
    /// `[lo, hi]` on every morph axis.
    pub fn uniform(lo: MorphPosition, hi: MorphPosition, phase: f64, amp: f64, curve: f64) -> Self {
        let corners = std::array::from_fn(|corner| {
            let pick = |axis: MorphAxis| {
                if corner & axis.corner_bit() != 0 {
                    hi.get(axis)
                } else {
                    lo.get(axis)
                }
            };
            Vertex::new(
                pick(MorphAxis::Time),
                pick(MorphAxis::Red),
                pick(MorphAxis::Blue),
                phase,
                amp,
                curve,
            )
        });
        Self::new(corners)
    }

    /// Attaches a path reference.
    pub fn with_path(mut self, path: CellPath) -> Self {
        self.path = Some(path);
        self
    }

    /// Cell corners.
    pub fn corners(&self) -> &[Vertex; 8] {
        &self.corners
    }

    /// Mutable corner access for editors.
    pub fn corner_mut(&mut self, corner: usize) -> Option<&mut Vertex> {
        self.corners.get_mut(corner)
    }

    /// Path reference, if any.
    pub fn path(&self) -> Option<CellPath> {
        self.path
    }

    /// Extent `(min, max)` of the cell along a morph axis.
    pub fn extent(&self, axis: MorphAxis) -> (f64, f64) {
        let dim = axis.dim();
        self.corners
            .iter()
            .map(|v| v.get(dim))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Whether the morph position lies inside the cell's box.
    pub fn contains(&self, morph: &MorphPosition) -> bool {
        MorphAxis::ALL.iter().all(|&axis| {
            let (lo, hi) = self.extent(axis);
            let v = morph.get(axis);
            v >= lo && v <= hi
        })
    }

    /// Fraction of the way through the cell along `axis`, in [0, 1].
    /// Zero-width extents report 0.
    pub fn progress(&self, axis: MorphAxis, morph: &MorphPosition) -> f64 {
        let (lo, hi) = self.extent(axis);
        let width = hi - lo;
        if width <= f64::EPSILON {
            return 0.0;
        }
        ((morph.get(axis) - lo) / width).clamp(0.0, 1.0)
    }

    /// Trilinear interpolation of all corner values at a morph position.
    pub fn interpolate(&self, morph: &MorphPosition) -> Vertex {
        let fractions = MorphAxis::ALL.map(|axis| self.progress(axis, morph));
        let mut out = Vertex::default();
        for (corner, vertex) in self.corners.iter().enumerate() {
            let weight = MorphAxis::ALL
                .iter()
                .zip(fractions.iter())
                .map(|(axis, &f)| {
                    if corner & axis.corner_bit() != 0 {
                        f
                    } else {
                        1.0 - f
                    }
                })
                .product::<f64>();
            out.scaled_add(vertex, weight);
        }
        out
    }
}

/// Source of the cells overlapping a morph position.
pub trait MeshProvider {
    /// Returns every cell whose box contains `morph`.
    fn cells_at(&self, morph: &MorphPosition) -> Vec<Arc<MeshCell>>;
}

/// An immutable snapshot of mesh cells.
#[derive(Debug, Clone, Default)]
pub struct MeshSnapshot {
    cells: Vec<Arc<MeshCell>>,
}

impl MeshSnapshot {
    /// Creates a snapshot from cells.
    pub fn new(cells: Vec<MeshCell>) -> Self {
        Self {
            cells: cells.into_iter().map(Arc::new).collect(),
        }
    }

    /// Adds a cell.
    pub fn push(&mut self, cell: MeshCell) {
        self.cells.push(Arc::new(cell));
    }

    /// All cells.
    pub fn cells(&self) -> &[Arc<MeshCell>] {
        &self.cells
    }
}

impl MeshProvider for MeshSnapshot {
    fn cells_at(&self, morph: &MorphPosition) -> Vec<Arc<MeshCell>> {
        self.cells
            .iter()
            .filter(|cell| cell.contains(morph))
            .cloned()
            .collect()
    }
}
