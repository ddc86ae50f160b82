//! Curve piece geometry.

use crate::intercept::Intercept;
use crate::mesh::CellPath;
use crate::tables::{CurveletTable, CURVELET_RESOLUTION, NUM_CURVELETS, NUM_RESOLUTIONS};

/// Samples per piece at level 0 (two curvelet-length halves).
pub const BASE_RESOLUTION: usize = 2 * CURVELET_RESOLUTION;

/// Minimum x spacing enforced inside a malformed triplet.
pub const NUDGE_EPSILON: f64 = 1e-9;

/// Affine placement of a curvelet onto a triplet.
///
/// The frame has its origin at `a` and its x axis along the chord `a -> c`.
/// `scale_y` and `shear` are magnitudes; the pole bits carry their signs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurveTransform {
    /// Chord angle in radians.
    pub rotation: f64,
    /// Chord length.
    pub scale_x: f64,
    /// Perpendicular distance from the chord to `b`.
    pub scale_y: f64,
    /// Distance along the chord from its midpoint to `b`'s projection.
    pub shear: f64,
    /// `b` lies on the left (counter-clockwise) side of the chord.
    pub pole_above: bool,
    /// The chord midpoint lies after `b`'s projection.
    pub pole_ahead: bool,
}

impl CurveTransform {
    /// Derives the transform from a triplet.
    pub fn from_triplet(a: &Intercept, b: &Intercept, c: &Intercept) -> Self {
        let dx = c.adjusted_x - a.adjusted_x;
        let dy = c.y - a.y;
        let rotation = dy.atan2(dx);
        let scale_x = dx.hypot(dy);
        let (sin, cos) = rotation.sin_cos();

        let bx = b.adjusted_x - a.adjusted_x;
        let by = b.y - a.y;
        let along = bx * cos + by * sin;
        let perpendicular = by * cos - bx * sin;
        let offset = along - 0.5 * scale_x;

        Self {
            rotation,
            scale_x,
            scale_y: perpendicular.abs(),
            shear: offset.abs(),
            pole_above: perpendicular >= 0.0,
            pole_ahead: offset < 0.0,
        }
    }

    fn perpendicular(&self) -> f64 {
        if self.pole_above {
            self.scale_y
        } else {
            -self.scale_y
        }
    }

    fn along(&self) -> f64 {
        let shear = if self.pole_ahead {
            -self.shear
        } else {
            self.shear
        };
        0.5 * self.scale_x + shear
    }

    /// Horizontal distance from `a` to `b`.
    pub fn run_to_center(&self) -> f64 {
        let (sin, cos) = self.rotation.sin_cos();
        cos * self.along() - sin * self.perpendicular()
    }

    /// Horizontal distance from `a` to `c`.
    pub fn chord_run(&self) -> f64 {
        self.scale_x * self.rotation.cos()
    }

    /// Slope of the chord.
    pub fn chord_slope(&self) -> f64 {
        self.rotation.tan()
    }

    /// Vertical distance from the chord to `b`.
    pub fn deviation(&self) -> f64 {
        self.perpendicular() / self.rotation.cos()
    }
}

/// One arc segment of the waveform, spanning three control points.
#[derive(Debug, Clone)]
pub struct CurvePiece {
    /// Start point.
    pub a: Intercept,
    /// Center point.
    pub b: Intercept,
    /// End point.
    pub c: Intercept,
    level: usize,
    path: Option<CellPath>,
    transform: CurveTransform,
    transform_x: Vec<f64>,
    transform_y: Vec<f64>,
}

impl CurvePiece {
    /// Creates a piece at level 0. Call [`CurvePiece::recalculate`] before
    /// sampling it.
    pub fn new(a: Intercept, b: Intercept, c: Intercept) -> Self {
        let path = b.path();
        Self {
            a,
            b,
            c,
            level: 0,
            path,
            transform: CurveTransform::default(),
            transform_x: Vec::new(),
            transform_y: Vec::new(),
        }
    }

    /// Resolution level (0 is finest).
    pub fn level(&self) -> usize {
        self.level
    }

    /// Sets the resolution level, clamped to the available levels.
    pub fn set_level(&mut self, level: usize) {
        self.level = level.min(NUM_RESOLUTIONS - 1);
    }

    /// Path reference of the center point's cell.
    pub fn path(&self) -> Option<CellPath> {
        self.path
    }

    /// Whether the center point is path-deformed.
    pub fn is_deformed(&self) -> bool {
        self.path.is_some()
    }

    /// Affine transform from the last recalculation.
    pub fn transform(&self) -> &CurveTransform {
        &self.transform
    }

    /// Sampled x coordinates.
    pub fn transform_x(&self) -> &[f64] {
        &self.transform_x
    }

    /// Sampled y coordinates.
    pub fn transform_y(&self) -> &[f64] {
        &self.transform_y
    }

    /// Samples per half.
    pub fn half_len(&self) -> usize {
        self.transform_x.len() / 2
    }

    /// Recomputes the transform and sample arrays from the triplet.
    pub fn recalculate(&mut self, table: &CurveletTable, interpolate: bool) {
        self.nudge();

        let size = BASE_RESOLUTION >> self.level;
        let half = size / 2;
        self.transform_x.clear();
        self.transform_x.resize(size, 0.0);
        self.transform_y.clear();
        self.transform_y.resize(size, 0.0);

        if self.a.is_pad() || self.c.is_pad() {
            self.transform = CurveTransform::default();
            self.fill_pinned(half);
            return;
        }

        let transform = CurveTransform::from_triplet(&self.a, &self.b, &self.c);
        let run_ab = transform.run_to_center();
        let run_bc = transform.chord_run() - run_ab;
        let slope = transform.chord_slope();
        let deviation = transform.deviation();

        let (lo, hi, frac) = curvelet_bracket(self.b.shp, interpolate);
        let lo_row = table.row(self.level, lo);
        let hi_row = table.row(self.level, hi);
        let shape = |j: usize| lo_row[j] + (hi_row[j] - lo_row[j]) * frac;

        let ax = self.a.adjusted_x;
        let ay = self.a.y;
        let last = (half - 1) as f64;
        for j in 0..half {
            let s = j as f64 / last;

            let run = s * run_ab;
            self.transform_x[j] = ax + run;
            self.transform_y[j] = ay + run * slope + shape(j) * deviation;

            // The curvelet mirror gives 1 - g(s) = g(1 - s).
            let run = run_ab + s * run_bc;
            self.transform_x[half + j] = ax + run;
            self.transform_y[half + j] = ay + run * slope + shape(half - 1 - j) * deviation;
        }
        self.transform = transform;
    }

    /// Sample `j` of `n` evenly spaced samples across the first half.
    pub fn first_half_sample(&self, j: usize, n: usize) -> (f64, f64) {
        self.half_sample(0, j, n)
    }

    /// Sample `j` of `n` evenly spaced samples across the second half.
    pub fn second_half_sample(&self, j: usize, n: usize) -> (f64, f64) {
        self.half_sample(self.half_len(), j, n)
    }

    fn half_sample(&self, offset: usize, j: usize, n: usize) -> (f64, f64) {
        let half = self.half_len();
        if n == half {
            return (self.transform_x[offset + j], self.transform_y[offset + j]);
        }
        let pos = j as f64 * (half - 1) as f64 / (n.max(2) - 1) as f64;
        let idx = (pos.floor() as usize).min(half - 2);
        let frac = pos - idx as f64;
        let lerp = |v: &[f64]| v[offset + idx] + (v[offset + idx + 1] - v[offset + idx]) * frac;
        (lerp(&self.transform_x), lerp(&self.transform_y))
    }

    /// Forces `a.x <= b.x <= c.x` with `a.x < c.x`.
    fn nudge(&mut self) {
        let ax = self.a.adjusted_x;
        if !(self.b.adjusted_x >= ax + NUDGE_EPSILON) {
            self.b.adjusted_x = ax + NUDGE_EPSILON;
        }
        if !(self.c.adjusted_x >= self.b.adjusted_x + NUDGE_EPSILON) {
            self.c.adjusted_x = self.b.adjusted_x + NUDGE_EPSILON;
        }
    }

    /// Flat half next to a pad marker, straight half towards the real
    /// neighbor.
    fn fill_pinned(&mut self, half: usize) {
        let (ax, bx, cx) = (self.a.adjusted_x, self.b.adjusted_x, self.c.adjusted_x);
        let by = self.b.y;
        let first_end = if self.a.is_pad() { by } else { self.a.y };
        let second_end = if self.c.is_pad() { by } else { self.c.y };
        let last = (half - 1) as f64;
        for j in 0..half {
            let s = j as f64 / last;
            self.transform_x[j] = ax + s * (bx - ax);
            self.transform_y[j] = first_end + s * (by - first_end);
            self.transform_x[half + j] = bx + s * (cx - bx);
            self.transform_y[half + j] = by + s * (second_end - by);
        }
    }
}

/// Bracketing curvelet rows and blend fraction for a sharpness.
fn curvelet_bracket(shp: f64, interpolate: bool) -> (usize, usize, f64) {
    let shp = if shp.is_finite() {
        shp.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let pos = shp * (NUM_CURVELETS - 1) as f64;
    if interpolate {
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(NUM_CURVELETS - 1);
        (lo, hi, pos - lo as f64)
    } else {
        let index = pos as usize;
        (index, index, 0.0)
    }
}
