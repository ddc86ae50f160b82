//! Curve piece generation from positioned control points.

use std::ops::Range;

use tracing::debug;

use crate::curve::{CurvePiece, BASE_RESOLUTION};
use crate::intercept::Intercept;
use crate::params::{RasterizerParameters, ScalingType};
use crate::tables::{CurveletTable, NUM_RESOLUTIONS};

/// Largest x spacing between piece samples before a finer level is used.
pub const MAX_SAMPLE_SPACING: f64 = 1.0 / 256.0;

/// Piece count above which low-resolution mode drops to the coarsest level.
pub const LOW_RESOLUTION_PIECES: usize = 16;

/// Builds [`CurvePiece`]s from overlapping triplets of control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveGenerator {
    scaling: ScalingType,
    interpolate: bool,
    low_resolution: bool,
}

impl Default for CurveGenerator {
    fn default() -> Self {
        Self::from_params(&RasterizerParameters::default())
    }
}

impl CurveGenerator {
    /// Generator configured from pipeline parameters.
    pub fn from_params(params: &RasterizerParameters) -> Self {
        Self {
            scaling: params.scaling,
            interpolate: params.interpolate_curves,
            low_resolution: params.low_resolution,
        }
    }

    /// Emits one piece per triplet `(p[k], p[k+1], p[k+2])`.
    ///
    /// Returns an empty list for fewer than three points.
    pub fn generate(&self, points: &[Intercept], table: &CurveletTable) -> Vec<CurvePiece> {
        if points.len() < 3 {
            debug!("generate: {} points, no pieces", points.len());
            return Vec::new();
        }
        let count = points.len() - 2;
        let mut pieces: Vec<CurvePiece> = (0..count).map(|k| self.piece(points, k)).collect();
        for piece in &mut pieces {
            piece.recalculate(table, self.interpolate);
        }

        debug!(
            "generate: {} points -> {} pieces (levels {:?})",
            points.len(),
            count,
            level_histogram(&pieces)
        );
        pieces
    }

    /// Rebuilds `pieces[window]` from `points`, leaving the rest untouched.
    ///
    /// `points` must be the full positioned list the pieces were generated
    /// from, so `pieces.len() == points.len() - 2`.
    pub fn regenerate_window(
        &self,
        points: &[Intercept],
        pieces: &mut [CurvePiece],
        window: Range<usize>,
        table: &CurveletTable,
    ) {
        debug_assert_eq!(pieces.len() + 2, points.len());
        let end = window.end.min(pieces.len());
        for k in window.start..end {
            let mut piece = self.piece(points, k);
            piece.recalculate(table, self.interpolate);
            pieces[k] = piece;
        }
    }

    /// Pieces that must be regenerated after `points[index]` changed.
    ///
    /// Pieces `index - 2 ..= index` contain the point. A piece's level also
    /// reads the points one step outside its triplet, and the boundary
    /// pieces copy their inner neighbor's level, so pieces
    /// `index - 3 ..= index + 1` and both ends are included whenever their
    /// level no longer matches.
    pub fn dirty_window(&self, points: &[Intercept], pieces: &[CurvePiece], index: usize) -> Range<usize> {
        let count = pieces.len();
        if count == 0 || points.len() != count + 2 {
            return 0..count;
        }

        let mut start = index.saturating_sub(2).min(count - 1);
        let mut end = (index + 1).min(count);
        let near = index.saturating_sub(3).min(count - 1)..=(index + 1).min(count - 1);
        for k in near.chain([0, count - 1]) {
            if self.level(points, k) != pieces[k].level() {
                start = start.min(k);
                end = end.max(k + 1);
            }
        }
        start..end
    }

    /// Unrecalculated piece `k` with its level and sharpness decided.
    fn piece(&self, points: &[Intercept], k: usize) -> CurvePiece {
        let count = points.len() - 2;
        let scale = |p: &Intercept| {
            let mut p = p.clone();
            p.y = self.scaling.apply(p.y);
            p
        };
        let mut piece = CurvePiece::new(scale(&points[k]), scale(&points[k + 1]), scale(&points[k + 2]));
        piece.set_level(self.level(points, k));

        // Keep deformed regions from bleeding into their ordinary neighbors.
        let deformed = |k: usize| points[k + 1].path().is_some();
        if !deformed(k) && ((k > 0 && deformed(k - 1)) || (k + 1 < count && deformed(k + 1))) {
            piece.b.shp = 1.0;
        }
        piece
    }

    /// Resolution level of piece `k`.
    fn level(&self, points: &[Intercept], k: usize) -> usize {
        let count = points.len() - 2;
        if self.low_resolution && count > LOW_RESOLUTION_PIECES {
            return NUM_RESOLUTIONS - 1;
        }

        let span = if count < 3 {
            points[points.len() - 1].adjusted_x - points[0].adjusted_x
        } else {
            // Boundary pieces take their interior neighbor's level.
            let k = k.clamp(1, count - 2);
            points[k + 3].adjusted_x - points[k - 1].adjusted_x
        };
        level_for_span(span)
    }
}

/// Coarsest level whose sample spacing over `span` stays within
/// [`MAX_SAMPLE_SPACING`].
pub fn level_for_span(span: f64) -> usize {
    if !span.is_finite() || span <= 0.0 {
        return 0;
    }
    (0..NUM_RESOLUTIONS)
        .rev()
        .find(|&level| span * (1usize << level) as f64 / BASE_RESOLUTION as f64 <= MAX_SAMPLE_SPACING)
        .unwrap_or(0)
}

fn level_histogram(pieces: &[CurvePiece]) -> [usize; NUM_RESOLUTIONS] {
    let mut counts = [0; NUM_RESOLUTIONS];
    for piece in pieces {
        counts[piece.level()] += 1;
    }
    counts
}
