//! Seam continuity between consecutive runs.

use super::Positioned;
use crate::intercept::Intercept;

/// Points kept before the seam. Two pieces overlap every segment, so the
/// segment ending at the seam depends on two points before it.
const POINTS_BEFORE_SEAM: usize = 2;
const POINTS_AFTER_SEAM: usize = 2;

/// Control points carried from one run to the next.
///
/// Holds the minimal suffix of the previous run around its seam, in the
/// previous run's coordinates. The next run shifts it back by the seam
/// position so the new curve starts exactly where the old one ended.
#[derive(Debug, Clone, Default)]
pub struct PreviousRunState {
    suffix: Vec<Intercept>,
    seam: f64,
}

impl PreviousRunState {
    /// Captures the suffix of positioned `points` around `seam`.
    ///
    /// Keeps two points before the seam and two at or after it. Synthetic
    /// pad points are never carried over.
    pub fn capture(points: &[Intercept], seam: f64) -> Self {
        let real: Vec<&Intercept> = points.iter().filter(|p| !p.is_pad()).collect();
        let cut = real.partition_point(|p| p.adjusted_x < seam);
        let start = cut.saturating_sub(POINTS_BEFORE_SEAM);
        let end = (cut + POINTS_AFTER_SEAM).min(real.len());
        Self {
            suffix: real[start..end].iter().map(|p| (*p).clone()).collect(),
            seam,
        }
    }

    /// Seam position in the previous run's coordinates.
    pub fn seam(&self) -> f64 {
        self.seam
    }

    /// Captured points, in the previous run's coordinates.
    pub fn suffix(&self) -> &[Intercept] {
        &self.suffix
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.suffix.is_empty()
    }
}

/// Replaces the start of `points` with the previous run's seam suffix.
pub(super) fn adjust(points: Vec<Intercept>, previous: Option<&PreviousRunState>) -> Positioned {
    let Some(previous) = previous.filter(|p| !p.is_empty()) else {
        return Positioned::sorted(points);
    };

    let mut chained: Vec<Intercept> = previous
        .suffix
        .iter()
        .map(|p| p.shifted(-previous.seam))
        .collect();
    let boundary = chained
        .last()
        .map_or(f64::NEG_INFINITY, |p| p.adjusted_x);

    chained.extend(points.into_iter().filter(|p| p.adjusted_x > boundary));
    Positioned::sorted(chained)
}
