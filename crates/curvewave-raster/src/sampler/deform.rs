//! Path-deformed regions of the sampled waveform.

use crate::curve::CurvePiece;

/// A contiguous sample range whose pieces share one path channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformRegion {
    /// First sample index.
    pub start: usize,
    /// One past the last sample index.
    pub end: usize,
    /// Path channel.
    pub channel: usize,
    /// Gain applied to the path jitter.
    pub amplitude: f64,
}

impl DeformRegion {
    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the region covers no samples.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Progress (0.0 to 1.0) of phase `x` through the region, or `None` when
    /// `x` lies outside it.
    pub fn progress(&self, wave_x: &[f64], x: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let lo = wave_x[self.start];
        let hi = wave_x[self.end - 1];
        if x < lo || x > hi {
            return None;
        }
        if hi <= lo {
            return Some(0.0);
        }
        Some((x - lo) / (hi - lo))
    }
}

/// Groups consecutive deformed pieces sharing a channel into regions.
///
/// Piece `k` feeds segments `k` and `k + 1`, so a run of pieces
/// `first..=last` covers samples `segment_starts[first]` to
/// `segment_starts[last + 2]`.
pub(super) fn regions_from_pieces(pieces: &[CurvePiece], segment_starts: &[usize]) -> Vec<DeformRegion> {
    let mut regions = Vec::new();
    let mut k = 0;
    while k < pieces.len() {
        let Some(path) = pieces[k].path() else {
            k += 1;
            continue;
        };
        let first = k;
        while k + 1 < pieces.len() && pieces[k + 1].path().map(|p| p.channel) == Some(path.channel) {
            k += 1;
        }
        let last = k;
        k += 1;

        let start = segment_starts[first];
        let end = segment_starts[(last + 2).min(segment_starts.len() - 1)];
        if end > start {
            regions.push(DeformRegion {
                start,
                end,
                channel: path.channel,
                amplitude: path.amp_gain,
            });
        }
    }
    regions
}
