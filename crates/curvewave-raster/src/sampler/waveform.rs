//! The concatenated waveform and its query paths.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use super::deform::{regions_from_pieces, DeformRegion};
use crate::curve::CurvePiece;
use crate::params::{DeformMode, RasterizerParameters};
use crate::path::{NoiseContext, PathProvider};
use crate::tables::TransferTable;

/// Value returned by an unsampleable waveform.
pub const NEUTRAL_VALUE: f64 = 0.0;

/// Smallest x distance used as a slope denominator.
pub const MIN_SLOPE_DX: f64 = 1e-9;

/// Piecewise-linear waveform built from curve pieces.
///
/// Segment 0 is the first half of piece 0 and the last segment is the
/// second half of the last piece. Every segment in between crossfades the
/// second half of one piece into the first half of the next, which both
/// span the same pair of control points.
#[derive(Debug, Clone)]
pub struct CurveSampler {
    cyclic: bool,
    deform_mode: DeformMode,
    noise: NoiseContext,
    osc_phase: f64,
    transfer: Arc<TransferTable>,
    paths: Option<Arc<dyn PathProvider>>,

    wave_x: Vec<f64>,
    wave_y: Vec<f64>,
    slope: Vec<f64>,
    /// First sample of each segment, plus the total length.
    segment_starts: Vec<usize>,
    zero_index: usize,
    one_index: usize,
    regions: Vec<DeformRegion>,

    phase: f64,
    cursor: usize,
}

impl CurveSampler {
    /// Creates an empty, unsampleable sampler.
    pub fn new(
        params: &RasterizerParameters,
        transfer: Arc<TransferTable>,
        paths: Option<Arc<dyn PathProvider>>,
    ) -> Self {
        let mut sampler = Self {
            cyclic: params.cyclic,
            deform_mode: params.deform_mode,
            noise: params.noise(),
            osc_phase: 0.0,
            transfer,
            paths,
            wave_x: Vec::new(),
            wave_y: Vec::new(),
            slope: Vec::new(),
            segment_starts: Vec::new(),
            zero_index: 0,
            one_index: 0,
            regions: Vec::new(),
            phase: 0.0,
            cursor: 0,
        };
        sampler.configure(params);
        sampler
    }

    /// Applies new parameters. Takes effect on the next build, except the
    /// oscillator phase which is reset immediately.
    pub fn configure(&mut self, params: &RasterizerParameters) {
        self.cyclic = params.cyclic;
        self.deform_mode = params.deform_mode;
        self.noise = params.noise();
        self.osc_phase = if params.osc_phase.is_finite() {
            params.osc_phase
        } else {
            0.0
        };
        self.phase = self.osc_phase;
        self.cursor = 0;
    }

    /// Replaces the path provider used for deformation.
    pub fn set_paths(&mut self, paths: Option<Arc<dyn PathProvider>>) {
        self.paths = paths;
    }

    /// Changes the noise used by lazy deformation without a rebuild.
    pub fn set_noise(&mut self, noise: NoiseContext) {
        self.noise = noise;
    }

    /// Current noise settings.
    pub fn noise(&self) -> NoiseContext {
        self.noise
    }

    /// Moves the buffer walk to `phase`.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = if phase.is_finite() { phase } else { 0.0 };
    }

    /// Phase of the next buffer sample.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Rebuilds the whole waveform from `pieces`.
    pub fn build_from_curves(&mut self, pieces: &[CurvePiece]) {
        self.clear();
        if pieces.len() < 2 {
            debug!("build_from_curves: {} pieces, unsampleable", pieces.len());
            return;
        }

        let segments = pieces.len() + 1;
        self.segment_starts.reserve(segments + 1);
        for segment in 0..segments {
            self.segment_starts.push(self.wave_x.len());
            emit_segment(pieces, segment, &self.transfer, &mut self.wave_x, &mut self.wave_y);
        }
        self.segment_starts.push(self.wave_x.len());

        self.regions = regions_from_pieces(pieces, &self.segment_starts);
        if self.deform_mode == DeformMode::Inline {
            self.apply_inline_deformation();
        }
        self.slope = (0..self.wave_x.len().saturating_sub(1))
            .map(|i| self.slope_at(i))
            .collect();
        self.finish_build();

        debug!(
            "build_from_curves: {} pieces -> {} samples, {} deform regions",
            pieces.len(),
            self.wave_x.len(),
            self.regions.len()
        );
    }

    /// Re-emits only the segments fed by `pieces[window]` and splices them
    /// into the waveform.
    ///
    /// Falls back to a full build when the piece count changed or when
    /// deformation was baked into the samples.
    pub fn rebuild_window(&mut self, pieces: &[CurvePiece], window: Range<usize>) {
        let segments = pieces.len() + 1;
        let baked = self.deform_mode == DeformMode::Inline && !self.regions.is_empty();
        if !self.is_sampleable() || self.segment_starts.len() != segments + 1 || baked {
            self.build_from_curves(pieces);
            return;
        }
        if window.start >= window.end {
            return;
        }

        // Piece k feeds segments k and k + 1.
        let first = window.start.min(segments - 1);
        let last = window.end.min(segments - 1);
        let old = self.segment_starts[first]..self.segment_starts[last + 1];

        let mut xs = Vec::with_capacity(old.len());
        let mut ys = Vec::with_capacity(old.len());
        let mut at = old.start;
        for segment in first..=last {
            self.segment_starts[segment] = at;
            at += emit_segment(pieces, segment, &self.transfer, &mut xs, &mut ys);
        }
        let new_end = at;
        self.wave_x.splice(old.clone(), xs);
        self.wave_y.splice(old.clone(), ys);
        for start in &mut self.segment_starts[last + 1..] {
            *start = *start + new_end - old.end;
        }

        let lo = old.start.saturating_sub(1);
        let old_hi = old.end.min(self.slope.len());
        let new_hi = new_end.min(self.wave_x.len() - 1);
        let fresh: Vec<f64> = (lo..new_hi).map(|i| self.slope_at(i)).collect();
        self.slope.splice(lo..old_hi, fresh);

        self.regions = regions_from_pieces(pieces, &self.segment_starts);
        if self.deform_mode == DeformMode::Inline && !self.regions.is_empty() {
            self.build_from_curves(pieces);
            return;
        }
        self.finish_build();

        trace!(
            "rebuild_window: pieces {:?} -> samples {:?} now {}..{}",
            window,
            old,
            old.start,
            new_end
        );
    }

    /// Whether queries return waveform values rather than [`NEUTRAL_VALUE`].
    pub fn is_sampleable(&self) -> bool {
        self.wave_x.len() >= 2
    }

    /// Sample phases.
    pub fn wave_x(&self) -> &[f64] {
        &self.wave_x
    }

    /// Sample values.
    pub fn wave_y(&self) -> &[f64] {
        &self.wave_y
    }

    /// Slope between each sample and the next.
    pub fn slopes(&self) -> &[f64] {
        &self.slope
    }

    /// First sample index of each segment, followed by the sample count.
    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    /// Index of the sample nearest phase 0.
    pub fn zero_index(&self) -> usize {
        self.zero_index
    }

    /// Index of the sample nearest phase 1.
    pub fn one_index(&self) -> usize {
        self.one_index
    }

    /// Deformed regions of the current waveform.
    pub fn regions(&self) -> &[DeformRegion] {
        &self.regions
    }

    /// Value at phase `x`.
    ///
    /// Cyclic waveforms fold `x` into one period; envelopes clamp to the end
    /// values. Lazy deformation jitter is added inside deformed regions.
    ///
    /// # Arguments
    /// * `x` - Phase to read; non-finite phases read as 0
    ///
    /// # Returns
    /// The interpolated value, or [`NEUTRAL_VALUE`] when unsampleable
    pub fn sample_at(&self, x: f64) -> f64 {
        if !self.is_sampleable() {
            return NEUTRAL_VALUE;
        }
        let x = self.fold_phase(x);
        self.value_at(self.bracket(x), x)
    }

    /// Slope at phase `x`.
    pub fn slope_at_phase(&self, x: f64) -> f64 {
        if !self.is_sampleable() {
            return 0.0;
        }
        let x = self.fold_phase(x);
        self.slope[self.bracket(x)]
    }

    /// Fills `buffer` with consecutive samples, advancing the phase by
    /// `delta` per sample.
    ///
    /// Walks forward from the previous bracket and only searches again when
    /// the phase moves backwards. Each output equals [`sample_at`] at the
    /// same phase.
    ///
    /// [`sample_at`]: CurveSampler::sample_at
    pub fn sample_to_buffer(&mut self, buffer: &mut [f64], delta: f64) {
        if !self.is_sampleable() {
            buffer.fill(NEUTRAL_VALUE);
            return;
        }
        let len = self.wave_x.len();
        let mut cursor = self.cursor.min(len - 2);
        let mut phase = self.phase;

        for out in buffer.iter_mut() {
            let x = self.fold_phase(phase);
            if x < self.wave_x[cursor] {
                cursor = self.bracket(x);
            } else {
                while cursor + 2 < len && self.wave_x[cursor + 1] <= x {
                    cursor += 1;
                }
            }
            *out = self.value_at(cursor, x);
            phase = self.fold_phase(phase + delta);
        }

        self.cursor = cursor;
        self.phase = phase;
    }

    fn clear(&mut self) {
        self.wave_x.clear();
        self.wave_y.clear();
        self.slope.clear();
        self.segment_starts.clear();
        self.regions.clear();
        self.zero_index = 0;
        self.one_index = 0;
        self.cursor = 0;
    }

    fn finish_build(&mut self) {
        self.zero_index = nearest_index(&self.wave_x, 0.0);
        self.one_index = nearest_index(&self.wave_x, 1.0);
        self.cursor = self.bracket(self.fold_phase(self.phase));
    }

    fn apply_inline_deformation(&mut self) {
        let Some(paths) = self.paths.as_deref() else {
            return;
        };
        for region in &self.regions {
            paths.sample_down_and_add_noise(
                region.channel,
                &mut self.wave_y[region.start..region.end],
                region.amplitude,
                self.noise,
            );
        }
    }

    fn slope_at(&self, i: usize) -> f64 {
        let dx = (self.wave_x[i + 1] - self.wave_x[i]).max(MIN_SLOPE_DX);
        (self.wave_y[i + 1] - self.wave_y[i]) / dx
    }

    fn fold_phase(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return 0.0;
        }
        if !self.cyclic {
            return x;
        }
        let r = x.rem_euclid(1.0);
        if r >= 1.0 {
            0.0
        } else {
            r
        }
    }

    /// Largest `i <= len - 2` with `wave_x[i] <= x`, or 0.
    fn bracket(&self, x: f64) -> usize {
        self.wave_x
            .partition_point(|&v| v <= x)
            .saturating_sub(1)
            .min(self.wave_x.len() - 2)
    }

    fn value_at(&self, i: usize, x: f64) -> f64 {
        let last = self.wave_x.len() - 1;
        let base = if x <= self.wave_x[0] {
            self.wave_y[0]
        } else if x >= self.wave_x[last] {
            self.wave_y[last]
        } else {
            self.wave_y[i] + self.slope[i] * (x - self.wave_x[i])
        };
        base + self.lazy_jitter(x)
    }

    fn lazy_jitter(&self, x: f64) -> f64 {
        if self.deform_mode != DeformMode::Lazy {
            return 0.0;
        }
        let Some(paths) = self.paths.as_deref() else {
            return 0.0;
        };
        self.regions
            .iter()
            .filter_map(|region| {
                region
                    .progress(&self.wave_x, x)
                    .map(|progress| region.amplitude * paths.jitter(region.channel, progress, self.noise))
            })
            .sum()
    }
}

/// Appends the samples of one segment, dropping the joint it shares with
/// the previous segment and any sample that does not advance in x.
///
/// Returns the number of samples appended.
fn emit_segment(
    pieces: &[CurvePiece],
    segment: usize,
    transfer: &TransferTable,
    xs: &mut Vec<f64>,
    ys: &mut Vec<f64>,
) -> usize {
    let count = pieces.len();
    let before = xs.len();
    let mut push = |last: &mut f64, (x, y): (f64, f64)| {
        if x > *last {
            xs.push(x);
            ys.push(y);
            *last = x;
        }
    };

    if segment == 0 {
        let piece = &pieces[0];
        let n = piece.half_len();
        let mut last = f64::NEG_INFINITY;
        for j in 0..n {
            push(&mut last, piece.first_half_sample(j, n));
        }
    } else if segment == count {
        let piece = &pieces[count - 1];
        let n = piece.half_len();
        let mut last = piece.second_half_sample(0, n).0;
        for j in 1..n {
            push(&mut last, piece.second_half_sample(j, n));
        }
    } else {
        let outgoing = &pieces[segment - 1];
        let incoming = &pieces[segment];
        let n = outgoing.half_len().min(incoming.half_len());
        let span = (n - 1) as f64;
        let mut last = outgoing.second_half_sample(0, n).0;
        for j in 1..n {
            let w = transfer.weight(j as f64 / span);
            let (xa, ya) = outgoing.second_half_sample(j, n);
            let (xb, yb) = incoming.first_half_sample(j, n);
            push(&mut last, ((1.0 - w) * xa + w * xb, (1.0 - w) * ya + w * yb));
        }
    }
    xs.len() - before
}

/// Index of the value in sorted `xs` nearest `target`.
fn nearest_index(xs: &[f64], target: f64) -> usize {
    let i = xs.partition_point(|&v| v < target);
    if i == 0 {
        return 0;
    }
    if i >= xs.len() {
        return xs.len().saturating_sub(1);
    }
    if target - xs[i - 1] <= xs[i] - target {
        i - 1
    } else {
        i
    }
}
