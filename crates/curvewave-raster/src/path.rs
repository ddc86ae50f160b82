//! Curve-path jitter sources.
//!
//! A path is a reusable precomputed shape, addressed by channel, that
//! deforms control points and waveform regions. [`PathTables`] is the
//! in-crate provider: one smoothed random-walk shape plus one white-noise
//! table per channel, generated deterministically from a seed.

use std::fmt;

use rand::Rng;

use crate::rng::create_channel_rng;

/// Samples per path shape.
pub const PATH_TABLE_SIZE: usize = 256;

/// Samples per path noise table.
pub const NOISE_TABLE_SIZE: usize = 1024;

/// Smoothing passes applied to the random walk.
const SMOOTHING_PASSES: usize = 4;

/// Noise settings for a jitter query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseContext {
    /// Offset into the noise table.
    pub seed: u32,
    /// Noise mixed on top of the path shape (0.0 to 1.0).
    pub amount: f64,
}

/// Provider of path jitter.
///
/// `jitter` is called per sample on the audio thread in lazy deformation
/// mode, so implementations must not allocate or block.
pub trait PathProvider: Send + Sync + fmt::Debug {
    /// Jitter of `channel` at `progress` (0.0 to 1.0). Unknown channels
    /// return 0.
    fn jitter(&self, channel: usize, progress: f64, noise: NoiseContext) -> f64;

    /// Adds the path shape resampled to `dest.len()` points, plus noise, to
    /// `dest`, scaled by `amplitude`.
    fn sample_down_and_add_noise(
        &self,
        channel: usize,
        dest: &mut [f64],
        amplitude: f64,
        noise: NoiseContext,
    ) {
        let len = dest.len();
        if len == 0 {
            return;
        }
        let last = (len.max(2) - 1) as f64;
        for (i, sample) in dest.iter_mut().enumerate() {
            *sample += amplitude * self.jitter(channel, i as f64 / last, noise);
        }
    }
}

/// One channel of path data.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTable {
    shape: Vec<f64>,
    noise: Vec<f64>,
}

impl PathTable {
    /// Creates a table from explicit shape and noise data.
    pub fn new(shape: Vec<f64>, noise: Vec<f64>) -> Self {
        Self { shape, noise }
    }

    /// Generates a smoothed random walk normalized to [-1, 1] and a white
    /// noise table.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut walk = Vec::with_capacity(PATH_TABLE_SIZE);
        let mut value = 0.0;
        for _ in 0..PATH_TABLE_SIZE {
            value += rng.gen_range(-1.0..1.0);
            walk.push(value);
        }

        for _ in 0..SMOOTHING_PASSES {
            let prev = walk.clone();
            for i in 1..PATH_TABLE_SIZE - 1 {
                walk[i] = 0.25 * prev[i - 1] + 0.5 * prev[i] + 0.25 * prev[i + 1];
            }
        }

        // Remove the trend so both ends sit at zero, then normalize.
        let first = walk[0];
        let last = walk[PATH_TABLE_SIZE - 1];
        let span = (PATH_TABLE_SIZE - 1) as f64;
        for (i, v) in walk.iter_mut().enumerate() {
            *v -= first + (last - first) * i as f64 / span;
        }
        let peak = walk.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if peak > 0.0 {
            for v in &mut walk {
                *v /= peak;
            }
        }

        let noise = (0..NOISE_TABLE_SIZE)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        Self { shape: walk, noise }
    }

    /// Shape value at `progress`, linearly interpolated.
    pub fn shape_at(&self, progress: f64) -> f64 {
        match self.shape.len() {
            0 => 0.0,
            1 => self.shape[0],
            len => {
                let pos = progress.clamp(0.0, 1.0) * (len - 1) as f64;
                let idx = (pos.floor() as usize).min(len - 2);
                let frac = pos - idx as f64;
                self.shape[idx] + (self.shape[idx + 1] - self.shape[idx]) * frac
            }
        }
    }

    /// Noise value at `progress`, offset by the noise seed.
    pub fn noise_at(&self, progress: f64, seed: u32) -> f64 {
        let len = self.noise.len();
        if len == 0 {
            return 0.0;
        }
        let idx = (progress.clamp(0.0, 1.0) * (len - 1) as f64) as usize;
        self.noise[(idx + seed as usize) % len]
    }
}

/// Seeded collection of path tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathTables {
    tables: Vec<PathTable>,
}

impl PathTables {
    /// Creates a collection from explicit tables.
    pub fn new(tables: Vec<PathTable>) -> Self {
        Self { tables }
    }

    /// Generates path tables for every channel.
    ///
    /// # Arguments
    /// * `base_seed` - Seed from which each channel's seed is derived
    /// * `channels` - Number of channels to generate
    ///
    /// # Returns
    /// One table per channel, identical for identical arguments
    pub fn generate(base_seed: u32, channels: usize) -> Self {
        let tables = (0..channels)
            .map(|channel| PathTable::generate(&mut create_channel_rng(base_seed, channel as u32)))
            .collect();
        Self { tables }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if there are no channels.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table for a channel.
    pub fn table(&self, channel: usize) -> Option<&PathTable> {
        self.tables.get(channel)
    }
}

impl PathProvider for PathTables {
    fn jitter(&self, channel: usize, progress: f64, noise: NoiseContext) -> f64 {
        let Some(table) = self.tables.get(channel) else {
            return 0.0;
        };
        let shape = table.shape_at(progress);
        if noise.amount == 0.0 {
            return shape;
        }
        shape + noise.amount * table.noise_at(progress, noise.seed)
    }
}
