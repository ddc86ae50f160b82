//! Crossfade weights between overlapping curve pieces.

use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

/// Number of entries in the transfer table.
pub const TRANSFER_TABLE_SIZE: usize = 64;

static SHARED: OnceLock<Arc<TransferTable>> = OnceLock::new();

/// Raised-cosine ramp from exactly 0 to exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferTable {
    weights: [f64; TRANSFER_TABLE_SIZE],
}

impl TransferTable {
    /// Builds a fresh table.
    pub fn build() -> Self {
        let last = (TRANSFER_TABLE_SIZE - 1) as f64;
        let weights = std::array::from_fn(|i| 0.5 - 0.5 * (PI * i as f64 / last).cos());
        let mut table = Self { weights };
        table.weights[0] = 0.0;
        table.weights[TRANSFER_TABLE_SIZE - 1] = 1.0;
        table
    }

    /// Shared instance, built on first use.
    ///
    /// The build runs exactly once per process; concurrent first callers
    /// block until it finishes and then receive the same table.
    pub fn shared() -> Arc<Self> {
        SHARED.get_or_init(|| Arc::new(Self::build())).clone()
    }

    /// Weight of the incoming piece at `progress` (0.0 to 1.0) through the
    /// overlap.
    pub fn weight(&self, progress: f64) -> f64 {
        let pos = progress.clamp(0.0, 1.0) * (TRANSFER_TABLE_SIZE - 1) as f64;
        let idx = pos.floor() as usize;
        if idx >= TRANSFER_TABLE_SIZE - 1 {
            return self.weights[TRANSFER_TABLE_SIZE - 1];
        }
        let frac = pos - idx as f64;
        self.weights[idx] + (self.weights[idx + 1] - self.weights[idx]) * frac
    }

    /// Raw table entries.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
