//! Curvelet shapes indexed by sharpness.
//!
//! A curvelet is a monotonic shape `g: [0, 1] -> [0, 1]` with
//! `g(1 - s) = 1 - g(s)`. Curvelet 0 is the identity ramp. For higher
//! indices the lower half follows a circular arc joining (0, 0) and (1, 1)
//! whose half-angle grows with the index up to a quarter circle, so the
//! transition concentrates around the midpoint. The upper half is the
//! mirror image of the lower one.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, SQRT_2};
use std::sync::{Arc, OnceLock};

/// Number of curvelets per resolution level.
pub const NUM_CURVELETS: usize = 128;

/// Number of resolution levels.
pub const NUM_RESOLUTIONS: usize = 3;

/// Samples per curvelet at level 0. Level `r` has `CURVELET_RESOLUTION >> r`.
pub const CURVELET_RESOLUTION: usize = 64;

static SHARED: OnceLock<Arc<CurveletTable>> = OnceLock::new();

/// Lookup table of curvelets for every resolution level.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveletTable {
    rows: Vec<Vec<f64>>,
}

impl CurveletTable {
    /// Builds a fresh table.
    pub fn build() -> Self {
        let mut rows = Vec::with_capacity(NUM_RESOLUTIONS * NUM_CURVELETS);
        for level in 0..NUM_RESOLUTIONS {
            let size = Self::row_len(level);
            for index in 0..NUM_CURVELETS {
                let mut row = vec![0.0; size];
                fill_curvelet(index, &mut row);
                rows.push(row);
            }
        }
        Self { rows }
    }

    /// Shared instance, built on first use.
    ///
    /// The build runs exactly once per process; concurrent first callers
    /// block until it finishes and then receive the same table.
    pub fn shared() -> Arc<Self> {
        SHARED.get_or_init(|| Arc::new(Self::build())).clone()
    }

    /// Number of samples in a row at `level`.
    pub fn row_len(level: usize) -> usize {
        CURVELET_RESOLUTION >> level.min(NUM_RESOLUTIONS - 1)
    }

    /// Curvelet `index` at `level`. Out-of-range arguments are clamped.
    pub fn row(&self, level: usize, index: usize) -> &[f64] {
        let level = level.min(NUM_RESOLUTIONS - 1);
        let index = index.min(NUM_CURVELETS - 1);
        &self.rows[level * NUM_CURVELETS + index]
    }
}

/// Fills one curvelet row.
fn fill_curvelet(index: usize, row: &mut [f64]) {
    let n = row.len();
    let last = (n - 1) as f64;

    if index == 0 {
        for (j, v) in row.iter_mut().enumerate() {
            *v = j as f64 / last;
        }
        return;
    }

    let half_angle = index as f64 / (NUM_CURVELETS - 1) as f64 * FRAC_PI_4;
    let half_chord = 0.5 * SQRT_2;
    let radius = half_chord / half_angle.sin();
    // Arc center sits on the diagonal's perpendicular bisector, upper-left side.
    let center_offset = half_chord / half_angle.tan();
    let center_x = 0.5 - center_offset * FRAC_1_SQRT_2;
    let center_y = 0.5 + center_offset * FRAC_1_SQRT_2;

    let half = n / 2;
    for j in 0..half {
        let w = 2.0 * j as f64 / last;
        let angle = ((w - center_x) / radius).clamp(-1.0, 1.0).acos();
        let h = center_y - radius * angle.sin();
        row[j] = 0.5 * h.clamp(0.0, 1.0);
    }
    for j in 0..half {
        row[n - 1 - j] = 1.0 - row[j];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curvelet_zero_is_identity() {
        let table = CurveletTable::build();
        for level in 0..NUM_RESOLUTIONS {
            let row = table.row(level, 0);
            let last = (row.len() - 1) as f64;
            for (j, &v) in row.iter().enumerate() {
                assert!((v - j as f64 / last).abs() < 1e-12, "level {level} sample {j}");
            }
        }
    }

    #[test]
    fn test_row_lengths() {
        let table = CurveletTable::build();
        assert_eq!(table.row(0, 5).len(), 64);
        assert_eq!(table.row(1, 5).len(), 32);
        assert_eq!(table.row(2, 5).len(), 16);
        assert_eq!(table.row(9, 500).len(), 16);
    }

    #[test]
    fn test_curvelets_mirror_and_monotonic() {
        let table = CurveletTable::build();
        for level in 0..NUM_RESOLUTIONS {
            for index in 0..NUM_CURVELETS {
                let row = table.row(level, index);
                let n = row.len();
                assert!(row[0].abs() < 1e-9);
                assert!((row[n - 1] - 1.0).abs() < 1e-9);
                for j in 0..n {
                    assert!((row[n - 1 - j] - (1.0 - row[j])).abs() < 1e-12);
                }
                for pair in row.windows(2) {
                    assert!(pair[1] >= pair[0] - 1e-12, "level {level} curvelet {index}");
                }
            }
        }
    }

    #[test]
    fn test_sharper_curvelets_hug_the_ends() {
        let table = CurveletTable::build();
        let quarter = CURVELET_RESOLUTION / 4;
        let soft = table.row(0, 10)[quarter];
        let sharp = table.row(0, 127)[quarter];
        assert!(sharp < soft);
        assert!(soft < table.row(0, 0)[quarter]);
    }

    #[test]
    fn test_shared_is_memoized() {
        let a = CurveletTable::shared();
        let b = CurveletTable::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_shared_survives_last_holder() {
        let first = Arc::as_ptr(&CurveletTable::shared());
        // Every caller-side handle is gone here; the table is not rebuilt.
        let again = CurveletTable::shared();
        assert_eq!(Arc::as_ptr(&again), first);
        assert!(Arc::strong_count(&again) >= 2);
    }
}
