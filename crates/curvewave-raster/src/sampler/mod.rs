//! Sampling of generated curve pieces.
//!
//! ```text
//!   piece 0        |---- first ----|---- second ---|
//!   piece 1                        |---- first ----|---- second ---|
//!   segments       |       0       |       1       |       2       |
//!                                    (crossfade)
//! ```
//!
//! [`CurveSampler`] concatenates the segments into one strictly increasing
//! sample list with per-sample slopes, answers random-access queries by
//! binary search and fills audio buffers with a forward-only cursor.

mod deform;
mod waveform;

#[cfg(test)]
mod tests;

pub use deform::DeformRegion;
pub use waveform::{CurveSampler, MIN_SLOPE_DX, NEUTRAL_VALUE};
