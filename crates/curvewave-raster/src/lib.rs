//! Curvewave Waveform Rasterizer
//!
//! This crate turns the control points of a morphable wavetable synth into a
//! densely sampled waveform that can be read at any phase.
//!
//! # Overview
//!
//! A rasterizer run evaluates a mesh snapshot at a morph position and passes
//! the result through a fixed pipeline:
//!
//! - **Interpolation** - every mesh cell overlapping the morph position
//!   yields one control point (phase, amplitude, sharpness)
//! - **Positioning** - padding or periodic wrapping, path deformation,
//!   envelope sustain and chaining with the previous run
//! - **Curve generation** - one curve piece per triplet of control points,
//!   shaped by a precomputed curvelet chosen by the center point's sharpness
//! - **Sampling** - overlapping piece halves are crossfaded into one strictly
//!   increasing sample list with per-sample slopes
//!
//! # Determinism
//!
//! Rasterization is a pure function of the mesh snapshot, morph position and
//! parameters, apart from the explicit [`PreviousRunState`] used to chain
//! runs. Path tables are generated with PCG32, seeded per channel through
//! BLAKE3.
//!
//! # Example
//!
//! ```ignore
//! use curvewave_raster::{MeshSnapshot, MorphPosition, Rasterizer, RasterizerParameters, ScalingType};
//!
//! let mut rasterizer = Rasterizer::new(RasterizerParameters::oscillator(ScalingType::Bipolar));
//! rasterizer.run(&mesh, MorphPosition::new(0.3, 0.0, 0.5));
//!
//! let mut block = [0.0; 256];
//! rasterizer.sample_to_buffer(&mut block, 440.0 / 48_000.0);
//! ```
//!
//! # Crate Structure
//!
//! - [`Rasterizer`] - Pipeline entry point
//! - [`curve`] - Curve pieces and their affine transforms
//! - [`generator`] - Control points to curve pieces
//! - [`mesh`] - Mesh cells, morph space and the interpolator
//! - [`path`] - Path jitter providers
//! - [`positioner`] - Control-point positioning stages
//! - [`sampler`] - Waveform sampling
//! - [`tables`] - Shared curvelet and transfer tables
//! - [`rng`] - Deterministic RNG with seed derivation

pub mod curve;
pub mod error;
pub mod generator;
pub mod intercept;
pub mod mesh;
pub mod params;
pub mod path;
pub mod positioner;
pub mod rasterizer;
pub mod rng;
pub mod sampler;
pub mod tables;

// Re-export main types at crate root
pub use curve::{CurvePiece, CurveTransform};
pub use error::{RasterError, RasterResult};
pub use generator::CurveGenerator;
pub use intercept::Intercept;
pub use mesh::{CellPath, Interpolator, MeshCell, MeshProvider, MeshSnapshot, MorphAxis, MorphPosition, Vertex};
pub use params::{DeformMode, RasterizerParameters, ScalingType};
pub use path::{NoiseContext, PathProvider, PathTables};
pub use positioner::{Positioner, PreviousRunState};
pub use rasterizer::Rasterizer;
pub use sampler::{CurveSampler, DeformRegion, NEUTRAL_VALUE};
pub use tables::{CurveletTable, TransferTable};
