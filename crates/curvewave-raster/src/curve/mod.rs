//! Curve pieces: the geometric primitive of the rasterizer.
//!
//! A piece spans three consecutive control points (a, b, c). Its first half
//! runs from a to b and its second half from b to c; adjacent pieces overlap
//! by one half and are crossfaded by the sampler.
//!
//! ```text
//!              b
//!            .-*-.            first half:  a -> b
//!          .'     '.          second half: b -> c
//!   a *--'-----------'--* c   chord: a -> c
//! ```

mod piece;


pub use piece::{CurvePiece, CurveTransform, BASE_RESOLUTION, NUDGE_EPSILON};
