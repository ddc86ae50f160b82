//! Error types for the rasterizer.
//!
//! The pipeline itself never fails: degenerate geometry degrades to an
//! unsampleable waveform. Errors are reserved for API misuse and for
//! configuration that arrives from outside the process.

use thiserror::Error;

/// Result type for rasterizer operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors reported by the rasterizer API.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Control point index outside the positioned point list.
    #[error("control point index {index} out of range for {len} points")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of positioned points.
        len: usize,
    },

    /// Parameter JSON could not be parsed or written.
    #[error("parameter JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RasterError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            RasterError::InvalidParameter { .. } => "RASTER_001",
            RasterError::IndexOutOfRange { .. } => "RASTER_002",
            RasterError::Json(_) => "RASTER_003",
        }
    }
}
