//! Rasterizer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, RasterResult};
use crate::path::NoiseContext;

/// Largest padding accepted by [`RasterizerParameters::validate`].
pub const MAX_PADDING: f64 = 8.0;

/// Padding applied when the configured value is not usable.
pub const DEFAULT_PADDING: f64 = 0.25;

/// How control-point amplitudes map onto output amplitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingType {
    /// Amplitudes are used as-is (0 to 1).
    #[default]
    Unipolar,
    /// Amplitudes map from 0..1 to -1..1.
    Bipolar,
    /// Amplitudes shift down to -0.5..0.5.
    HalfBipolar,
}

impl ScalingType {
    /// Scales an amplitude. Non-finite input is treated as the midline.
    pub fn apply(self, y: f64) -> f64 {
        let y = if y.is_finite() { y } else { 0.5 };
        match self {
            ScalingType::Unipolar => y,
            ScalingType::Bipolar => 2.0 * y - 1.0,
            ScalingType::HalfBipolar => y - 0.5,
        }
    }
}

/// Where path-deformation jitter is applied to the sampled waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeformMode {
    /// Jitter is baked into the waveform when it is built.
    #[default]
    Inline,
    /// Jitter regions are stored and evaluated per sample, so the noise seed
    /// can change without rebuilding geometry.
    Lazy,
}

/// Parameters for one rasterizer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RasterizerParameters {
    /// Periodic waveform wrapping at x = 1 (oscillators) rather than a
    /// clamped one (envelopes).
    #[serde(default = "default_true")]
    pub cyclic: bool,
    /// Amplitude scaling applied during curve generation.
    #[serde(default)]
    pub scaling: ScalingType,
    /// Phase margin of extra points generated beyond each end.
    #[serde(default = "default_padding")]
    pub padding: f64,
    /// Blend bracketing curvelets for smooth sharpness morphing.
    #[serde(default = "default_true")]
    pub interpolate_curves: bool,
    /// Force coarse detail on dense curves (interactive editing).
    #[serde(default)]
    pub low_resolution: bool,
    /// Starting phase of the buffer phase walk.
    #[serde(default)]
    pub osc_phase: f64,
    /// Control point after which an envelope holds its sustain level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustain_index: Option<usize>,
    /// Path-deformation strategy for the sampled waveform.
    #[serde(default)]
    pub deform_mode: DeformMode,
    /// Seed offset into the path noise tables.
    #[serde(default)]
    pub noise_seed: u32,
    /// Amount of noise mixed into path jitter (0.0 to 1.0).
    #[serde(default)]
    pub noise_amount: f64,
}

fn default_true() -> bool {
    true
}

fn default_padding() -> f64 {
    DEFAULT_PADDING
}

impl Default for RasterizerParameters {
    fn default() -> Self {
        Self {
            cyclic: true,
            scaling: ScalingType::default(),
            padding: DEFAULT_PADDING,
            interpolate_curves: true,
            low_resolution: false,
            osc_phase: 0.0,
            sustain_index: None,
            deform_mode: DeformMode::default(),
            noise_seed: 0,
            noise_amount: 0.0,
        }
    }
}

impl RasterizerParameters {
    /// Parameters for a periodic oscillator waveform.
    pub fn oscillator(scaling: ScalingType) -> Self {
        Self {
            cyclic: true,
            scaling,
            ..Self::default()
        }
    }

    /// Parameters for a clamped envelope curve.
    pub fn envelope(sustain_index: Option<usize>) -> Self {
        Self {
            cyclic: false,
            scaling: ScalingType::Unipolar,
            sustain_index,
            ..Self::default()
        }
    }

    /// Parses parameters from JSON.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    ///
    /// # Arguments
    /// * `json` - A JSON object with parameter fields
    ///
    /// # Returns
    /// The parsed parameters, or [`RasterError::Json`] on malformed input
    pub fn from_json(json: &str) -> RasterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes parameters to pretty-printed JSON.
    pub fn to_json(&self) -> RasterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks value ranges. The pipeline tolerates bad values, but callers
    /// loading presets can reject them up front.
    pub fn validate(&self) -> RasterResult<()> {
        if !self.padding.is_finite() || self.padding < 0.0 || self.padding > MAX_PADDING {
            return Err(RasterError::invalid_param(
                "padding",
                format!("must be within 0..={MAX_PADDING}, got {}", self.padding),
            ));
        }
        if !self.osc_phase.is_finite() {
            return Err(RasterError::invalid_param("osc_phase", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.noise_amount) {
            return Err(RasterError::invalid_param(
                "noise_amount",
                format!("must be within 0..=1, got {}", self.noise_amount),
            ));
        }
        if self.cyclic && self.sustain_index.is_some() {
            return Err(RasterError::invalid_param(
                "sustain_index",
                "sustain only applies to non-cyclic curves",
            ));
        }
        Ok(())
    }

    /// Padding with unusable values replaced by the default.
    pub fn effective_padding(&self) -> f64 {
        if self.padding.is_finite() && self.padding >= 0.0 {
            self.padding.min(MAX_PADDING)
        } else {
            DEFAULT_PADDING
        }
    }

    /// Noise settings for path jitter.
    pub fn noise(&self) -> NoiseContext {
        NoiseContext {
            seed: self.noise_seed,
            amount: self.noise_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaling() {
        assert_eq!(ScalingType::Unipolar.apply(0.25), 0.25);
        assert_eq!(ScalingType::Bipolar.apply(0.25), -0.5);
        assert_eq!(ScalingType::HalfBipolar.apply(0.25), -0.25);
        assert_eq!(ScalingType::Bipolar.apply(f64::NAN), 0.0);
        assert_eq!(ScalingType::Unipolar.apply(f64::INFINITY), 0.5);
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let params = RasterizerParameters::from_json("{}").unwrap();
        assert_eq!(params, RasterizerParameters::default());
    }

    #[test]
    fn test_json_roundtrip_with_enums() {
        let json = r#"{
            "cyclic": false,
            "scaling": "half_bipolar",
            "deform_mode": "lazy",
            "sustain_index": 2
        }"#;
        let params = RasterizerParameters::from_json(json).unwrap();
        assert!(!params.cyclic);
        assert_eq!(params.scaling, ScalingType::HalfBipolar);
        assert_eq!(params.deform_mode, DeformMode::Lazy);
        assert_eq!(params.sustain_index, Some(2));

        let back = RasterizerParameters::from_json(&params.to_json().unwrap()).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = RasterizerParameters::from_json(r#"{"resolution": 4}"#).unwrap_err();
        assert_eq!(err.code(), "RASTER_003");
    }

    #[test]
    fn test_validate() {
        assert!(RasterizerParameters::default().validate().is_ok());
        assert!(RasterizerParameters::envelope(Some(1)).validate().is_ok());

        let bad_padding = RasterizerParameters {
            padding: f64::NAN,
            ..Default::default()
        };
        assert!(bad_padding.validate().is_err());
        assert_eq!(bad_padding.effective_padding(), DEFAULT_PADDING);

        let cyclic_sustain = RasterizerParameters {
            sustain_index: Some(1),
            ..Default::default()
        };
        assert!(cyclic_sustain.validate().is_err());
    }
}
