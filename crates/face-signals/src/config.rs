//! Signal extraction configuration

use serde::{Deserialize, Serialize};
use crate::landmarks::LandmarkIndices;
use crate::SignalError;

/// Signal extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Eyelid gap threshold as a fraction of face height
    pub eyelid_factor: f64,

    /// Samples discarded at the start of a session (detector warm-up)
    pub warmup_trim: usize,

    /// Multiplier from raw displacement to motion score
    pub motion_scale: f64,

    /// Raw motion mean used when no sample survives the warm-up trim
    pub motion_fallback_raw: f64,

    /// Asymmetry used when no sample survives the warm-up trim
    pub asymmetry_fallback: f64,

    /// Heart-rate sliding window capacity (frames)
    pub heart_window: usize,

    /// A pulse sample above `mean * heart_peak_ratio` counts as a peak
    pub heart_peak_ratio: f64,

    /// Beats per minute per counted peak
    pub heart_peak_multiplier: f64,

    /// Heart-rate clamp (bpm)
    pub heart_rate_min: f64,
    pub heart_rate_max: f64,

    /// Scaled nose-tip movement that marks a breathing extremum
    pub breath_amplitude: f64,

    /// Scale applied to nose-tip movement before the amplitude check
    pub breath_amplitude_scale: f64,

    /// Minimum time between counted extrema (ms), caps the rate at 50/min
    pub breath_min_interval_ms: u64,

    /// Landmark indices into the face mesh
    pub indices: LandmarkIndices,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            eyelid_factor: 0.015,
            warmup_trim: 10,
            motion_scale: 1000.0,
            motion_fallback_raw: 1.5,
            asymmetry_fallback: 0.02,
            heart_window: 45,
            heart_peak_ratio: 1.15,
            heart_peak_multiplier: 4.0,
            heart_rate_min: 55.0,
            heart_rate_max: 120.0,
            breath_amplitude: 0.6,
            breath_amplitude_scale: 1000.0,
            breath_min_interval_ms: 1200,
            indices: LandmarkIndices::default(),
        }
    }
}

impl SignalConfig {
    /// Check thresholds for values that would make the signals meaningless
    pub fn validate(&self) -> Result<(), SignalError> {
        if !(self.eyelid_factor > 0.0) {
            return Err(SignalError::Config(format!(
                "eyelid_factor must be positive, got {}",
                self.eyelid_factor
            )));
        }
        if !(self.motion_scale > 0.0) || !(self.breath_amplitude_scale > 0.0) {
            return Err(SignalError::Config("scales must be positive".into()));
        }
        if self.heart_window == 0 {
            return Err(SignalError::Config("heart_window must be at least 1".into()));
        }
        if self.heart_rate_min > self.heart_rate_max {
            return Err(SignalError::Config(format!(
                "heart_rate_min {} exceeds heart_rate_max {}",
                self.heart_rate_min, self.heart_rate_max
            )));
        }
        self.indices.validate()?;
        Ok(())
    }
}
