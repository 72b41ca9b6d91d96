//! Facial Signal Extraction
//!
//! Per-frame signal extraction from face-mesh landmarks:
//! - Frame normalization (named landmark subset)
//! - Blink detection (debounced, both eyes)
//! - Facial motion sampling (rigidity proxy)
//! - Left/right asymmetry sampling
//! - Best-effort breathing and heart-rate estimates

pub mod asymmetry;
pub mod blink;
pub mod config;
pub mod landmarks;
pub mod motion;
pub mod vitals;
pub mod window;

pub use asymmetry::AsymmetryAccumulator;
pub use blink::{BlinkDetector, BlinkState};
pub use config::SignalConfig;
pub use landmarks::{FaceLandmarks, LandmarkFrame, LandmarkIndices, Point3};
pub use motion::MotionAccumulator;
pub use vitals::{Vitals, VitalsEstimator};
pub use window::SlidingWindow;

use thiserror::Error;

/// Signal extraction error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Landmark topology too small: need {required} points, got {actual}")]
    Topology { required: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("Invalid signal configuration: {0}")]
    Config(String),
}

/// Mean of a slice after dropping the first `skip` values.
///
/// Returns `None` when nothing is left, so callers can apply their own
/// baseline instead of averaging an empty set.
pub fn trimmed_mean(values: &[f64], skip: usize) -> Option<f64> {
    let rest = values.get(skip..)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.iter().sum::<f64>() / rest.len() as f64)
}
