//! Facial motion sampling (rigidity proxy)
//!
//! Each frame with a predecessor yields the mean planar displacement of the
//! expressive landmarks. Low sustained motion is the "masked face" sign.

use crate::landmarks::{FaceLandmarks, Point3};
use crate::trimmed_mean;

/// Inter-frame displacement accumulator
#[derive(Debug, Clone, Default)]
pub struct MotionAccumulator {
    previous: Option<[Point3; 8]>,
    samples: Vec<f64>,
}

impl MotionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame; returns the new sample, if a predecessor existed
    pub fn update(&mut self, face: &FaceLandmarks) -> Option<f64> {
        let current = face.expressive();
        let sample = self.previous.map(|previous| {
            let total: f64 = current
                .iter()
                .zip(previous.iter())
                .map(|(c, p)| c.distance_2d(p))
                .sum();
            total / current.len() as f64
        });
        if let Some(sample) = sample {
            self.samples.push(sample);
        }
        self.previous = Some(current);
        sample
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Mean motion after the warm-up trim, scaled into score space.
    /// `fallback_raw` stands in for the mean when no sample survives.
    pub fn motion_score(&self, warmup_trim: usize, scale: f64, fallback_raw: f64) -> f64 {
        trimmed_mean(&self.samples, warmup_trim).unwrap_or(fallback_raw) * scale
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.samples.clear();
    }
}
