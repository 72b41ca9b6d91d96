//! Left/right asymmetry sampling

use crate::landmarks::FaceLandmarks;
use crate::trimmed_mean;

/// Per-frame bilateral height difference accumulator.
///
/// Samples are taken on the same frames as motion samples: the first frame
/// of a session only primes the accumulator.
#[derive(Debug, Clone, Default)]
pub struct AsymmetryAccumulator {
    primed: bool,
    samples: Vec<f64>,
}

impl AsymmetryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean `|left.y - right.y|` over mouth corners, eyebrows and cheeks
    pub fn sample(face: &FaceLandmarks) -> f64 {
        let pairs = face.bilateral_pairs();
        let total: f64 = pairs.iter().map(|(l, r)| (l.y - r.y).abs()).sum();
        total / pairs.len() as f64
    }

    /// Feed one frame; returns the new sample unless this is the first frame
    pub fn update(&mut self, face: &FaceLandmarks) -> Option<f64> {
        if !self.primed {
            self.primed = true;
            return None;
        }
        let sample = Self::sample(face);
        self.samples.push(sample);
        Some(sample)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Mean asymmetry after the warm-up trim, `fallback` when none remain
    pub fn asymmetry(&self, warmup_trim: usize, fallback: f64) -> f64 {
        trimmed_mean(&self.samples, warmup_trim).unwrap_or(fallback)
    }

    pub fn reset(&mut self) {
        self.primed = false;
        self.samples.clear();
    }
}
