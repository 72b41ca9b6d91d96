//! Best-effort breathing and heart-rate estimates
//!
//! Both are proxies read from incidental facial micro-motion, not
//! measurements:
//! - Breathing: time between large nose-tip vertical steps.
//! - Heart rate: count of above-average pulse samples in a sliding window of
//!   nose/cheek displacement, `peaks * 4` clamped to [55, 120] bpm. This
//!   mapping has no physiological derivation; it is kept bit-exact so
//!   results stay comparable across versions.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::SignalConfig;
use crate::landmarks::{FaceLandmarks, Point3};
use crate::window::SlidingWindow;

/// Live vitals; `None` means not yet determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Breaths per minute
    pub breathing_rate: Option<f64>,
    /// Beats per minute (unvalidated proxy)
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct BreathTrack {
    nose_y: f64,
    extremum_ms: u64,
}

/// Breathing and heart-rate estimator state for one session
#[derive(Debug, Clone)]
pub struct VitalsEstimator {
    breath_amplitude: f64,
    breath_amplitude_scale: f64,
    breath_min_interval_ms: u64,
    heart_peak_ratio: f64,
    heart_peak_multiplier: f64,
    heart_rate_min: f64,
    heart_rate_max: f64,

    breath: Option<BreathTrack>,
    breathing_rate: Option<f64>,
    heart_window: SlidingWindow<f64>,
    previous_pulse: Option<[Point3; 3]>,
    heart_rate: Option<f64>,
}

impl VitalsEstimator {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            breath_amplitude: config.breath_amplitude,
            breath_amplitude_scale: config.breath_amplitude_scale,
            breath_min_interval_ms: config.breath_min_interval_ms,
            heart_peak_ratio: config.heart_peak_ratio,
            heart_peak_multiplier: config.heart_peak_multiplier,
            heart_rate_min: config.heart_rate_min,
            heart_rate_max: config.heart_rate_max,
            breath: None,
            breathing_rate: None,
            heart_window: SlidingWindow::new(config.heart_window),
            previous_pulse: None,
            heart_rate: None,
        }
    }

    /// Feed one frame into both estimators
    pub fn update(&mut self, face: &FaceLandmarks) -> Vitals {
        self.update_breathing(face.nose_tip.y, face.timestamp_ms);
        self.update_heart(face.pulse_points());
        self.vitals()
    }

    /// Track nose-tip height; a large step after the minimum interval sets
    /// the rate from the time since the previous counted step.
    pub fn update_breathing(&mut self, nose_y: f64, timestamp_ms: u64) -> Option<f64> {
        let Some(track) = self.breath.as_mut() else {
            self.breath = Some(BreathTrack {
                nose_y,
                extremum_ms: timestamp_ms,
            });
            return None;
        };

        let dy = (nose_y - track.nose_y) * self.breath_amplitude_scale;
        if dy.abs() > self.breath_amplitude {
            let elapsed_ms = timestamp_ms.saturating_sub(track.extremum_ms);
            if elapsed_ms > self.breath_min_interval_ms {
                let rate = 60_000.0 / elapsed_ms as f64;
                debug!("Breathing extremum after {} ms: {:.1}/min", elapsed_ms, rate);
                self.breathing_rate = Some(rate);
                track.extremum_ms = timestamp_ms;
            }
        }
        track.nose_y = nose_y;
        self.breathing_rate
    }

    /// Push the summed displacement of the pulse points; once the window is
    /// full, re-derive the heart rate from its peak count.
    pub fn update_heart(&mut self, points: [Point3; 3]) -> Option<f64> {
        if let Some(previous) = self.previous_pulse {
            let pulse: f64 = points
                .iter()
                .zip(previous.iter())
                .map(|(c, p)| c.distance_2d(p))
                .sum();
            self.push_pulse(pulse);
        }
        self.previous_pulse = Some(points);
        self.heart_rate
    }

    /// Push one pulse sample directly
    pub fn push_pulse(&mut self, pulse: f64) -> Option<f64> {
        self.heart_window.push(pulse);
        if self.heart_window.is_full() {
            let cutoff = self.heart_window.mean() * self.heart_peak_ratio;
            let peaks = self.heart_window.iter().filter(|&&v| v > cutoff).count();
            let rate = heart_rate_from_peaks(
                peaks,
                self.heart_peak_multiplier,
                self.heart_rate_min,
                self.heart_rate_max,
            );
            if self.heart_rate != Some(rate) {
                debug!("Heart-rate proxy: {} peaks -> {} bpm", peaks, rate);
            }
            self.heart_rate = Some(rate);
        }
        self.heart_rate
    }

    pub fn vitals(&self) -> Vitals {
        Vitals {
            breathing_rate: self.breathing_rate,
            heart_rate: self.heart_rate,
        }
    }

    pub fn heart_window_len(&self) -> usize {
        self.heart_window.len()
    }

    pub fn reset(&mut self) {
        self.breath = None;
        self.breathing_rate = None;
        self.heart_window.clear();
        self.previous_pulse = None;
        self.heart_rate = None;
    }
}

/// `peaks * multiplier` clamped to `[min, max]`
pub fn heart_rate_from_peaks(peaks: usize, multiplier: f64, min: f64, max: f64) -> f64 {
    (peaks as f64 * multiplier).clamp(min, max)
}
