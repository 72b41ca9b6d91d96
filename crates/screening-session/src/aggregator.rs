//! Session signal aggregation

use face_signals::{
    AsymmetryAccumulator, BlinkDetector, LandmarkFrame, MotionAccumulator, SignalConfig,
    SignalError, Vitals, VitalsEstimator,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What happened to one submitted frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Signals updated; `blink` is true when this frame completed a blink
    Processed { blink: bool },
    /// No face in the frame; nothing recorded
    NoFace,
    /// Malformed frame; nothing recorded
    Rejected(SignalError),
    /// Session already finalized
    Ignored,
}

/// Live view of a running session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub blink_count: u32,
    pub vitals: Vitals,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub frames_rejected: u64,
}

/// Aggregated signals at finalize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub blink_count: u32,
    /// Blinks per minute over the configured duration
    pub blink_rate: f64,
    pub motion_score: f64,
    pub asymmetry: f64,
    pub vitals: Vitals,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub frames_rejected: u64,
    pub motion_samples: usize,
    pub asymmetry_samples: usize,
}

/// Owns every per-session accumulator
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    config: SignalConfig,
    blink: BlinkDetector,
    motion: MotionAccumulator,
    asymmetry: AsymmetryAccumulator,
    vitals: VitalsEstimator,
    frames_processed: u64,
    frames_skipped: u64,
    frames_rejected: u64,
}

impl SessionAggregator {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            blink: BlinkDetector::new(config.eyelid_factor),
            motion: MotionAccumulator::new(),
            asymmetry: AsymmetryAccumulator::new(),
            vitals: VitalsEstimator::new(&config),
            frames_processed: 0,
            frames_skipped: 0,
            frames_rejected: 0,
            config,
        }
    }

    /// Run one frame through every signal extractor
    pub fn on_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        match self.config.indices.extract(frame) {
            Ok(Some(face)) => {
                let blink = self.blink.update(&face);
                self.motion.update(&face);
                self.asymmetry.update(&face);
                self.vitals.update(&face);
                self.frames_processed += 1;

                counter!("screening_frames_processed_total").increment(1);
                if blink {
                    counter!("screening_blinks_total").increment(1);
                }
                FrameOutcome::Processed { blink }
            }
            Ok(None) => {
                self.frames_skipped += 1;
                counter!("screening_frames_skipped_total").increment(1);
                FrameOutcome::NoFace
            }
            Err(e) => {
                warn!("Rejected landmark frame at {} ms: {}", frame.timestamp_ms, e);
                self.frames_rejected += 1;
                counter!("screening_frames_rejected_total").increment(1);
                FrameOutcome::Rejected(e)
            }
        }
    }

    pub fn live(&self) -> LiveSnapshot {
        LiveSnapshot {
            blink_count: self.blink.blink_count(),
            vitals: self.vitals.vitals(),
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            frames_rejected: self.frames_rejected,
        }
    }

    /// Final rates and averages; short sessions fall back to baselines
    pub fn summarize(&self, duration_secs: f64) -> SessionSummary {
        let c = &self.config;
        SessionSummary {
            blink_count: self.blink.blink_count(),
            blink_rate: self.blink.blink_rate(duration_secs),
            motion_score: self
                .motion
                .motion_score(c.warmup_trim, c.motion_scale, c.motion_fallback_raw),
            asymmetry: self.asymmetry.asymmetry(c.warmup_trim, c.asymmetry_fallback),
            vitals: self.vitals.vitals(),
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            frames_rejected: self.frames_rejected,
            motion_samples: self.motion.samples().len(),
            asymmetry_samples: self.asymmetry.samples().len(),
        }
    }

    pub fn motion_samples(&self) -> &[f64] {
        self.motion.samples()
    }

    pub fn asymmetry_samples(&self) -> &[f64] {
        self.asymmetry.samples()
    }

    /// Discard all accumulated state
    pub fn reset(&mut self) {
        self.blink.reset();
        self.motion.reset();
        self.asymmetry.reset();
        self.vitals.reset();
        self.frames_processed = 0;
        self.frames_skipped = 0;
        self.frames_rejected = 0;
    }
}
