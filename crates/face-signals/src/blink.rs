//! Blink detection
//!
//! An eye is closed when its eyelid gap falls below a fraction of the face
//! height. A blink is counted only on the frame where both eyes go from open
//! to closed together; one-eyed closures are ignored and a held closure is
//! counted once, since both eyes must reopen before the next count.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::landmarks::FaceLandmarks;

/// Per-session eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkState {
    pub left_eye_open: bool,
    pub right_eye_open: bool,
    pub blink_count: u32,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self {
            left_eye_open: true,
            right_eye_open: true,
            blink_count: 0,
        }
    }
}

/// Debounced two-eye blink counter
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    eyelid_factor: f64,
    state: BlinkState,
}

impl BlinkDetector {
    pub fn new(eyelid_factor: f64) -> Self {
        Self {
            eyelid_factor,
            state: BlinkState::default(),
        }
    }

    /// Feed one frame; returns true when a blink was counted
    pub fn update(&mut self, face: &FaceLandmarks) -> bool {
        self.update_gaps(face.left_eye_gap(), face.right_eye_gap(), face.face_height())
    }

    /// Feed raw eyelid gaps and the face-height reference
    pub fn update_gaps(&mut self, left_gap: f64, right_gap: f64, face_height: f64) -> bool {
        let threshold = face_height * self.eyelid_factor;
        let left_closed = left_gap < threshold;
        let right_closed = right_gap < threshold;

        let both_were_open = self.state.left_eye_open && self.state.right_eye_open;
        let blink = both_were_open && left_closed && right_closed;
        if blink {
            self.state.blink_count += 1;
            debug!("Blink detected (count: {})", self.state.blink_count);
        }

        self.state.left_eye_open = !left_closed;
        self.state.right_eye_open = !right_closed;
        blink
    }

    pub fn state(&self) -> BlinkState {
        self.state
    }

    pub fn blink_count(&self) -> u32 {
        self.state.blink_count
    }

    /// Blinks per minute over a session of `duration_secs`
    pub fn blink_rate(&self, duration_secs: f64) -> f64 {
        blink_rate(self.state.blink_count, duration_secs)
    }

    pub fn reset(&mut self) {
        self.state = BlinkState::default();
    }
}

/// Blinks per minute over `duration_secs` (0.0 for a zero duration)
pub fn blink_rate(count: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    // Multiply first: keeps whole-minute fractions exact (count * 2 at 30 s)
    count as f64 * 60.0 / duration_secs
}
