//! Landmark frames and the named subset the signals read

use serde::{Deserialize, Serialize};
use crate::SignalError;

/// A single face-mesh point (x, y normalized to image size, z relative depth)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar (x, y) distance to another point
    pub fn distance_2d(&self, other: &Point3) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detector output: the full point set for a video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture timestamp (milliseconds, monotonically increasing)
    pub timestamp_ms: u64,
    /// Face-mesh points; empty when no face was detected
    #[serde(default)]
    pub points: Vec<Point3>,
}

impl LandmarkFrame {
    pub fn new(timestamp_ms: u64, points: Vec<Point3>) -> Self {
        Self { timestamp_ms, points }
    }

    /// Frame with no detected face
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            points: Vec::new(),
        }
    }

    pub fn has_face(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Upper bound on configurable landmark indices
pub const MAX_MESH_POINTS: usize = 1024;

/// Face-mesh indices read by the engine (defaults: 468/478-point mesh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkIndices {
    pub left_eye_upper: usize,
    pub left_eye_lower: usize,
    pub right_eye_upper: usize,
    pub right_eye_lower: usize,
    pub nose_bridge: usize,
    pub chin: usize,
    pub nose_tip: usize,
    pub mouth_left: usize,
    pub mouth_right: usize,
    pub upper_lip: usize,
    pub lower_lip: usize,
    pub left_eyebrow: usize,
    pub right_eyebrow: usize,
    pub left_cheek: usize,
    pub right_cheek: usize,
}

impl Default for LandmarkIndices {
    fn default() -> Self {
        Self {
            left_eye_upper: 159,
            left_eye_lower: 145,
            right_eye_upper: 386,
            right_eye_lower: 374,
            nose_bridge: 168,
            chin: 152,
            nose_tip: 1,
            mouth_left: 61,
            mouth_right: 291,
            upper_lip: 13,
            lower_lip: 14,
            left_eyebrow: 105,
            right_eyebrow: 334,
            left_cheek: 50,
            right_cheek: 280,
        }
    }
}

impl LandmarkIndices {
    fn all(&self) -> [usize; 15] {
        [
            self.left_eye_upper,
            self.left_eye_lower,
            self.right_eye_upper,
            self.right_eye_lower,
            self.nose_bridge,
            self.chin,
            self.nose_tip,
            self.mouth_left,
            self.mouth_right,
            self.upper_lip,
            self.lower_lip,
            self.left_eyebrow,
            self.right_eyebrow,
            self.left_cheek,
            self.right_cheek,
        ]
    }

    /// Minimum point count a frame needs for these indices
    pub fn required_points(&self) -> usize {
        self.all().iter().copied().max().unwrap_or(0).saturating_add(1)
    }

    /// Reject indices no face mesh could contain
    pub fn validate(&self) -> Result<(), SignalError> {
        match self.all().into_iter().find(|&i| i >= MAX_MESH_POINTS) {
            Some(index) => Err(SignalError::Config(format!(
                "landmark index {} outside a {}-point mesh",
                index, MAX_MESH_POINTS
            ))),
            None => Ok(()),
        }
    }

    /// Extract the named landmarks from a raw frame.
    ///
    /// `Ok(None)` means no face in this frame; the caller skips it.
    pub fn extract(&self, frame: &LandmarkFrame) -> Result<Option<FaceLandmarks>, SignalError> {
        if !frame.has_face() {
            return Ok(None);
        }

        let required = self.required_points();
        if frame.points.len() < required {
            return Err(SignalError::Topology {
                required,
                actual: frame.points.len(),
            });
        }

        if let Some(index) = self.all().into_iter().find(|&i| !frame.points[i].is_finite()) {
            return Err(SignalError::NonFinite { index });
        }

        let p = |i: usize| frame.points[i];
        Ok(Some(FaceLandmarks {
            timestamp_ms: frame.timestamp_ms,
            left_eye_upper: p(self.left_eye_upper),
            left_eye_lower: p(self.left_eye_lower),
            right_eye_upper: p(self.right_eye_upper),
            right_eye_lower: p(self.right_eye_lower),
            nose_bridge: p(self.nose_bridge),
            chin: p(self.chin),
            nose_tip: p(self.nose_tip),
            mouth_left: p(self.mouth_left),
            mouth_right: p(self.mouth_right),
            upper_lip: p(self.upper_lip),
            lower_lip: p(self.lower_lip),
            left_eyebrow: p(self.left_eyebrow),
            right_eyebrow: p(self.right_eyebrow),
            left_cheek: p(self.left_cheek),
            right_cheek: p(self.right_cheek),
        }))
    }
}

/// Named landmarks of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceLandmarks {
    pub timestamp_ms: u64,
    pub left_eye_upper: Point3,
    pub left_eye_lower: Point3,
    pub right_eye_upper: Point3,
    pub right_eye_lower: Point3,
    pub nose_bridge: Point3,
    pub chin: Point3,
    pub nose_tip: Point3,
    pub mouth_left: Point3,
    pub mouth_right: Point3,
    pub upper_lip: Point3,
    pub lower_lip: Point3,
    pub left_eyebrow: Point3,
    pub right_eyebrow: Point3,
    pub left_cheek: Point3,
    pub right_cheek: Point3,
}

impl FaceLandmarks {
    /// Left upper-to-lower eyelid gap
    pub fn left_eye_gap(&self) -> f64 {
        self.left_eye_upper.distance_2d(&self.left_eye_lower)
    }

    /// Right upper-to-lower eyelid gap
    pub fn right_eye_gap(&self) -> f64 {
        self.right_eye_upper.distance_2d(&self.right_eye_lower)
    }

    /// Nose bridge to chin, the scale reference for eyelid gaps
    pub fn face_height(&self) -> f64 {
        self.nose_bridge.distance_2d(&self.chin)
    }

    /// Mouth, lips, eyebrows and cheeks: the voluntary-movement subset
    pub fn expressive(&self) -> [Point3; 8] {
        [
            self.mouth_left,
            self.mouth_right,
            self.upper_lip,
            self.lower_lip,
            self.left_eyebrow,
            self.right_eyebrow,
            self.left_cheek,
            self.right_cheek,
        ]
    }

    /// Left/right pairs compared for asymmetry
    pub fn bilateral_pairs(&self) -> [(Point3, Point3); 3] {
        [
            (self.mouth_left, self.mouth_right),
            (self.left_eyebrow, self.right_eyebrow),
            (self.left_cheek, self.right_cheek),
        ]
    }

    /// Nose tip and cheeks, whose micro-motion feeds the pulse proxy
    pub fn pulse_points(&self) -> [Point3; 3] {
        [self.nose_tip, self.left_cheek, self.right_cheek]
    }
}
