//! Host encoding
//!
//! Two wire forms for handing a result to the embedding environment:
//! - compact `key=value;` text (`risk=62;level=high;color=red;...`)
//! - a JSON envelope carrying the session id and completion time

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use face_signals::Vitals;
use risk_scoring::{Breakdown, ColorTag, RiskLevel};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::result::SessionResult;
use crate::SessionError;

/// Encode a result as `key=value;` pairs; unset vitals have empty values
pub fn encode_kv(result: &SessionResult) -> String {
    let optional = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    format!(
        "risk={};level={};color={};blink={};motion={};asym={};breath={};heart={};",
        result.risk_percentage,
        result.level.as_str(),
        result.color_tag.as_str(),
        result.breakdown.blink_rate,
        result.breakdown.motion_score,
        result.breakdown.asymmetry,
        optional(result.vitals.breathing_rate),
        optional(result.vitals.heart_rate),
    )
}

/// Parse text produced by [`encode_kv`]
pub fn decode_kv(text: &str) -> Result<SessionResult, SessionError> {
    let mut fields = HashMap::new();
    for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| SessionError::Decode(format!("missing '=' in {:?}", pair)))?;
        fields.insert(key.trim(), value.trim());
    }

    let field = |key: &str| {
        fields
            .get(key)
            .copied()
            .ok_or_else(|| SessionError::Decode(format!("missing key {}", key)))
    };
    let number = |key: &str| -> Result<f64, SessionError> {
        let value = field(key)?;
        value
            .parse::<f64>()
            .map_err(|e| SessionError::Decode(format!("{}={}: {}", key, value, e)))
    };
    let optional = |key: &str| -> Result<Option<f64>, SessionError> {
        match fields.get(key).copied() {
            None | Some("") => Ok(None),
            Some(_) => number(key).map(Some),
        }
    };

    let risk = field("risk")?;
    let risk_percentage = risk
        .parse::<u8>()
        .ok()
        .filter(|r| *r <= 100)
        .ok_or_else(|| SessionError::Decode(format!("risk out of range: {}", risk)))?;
    let level = RiskLevel::from_str_opt(field("level")?)
        .ok_or_else(|| SessionError::Decode("unknown level".into()))?;
    let color_tag = ColorTag::from_str_opt(field("color")?)
        .ok_or_else(|| SessionError::Decode("unknown color".into()))?;

    Ok(SessionResult {
        risk_percentage,
        level,
        color_tag,
        breakdown: Breakdown {
            blink_rate: number("blink")?,
            motion_score: number("motion")?,
            asymmetry: number("asym")?,
        },
        vitals: Vitals {
            breathing_rate: optional("breath")?,
            heart_rate: optional("heart")?,
        },
    })
}

/// JSON envelope for a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    pub message_type: String,
    pub session_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub result: SessionResult,
}

impl HostMessage {
    pub const MESSAGE_TYPE: &'static str = "screening_result";

    pub fn new(session_id: Uuid, result: SessionResult) -> Self {
        Self {
            message_type: Self::MESSAGE_TYPE.to_string(),
            session_id,
            completed_at: Utc::now(),
            result,
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Encode(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        serde_json::from_str(text).map_err(|e| SessionError::Decode(e.to_string()))
    }
}

/// Wire form pushed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostFormat {
    #[default]
    Kv,
    /// [`HostMessage`] envelope
    Json,
}

impl HostFormat {
    pub fn encode(&self, session_id: Uuid, result: &SessionResult) -> Result<String, SessionError> {
        match self {
            HostFormat::Kv => Ok(encode_kv(result)),
            HostFormat::Json => HostMessage::new(session_id, *result).to_json(),
        }
    }
}

/// One-shot channel to the host environment
#[derive(Debug)]
pub struct HostBridge {
    format: HostFormat,
    sender: Option<oneshot::Sender<String>>,
}

impl HostBridge {
    pub fn new(format: HostFormat) -> (Self, oneshot::Receiver<String>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                format,
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn format(&self) -> HostFormat {
        self.format
    }

    pub fn is_spent(&self) -> bool {
        self.sender.is_none()
    }

    /// Send the encoded result; returns false when already sent
    pub fn push(&mut self, session_id: Uuid, result: &SessionResult) -> Result<bool, SessionError> {
        let Some(sender) = self.sender.take() else {
            debug!("Host bridge already used, dropping result for {}", session_id);
            return Ok(false);
        };
        let payload = self.format.encode(session_id, result)?;
        if sender.send(payload).is_err() {
            warn!("Host receiver dropped before result for {}", session_id);
        }
        Ok(true)
    }
}
