//! Screening Session
//!
//! Runs one fixed-duration facial screening session:
//! - Aggregates per-frame signals with warm-up trimming and fallbacks
//! - Scores the session once and delivers the result exactly once
//! - Drives sessions from an async frame stream with a 1 Hz countdown
//! - Encodes results for a host environment

pub mod aggregator;
pub mod config;
pub mod host;
pub mod result;
pub mod runner;
pub mod session;

pub use aggregator::{FrameOutcome, LiveSnapshot, SessionAggregator, SessionSummary};
pub use config::ScreeningConfig;
pub use host::{decode_kv, encode_kv, HostBridge, HostFormat, HostMessage};
pub use result::SessionResult;
pub use runner::{SessionHandle, SessionProgress, SessionRunner, StopReason};
pub use session::ScreeningSession;

use face_signals::SignalError;
use risk_scoring::ScoringError;
use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading failed: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Result encoding failed: {0}")]
    Encode(String),

    #[error("Result decoding failed: {0}")]
    Decode(String),

    #[error("Session already finalized")]
    AlreadyFinalized,

    #[error("Session task failed: {0}")]
    Task(String),
}
