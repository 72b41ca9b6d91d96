//! Screening configuration

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use face_signals::SignalConfig;
use risk_scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::SessionError;

/// Environment variable prefix (`PD_SCREEN__SESSION_DURATION_SECS=20`)
pub const ENV_PREFIX: &str = "PD_SCREEN";

/// Screening configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Recording window (seconds); also the blink-rate denominator
    pub session_duration_secs: u64,

    /// Frames allowed in flight between detector and session
    pub frame_buffer: usize,

    /// Signal extraction thresholds
    pub signals: SignalConfig,

    /// Band tables and level cut-offs
    pub scoring: ScoringConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            session_duration_secs: 30,
            frame_buffer: 1,
            signals: SignalConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Create a config with a shorter or longer recording window
    pub fn with_duration(session_duration_secs: u64) -> Self {
        Self {
            session_duration_secs,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.session_duration_secs == 0 {
            return Err(SessionError::Config(
                "session_duration_secs must be at least 1".into(),
            ));
        }
        if self.frame_buffer == 0 {
            return Err(SessionError::Config("frame_buffer must be at least 1".into()));
        }
        self.signals.validate()?;
        self.scoring.validate()?;
        Ok(())
    }

    /// Load defaults, then an optional file, then `PD_SCREEN__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading screening configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: ScreeningConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text without consulting the environment
    pub fn parse(text: &str, format: FileFormat) -> Result<Self, SessionError> {
        let config: ScreeningConfig = Config::builder()
            .add_source(File::from_str(text, format))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
