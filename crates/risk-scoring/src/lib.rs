//! Risk Scoring
//!
//! Maps aggregated session signals (blink rate, motion score, asymmetry) to
//! a bounded risk percentage through three band tables, then to a level and
//! colour token. Scoring is a pure function of its inputs and configuration.

mod bands;
mod scorer;

pub use bands::{Band, BandTable, Cutoff};
pub use scorer::{
    Breakdown, ColorTag, RiskAssessment, RiskLevel, RiskPoints, RiskScorer, ScoringConfig,
};

use thiserror::Error;

/// Scoring configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("{table} band {index} has invalid points {points}")]
    InvalidPoints {
        table: &'static str,
        index: usize,
        points: f64,
    },

    #[error("{table} band {index} has a non-finite cutoff")]
    InvalidCutoff { table: &'static str, index: usize },

    #[error("Level thresholds out of order: medium {medium} > high {high}")]
    LevelOrder { medium: u8, high: u8 },
}
