//! Screening result delivered once per session

use face_signals::Vitals;
use risk_scoring::{Breakdown, ColorTag, RiskAssessment, RiskLevel};
use serde::{Deserialize, Serialize};

/// Final outcome of one screening session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Rounded risk total in [0, 100]
    pub risk_percentage: u8,
    pub level: RiskLevel,
    pub color_tag: ColorTag,
    pub breakdown: Breakdown,
    /// Latest breathing and heart estimates; absent when never determined
    pub vitals: Vitals,
}

impl SessionResult {
    pub fn new(assessment: &RiskAssessment, vitals: Vitals) -> Self {
        Self {
            risk_percentage: assessment.percentage,
            level: assessment.level,
            color_tag: assessment.color,
            breakdown: assessment.breakdown,
            vitals,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.level == RiskLevel::High
    }
}
