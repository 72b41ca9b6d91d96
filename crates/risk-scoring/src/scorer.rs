//! Risk scorer

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::bands::BandTable;
use crate::ScoringError;

/// Risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Fixed display colour for this level
    pub fn color(&self) -> ColorTag {
        match self {
            RiskLevel::Low => ColorTag::Green,
            RiskLevel::Medium => ColorTag::Amber,
            RiskLevel::High => ColorTag::Red,
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Display colour token carried with each level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Amber,
    Red,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Green => "green",
            ColorTag::Amber => "amber",
            ColorTag::Red => "red",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "green" => Some(ColorTag::Green),
            "amber" => Some(ColorTag::Amber),
            "red" => Some(ColorTag::Red),
            _ => None,
        }
    }
}

/// Scorer inputs, carried unchanged into the result for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Blinks per minute
    pub blink_rate: f64,
    /// Scaled facial motion (rigidity proxy)
    pub motion_score: f64,
    /// Mean left/right height difference
    pub asymmetry: f64,
}

/// Points contributed by each signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPoints {
    pub blink: f64,
    pub motion: f64,
    pub asymmetry: f64,
}

impl RiskPoints {
    pub fn total(&self) -> f64 {
        self.blink + self.motion + self.asymmetry
    }
}

/// Scoring outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Rounded total in [0, 100]
    pub percentage: u8,
    pub level: RiskLevel,
    pub color: ColorTag,
    pub points: RiskPoints,
    pub breakdown: Breakdown,
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub blink_rate: BandTable,
    pub motion_score: BandTable,
    pub asymmetry: BandTable,
    /// Totals at or above this are at least Medium
    pub medium_threshold: u8,
    /// Totals at or above this are High
    pub high_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            blink_rate: BandTable::blink_rate(),
            motion_score: BandTable::motion_score(),
            asymmetry: BandTable::asymmetry(),
            medium_threshold: 20,
            high_threshold: 45,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.blink_rate.validate("blink_rate")?;
        self.motion_score.validate("motion_score")?;
        self.asymmetry.validate("asymmetry")?;
        if self.medium_threshold > self.high_threshold {
            return Err(ScoringError::LevelOrder {
                medium: self.medium_threshold,
                high: self.high_threshold,
            });
        }
        Ok(())
    }
}

/// Stateless risk scorer
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one session's aggregated signals
    pub fn score(&self, blink_rate: f64, motion_score: f64, asymmetry: f64) -> RiskAssessment {
        let points = RiskPoints {
            blink: self.config.blink_rate.points(blink_rate),
            motion: self.config.motion_score.points(motion_score),
            asymmetry: self.config.asymmetry.points(asymmetry),
        };
        let percentage = points.total().round().clamp(0.0, 100.0) as u8;
        let level = self.level(percentage);

        debug!(
            "Risk {}% ({}): blink {} + motion {} + asymmetry {}",
            percentage,
            level.as_str(),
            points.blink,
            points.motion,
            points.asymmetry
        );

        RiskAssessment {
            percentage,
            level,
            color: level.color(),
            points,
            breakdown: Breakdown {
                blink_rate,
                motion_score,
                asymmetry,
            },
        }
    }

    /// Level for a rounded total
    pub fn level(&self, percentage: u8) -> RiskLevel {
        if percentage >= self.config.high_threshold {
            RiskLevel::High
        } else if percentage >= self.config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{Band, Cutoff};

    #[test]
    fn test_scenario_a_healthy() {
        let result = RiskScorer::default().score(18.0, 3.0, 0.02);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.color, ColorTag::Green);
    }

    #[test]
    fn test_scenario_b_high() {
        let result = RiskScorer::default().score(8.0, 0.8, 0.05);
        assert_eq!(
            result.points,
            RiskPoints {
                blink: 28.0,
                motion: 26.0,
                asymmetry: 8.0
            }
        );
        assert_eq!(result.percentage, 62);
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.color, ColorTag::Red);
    }

    #[test]
    fn test_scenario_c_just_under_medium() {
        let result = RiskScorer::default().score(12.0, 2.0, 0.03);
        assert_eq!(result.percentage, 17);
        assert_eq!(result.level, RiskLevel::Low);
    }

    #[test]
    fn test_level_cutoffs() {
        let scorer = RiskScorer::default();
        assert_eq!(scorer.level(19), RiskLevel::Low);
        assert_eq!(scorer.level(20), RiskLevel::Medium);
        assert_eq!(scorer.level(44), RiskLevel::Medium);
        assert_eq!(scorer.level(45), RiskLevel::High);
        assert_eq!(scorer.level(100), RiskLevel::High);
        assert_eq!(RiskLevel::Medium.color(), ColorTag::Amber);
    }

    #[test]
    fn test_maximum_total() {
        let result = RiskScorer::default().score(0.0, 0.0, 1.0);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.level, RiskLevel::High);
    }

    #[test]
    fn test_breakdown_passthrough() {
        let result = RiskScorer::default().score(14.5, 1.234, 0.0412);
        assert_eq!(
            result.breakdown,
            Breakdown {
                blink_rate: 14.5,
                motion_score: 1.234,
                asymmetry: 0.0412
            }
        );
    }

    #[test]
    fn test_fractional_points_round() {
        let config = ScoringConfig {
            asymmetry: BandTable {
                bands: vec![Band::new(Cutoff::Below(0.035), 0.5)],
                otherwise: 25.0,
            },
            ..Default::default()
        };
        let scorer = RiskScorer::new(config).unwrap();
        // 0 + 0 + 0.5 rounds half away from zero
        assert_eq!(scorer.score(18.0, 3.0, 0.0).percentage, 1);
    }

    #[test]
    fn test_oversized_tables_clamp() {
        let config = ScoringConfig {
            blink_rate: BandTable {
                bands: vec![],
                otherwise: 90.0,
            },
            ..Default::default()
        };
        let scorer = RiskScorer::new(config).unwrap();
        assert_eq!(scorer.score(0.0, 0.0, 1.0).percentage, 100);
    }

    #[test]
    fn test_rejects_inverted_levels() {
        let config = ScoringConfig {
            medium_threshold: 50,
            ..Default::default()
        };
        assert_eq!(
            RiskScorer::new(config).unwrap_err(),
            ScoringError::LevelOrder {
                medium: 50,
                high: 45
            }
        );
    }

    #[test]
    fn test_level_and_color_tokens() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(RiskLevel::from_str_opt(level.as_str()), Some(level));
            let color = level.color();
            assert_eq!(ColorTag::from_str_opt(color.as_str()), Some(color));
        }
    }
}
