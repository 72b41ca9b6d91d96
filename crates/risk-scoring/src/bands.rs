//! Band tables mapping one signal to bounded points

use serde::{Deserialize, Serialize};
use crate::ScoringError;

/// Condition a value must meet to fall into a band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cutoff {
    /// `value >= bound`
    AtLeast(f64),
    /// `value < bound`
    Below(f64),
    /// `value <= bound`
    AtMost(f64),
}

impl Cutoff {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Cutoff::AtLeast(bound) => value >= bound,
            Cutoff::Below(bound) => value < bound,
            Cutoff::AtMost(bound) => value <= bound,
        }
    }

    fn bound(&self) -> f64 {
        match *self {
            Cutoff::AtLeast(b) | Cutoff::Below(b) | Cutoff::AtMost(b) => b,
        }
    }
}

/// One row of a band table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub cutoff: Cutoff,
    pub points: f64,
}

impl Band {
    pub const fn new(cutoff: Cutoff, points: f64) -> Self {
        Self { cutoff, points }
    }
}

/// Ordered bands; the first band admitting the value wins, otherwise
/// `otherwise` points apply (also for NaN inputs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<Band>,
    pub otherwise: f64,
}

impl BandTable {
    pub fn points(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.cutoff.admits(value))
            .map(|band| band.points)
            .unwrap_or(self.otherwise)
    }

    /// Largest contribution this table can make
    pub fn max_points(&self) -> f64 {
        self.bands
            .iter()
            .map(|band| band.points)
            .fold(self.otherwise, f64::max)
    }

    /// Blinks per minute; fewer blinks score higher (max 40)
    pub fn blink_rate() -> Self {
        Self {
            bands: vec![
                Band::new(Cutoff::AtLeast(17.0), 0.0),
                Band::new(Cutoff::AtLeast(13.0), 12.0),
                Band::new(Cutoff::AtLeast(10.0), 12.0),
                Band::new(Cutoff::AtLeast(7.0), 28.0),
                Band::new(Cutoff::AtLeast(4.0), 36.0),
            ],
            otherwise: 40.0,
        }
    }

    /// Scaled motion; less movement scores higher (max 35)
    pub fn motion_score() -> Self {
        Self {
            bands: vec![
                Band::new(Cutoff::AtLeast(4.0), 0.0),
                Band::new(Cutoff::AtLeast(2.5), 0.0),
                Band::new(Cutoff::AtLeast(1.5), 5.0),
                Band::new(Cutoff::AtLeast(1.0), 15.0),
                Band::new(Cutoff::AtLeast(0.6), 26.0),
            ],
            otherwise: 35.0,
        }
    }

    /// Raw asymmetry; more asymmetry scores higher (max 25)
    pub fn asymmetry() -> Self {
        Self {
            bands: vec![
                Band::new(Cutoff::Below(0.035), 0.0),
                Band::new(Cutoff::AtMost(0.05), 8.0),
                Band::new(Cutoff::Below(0.07), 16.0),
            ],
            otherwise: 25.0,
        }
    }

    pub(crate) fn validate(&self, table: &'static str) -> Result<(), ScoringError> {
        for (index, band) in self.bands.iter().enumerate() {
            if !band.cutoff.bound().is_finite() {
                return Err(ScoringError::InvalidCutoff { table, index });
            }
            if !band.points.is_finite() || band.points < 0.0 {
                return Err(ScoringError::InvalidPoints {
                    table,
                    index,
                    points: band.points,
                });
            }
        }
        if !self.otherwise.is_finite() || self.otherwise < 0.0 {
            return Err(ScoringError::InvalidPoints {
                table,
                index: self.bands.len(),
                points: self.otherwise,
            });
        }
        Ok(())
    }
}
