//! Rider satisfaction and the game-over trigger.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SatisfactionConfig;
use crate::constants::{SATISFACTION_GOOD_BAND, SATISFACTION_MAX, SATISFACTION_WARNING_BAND};
use crate::numbers::usize_to_f64;

/// HUD colour band for the satisfaction meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionBand {
    Good,
    Warning,
    Critical,
}

impl SatisfactionBand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for SatisfactionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Satisfaction(f64);

impl Default for Satisfaction {
    fn default() -> Self {
        Self(SATISFACTION_MAX)
    }
}

impl Satisfaction {
    /// Build a score, clamping into range.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(clamp_score(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_depleted(self) -> bool {
        self.0 <= 0.0
    }

    /// Apply one tick of decay or recovery.
    pub fn update(&mut self, crowded_stations: usize, cfg: &SatisfactionConfig) {
        let delta = if crowded_stations > 0 {
            -(cfg.decay_rate * usize_to_f64(crowded_stations))
        } else {
            cfg.recovery_rate
        };
        self.0 = clamp_score(self.0 + delta);
    }

    #[must_use]
    pub fn band(self) -> SatisfactionBand {
        if self.0 > SATISFACTION_GOOD_BAND {
            SatisfactionBand::Good
        } else if self.0 > SATISFACTION_WARNING_BAND {
            SatisfactionBand::Warning
        } else {
            SatisfactionBand::Critical
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, SATISFACTION_MAX)
}
