//! Simulation tuning configuration.
//!
//! Every knob has a default taken from the balance constants, so a JSON
//! document only needs to name the values it overrides.
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::constants::{
    CARRIAGE_CAPACITY, CARRIAGE_FOLLOW_STEP, CARRIAGES_PER_TRAIN, CROWDING_WARNING_THRESHOLD,
    DAY_LENGTH_SECS, DAYS_PER_WEEK, HISTORY_CAPACITY, INITIAL_STATIONS, LINE_HIT_RADIUS,
    LINE_PALETTE, LOCOMOTIVE_CAPACITY, MAX_CARRIAGE_GAP, MAX_PASSENGERS_PER_PICKUP, MAX_STATIONS,
    MIN_STATION_SPACING, OVERCROWDING_THRESHOLD, PASSENGER_BURST_MAX, PASSENGER_BURST_MIN,
    PASSENGER_SPAWN_CHANCE, SATISFACTION_DECAY_RATE, SATISFACTION_RECOVERY_RATE, SPAWN_MARGIN,
    SPAWN_PLACEMENT_ATTEMPTS, STARTING_CARRIAGES, STARTING_LINES, STARTING_LOCOMOTIVES,
    STATION_HIT_RADIUS, STATION_SPAWN_INTERVAL_MS, STATION_STOP_SECS, TICKS_PER_SECOND,
    TRAIN_SPEED,
};
use crate::economy::Resources;
use crate::numbers::{secs_to_ticks, u64_to_f64};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("passenger burst minimum {min} exceeds maximum {max}")]
    BurstBounds { min: u32, max: u32 },
    #[error("crowding warning {warning} exceeds overcrowding threshold {overcrowded}")]
    ThresholdOrder { warning: u32, overcrowded: u32 },
    #[error("line palette must contain at least one colour")]
    EmptyPalette,
    #[error("invalid configuration document: {0}")]
    Parse(String),
}

/// Clock cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub ticks_per_second: u32,
    pub day_length_secs: u32,
    pub days_per_week: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            day_length_secs: DAY_LENGTH_SECS,
            days_per_week: DAYS_PER_WEEK,
        }
    }
}

impl TimingConfig {
    /// Nominal wall-clock frame duration in milliseconds.
    #[must_use]
    pub fn frame_ms(&self) -> u64 {
        1_000 / u64::from(self.ticks_per_second.max(1))
    }

    #[must_use]
    pub fn ticks_per_day(&self) -> u64 {
        u64::from(self.day_length_secs).saturating_mul(u64::from(self.ticks_per_second))
    }

    #[must_use]
    pub fn ticks_per_week(&self) -> u64 {
        self.ticks_per_day().saturating_mul(u64::from(self.days_per_week))
    }

    /// Exact week length, or `None` when it does not fit in a tick counter.
    fn checked_ticks_per_week(&self) -> Option<u64> {
        u64::from(self.day_length_secs)
            .checked_mul(u64::from(self.ticks_per_second))?
            .checked_mul(u64::from(self.days_per_week))
    }
}

/// Locomotive and carriage tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Progress gained per tick while moving (a full segment is 1.0).
    pub speed: f64,
    pub stop_secs: f64,
    pub locomotive_capacity: u32,
    pub carriage_capacity: u32,
    pub carriages_per_train: u32,
    pub max_pickup: u32,
    pub history_capacity: usize,
    pub follow_step: f64,
    pub max_carriage_gap: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            speed: TRAIN_SPEED,
            stop_secs: STATION_STOP_SECS,
            locomotive_capacity: LOCOMOTIVE_CAPACITY,
            carriage_capacity: CARRIAGE_CAPACITY,
            carriages_per_train: CARRIAGES_PER_TRAIN,
            max_pickup: MAX_PASSENGERS_PER_PICKUP,
            history_capacity: HISTORY_CAPACITY,
            follow_step: CARRIAGE_FOLLOW_STEP,
            max_carriage_gap: MAX_CARRIAGE_GAP,
        }
    }
}

/// Starting stock and line palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Fields left out of a document keep the default starting stock.
    #[serde(deserialize_with = "starting_stock")]
    pub starting: Resources,
    pub line_palette: Vec<String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            starting: DEFAULT_STARTING_STOCK,
            line_palette: LINE_PALETTE.iter().map(ToString::to_string).collect(),
        }
    }
}

const DEFAULT_STARTING_STOCK: Resources = Resources {
    locomotives: STARTING_LOCOMOTIVES,
    carriages: STARTING_CARRIAGES,
    lines: STARTING_LINES,
};

fn starting_stock<'de, D>(deserializer: D) -> Result<Resources, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Overrides {
        locomotives: Option<u32>,
        carriages: Option<u32>,
        lines: Option<u32>,
    }

    let overrides = Overrides::deserialize(deserializer)?;
    Ok(Resources {
        locomotives: overrides
            .locomotives
            .unwrap_or(DEFAULT_STARTING_STOCK.locomotives),
        carriages: overrides
            .carriages
            .unwrap_or(DEFAULT_STARTING_STOCK.carriages),
        lines: overrides.lines.unwrap_or(DEFAULT_STARTING_STOCK.lines),
    })
}

/// Station placement and passenger generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub station_interval_ms: u64,
    pub max_stations: usize,
    pub initial_stations: usize,
    pub min_spacing: f64,
    pub margin: f64,
    pub placement_attempts: u32,
    pub passenger_chance: f64,
    pub passenger_burst_min: u32,
    pub passenger_burst_max: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            station_interval_ms: STATION_SPAWN_INTERVAL_MS,
            max_stations: MAX_STATIONS,
            initial_stations: INITIAL_STATIONS,
            min_spacing: MIN_STATION_SPACING,
            margin: SPAWN_MARGIN,
            placement_attempts: SPAWN_PLACEMENT_ATTEMPTS,
            passenger_chance: PASSENGER_SPAWN_CHANCE,
            passenger_burst_min: PASSENGER_BURST_MIN,
            passenger_burst_max: PASSENGER_BURST_MAX,
        }
    }
}

/// Crowding thresholds and satisfaction rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatisfactionConfig {
    /// Stations with strictly more waiting passengers count as overcrowded.
    pub overcrowding_threshold: u32,
    pub warning_threshold: u32,
    pub decay_rate: f64,
    pub recovery_rate: f64,
}

impl Default for SatisfactionConfig {
    fn default() -> Self {
        Self {
            overcrowding_threshold: OVERCROWDING_THRESHOLD,
            warning_threshold: CROWDING_WARNING_THRESHOLD,
            decay_rate: SATISFACTION_DECAY_RATE,
            recovery_rate: SATISFACTION_RECOVERY_RATE,
        }
    }
}

/// Pointer hit-test radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub station_hit_radius: f64,
    pub line_hit_radius: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            station_hit_radius: STATION_HIT_RADIUS,
            line_hit_radius: LINE_HIT_RADIUS,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub timing: TimingConfig,
    pub trains: TrainConfig,
    pub resources: ResourceConfig,
    pub spawn: SpawnConfig,
    pub satisfaction: SatisfactionConfig,
    pub input: InputConfig,
}

impl SimConfig {
    /// Parse a JSON document and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error raised by [`SimConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        nonzero("timing.ticks_per_second", timing.ticks_per_second)?;
        nonzero("timing.day_length_secs", timing.day_length_secs)?;
        nonzero("timing.days_per_week", timing.days_per_week)?;
        if timing.checked_ticks_per_week().is_none() {
            return Err(ConfigError::RangeViolation {
                field: "timing.ticks_per_week",
                min: 1.0,
                max: u64_to_f64(u64::MAX),
                value: f64::from(timing.ticks_per_second)
                    * f64::from(timing.day_length_secs)
                    * f64::from(timing.days_per_week),
            });
        }

        let trains = &self.trains;
        in_range("trains.speed", trains.speed, f64::EPSILON, 1.0)?;
        in_range("trains.stop_secs", trains.stop_secs, f64::EPSILON, 3_600.0)?;
        if secs_to_ticks(trains.stop_secs, timing.ticks_per_second) == 0 {
            return Err(ConfigError::Zero {
                field: "trains.stop_secs (in ticks)",
            });
        }
        nonzero("trains.locomotive_capacity", trains.locomotive_capacity)?;
        nonzero("trains.carriage_capacity", trains.carriage_capacity)?;
        nonzero("trains.max_pickup", trains.max_pickup)?;
        if trains.history_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "trains.history_capacity",
            });
        }
        in_range("trains.follow_step", trains.follow_step, f64::EPSILON, 1.0)?;
        in_range(
            "trains.max_carriage_gap",
            trains.max_carriage_gap,
            f64::EPSILON,
            f64::MAX,
        )?;

        if self.resources.line_palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let spawn = &self.spawn;
        if spawn.station_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "spawn.station_interval_ms",
            });
        }
        nonzero("spawn.placement_attempts", spawn.placement_attempts)?;
        in_range("spawn.min_spacing", spawn.min_spacing, 0.0, f64::MAX)?;
        in_range("spawn.margin", spawn.margin, 0.0, f64::MAX)?;
        in_range("spawn.passenger_chance", spawn.passenger_chance, 0.0, 1.0)?;
        nonzero("spawn.passenger_burst_min", spawn.passenger_burst_min)?;
        if spawn.passenger_burst_min > spawn.passenger_burst_max {
            return Err(ConfigError::BurstBounds {
                min: spawn.passenger_burst_min,
                max: spawn.passenger_burst_max,
            });
        }

        let sat = &self.satisfaction;
        in_range("satisfaction.decay_rate", sat.decay_rate, 0.0, 100.0)?;
        in_range("satisfaction.recovery_rate", sat.recovery_rate, 0.0, 100.0)?;
        if sat.warning_threshold > sat.overcrowding_threshold {
            return Err(ConfigError::ThresholdOrder {
                warning: sat.warning_threshold,
                overcrowded: sat.overcrowding_threshold,
            });
        }

        in_range(
            "input.station_hit_radius",
            self.input.station_hit_radius,
            0.0,
            f64::MAX,
        )?;
        in_range(
            "input.line_hit_radius",
            self.input.line_hit_radius,
            0.0,
            f64::MAX,
        )?;
        Ok(())
    }

    /// Whole ticks a train stays parked at a station.
    #[must_use]
    pub fn stop_ticks(&self) -> u64 {
        secs_to_ticks(self.trains.stop_secs, self.timing.ticks_per_second)
    }
}

fn nonzero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { field });
    }
    Ok(())
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.timing.ticks_per_week(), 10_080);
        assert_eq!(cfg.stop_ticks(), 60);
        assert_eq!(cfg.resources.line_palette.len(), 6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json(r#"{ "trains": { "speed": 0.02 } }"#).unwrap();
        assert!((cfg.trains.speed - 0.02).abs() < f64::EPSILON);
        assert_eq!(cfg.trains.locomotive_capacity, 25);
        assert_eq!(cfg.spawn.max_stations, 15);
    }

    #[test]
    fn partial_starting_stock_keeps_other_defaults() {
        let cfg =
            SimConfig::from_json(r#"{ "resources": { "starting": { "locomotives": 0 } } }"#)
                .unwrap();
        assert_eq!(
            cfg.resources.starting,
            Resources {
                locomotives: 0,
                carriages: 10,
                lines: 3,
            }
        );
        assert_eq!(cfg.resources.line_palette.len(), 6);

        let stock: Resources = serde_json::from_str(r#"{ "lines": 2 }"#).unwrap();
        assert_eq!(
            stock,
            Resources {
                lines: 2,
                ..Resources::default()
            }
        );
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        let err = SimConfig::from_json(r#"{ "trains": { "speed": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "trains.speed",
                ..
            }
        ));
    }

    #[test]
    fn week_length_must_fit_the_tick_counter() {
        let err = SimConfig::from_json(
            r#"{ "timing": { "ticks_per_second": 4000000000, "day_length_secs": 4000000000, "days_per_week": 7 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "timing.ticks_per_week",
                ..
            }
        ));

        let long_day = SimConfig::from_json(
            r#"{ "timing": { "ticks_per_second": 4000000000, "day_length_secs": 4000000000, "days_per_week": 1 } }"#,
        )
        .unwrap();
        assert_eq!(long_day.timing.ticks_per_week(), 16_000_000_000_000_000_000);
    }

    #[test]
    fn threshold_order_and_burst_bounds_are_checked() {
        let mut cfg = SimConfig::default();
        cfg.satisfaction.warning_threshold = 150;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));

        let mut cfg = SimConfig::default();
        cfg.spawn.passenger_burst_min = 4;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BurstBounds { min: 4, max: 3 })
        );

        let mut cfg = SimConfig::default();
        cfg.resources.line_palette.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyPalette));
    }
}
