//! Centralized balance and tuning defaults for the Metroline simulation.
//!
//! These values seed [`SimConfig`](crate::config::SimConfig). Keeping them
//! together means a balance change is a single reviewed diff instead of a
//! hunt through the engine.

// Timing -------------------------------------------------------------------
pub(crate) const TICKS_PER_SECOND: u32 = 60;
pub(crate) const DAY_LENGTH_SECS: u32 = 24;
pub(crate) const DAYS_PER_WEEK: u32 = 7;
pub(crate) const HOURS_PER_DAY: u32 = 24;
pub(crate) const MINUTES_PER_HOUR: u32 = 60;

// Trains -------------------------------------------------------------------
pub(crate) const TRAIN_SPEED: f64 = 0.01;
pub(crate) const STATION_STOP_SECS: f64 = 1.0;
pub(crate) const LOCOMOTIVE_CAPACITY: u32 = 25;
pub(crate) const CARRIAGE_CAPACITY: u32 = 25;
pub(crate) const CARRIAGES_PER_TRAIN: u32 = 2;
pub(crate) const MAX_PASSENGERS_PER_PICKUP: u32 = 50;

// Carriage following -------------------------------------------------------
pub(crate) const HISTORY_CAPACITY: usize = 100;
pub(crate) const CARRIAGE_FOLLOW_STEP: f64 = 0.1;
pub(crate) const MAX_CARRIAGE_GAP: f64 = 40.0;

// Resources ----------------------------------------------------------------
pub(crate) const STARTING_LOCOMOTIVES: u32 = 5;
pub(crate) const STARTING_CARRIAGES: u32 = 10;
pub(crate) const STARTING_LINES: u32 = 3;
pub(crate) const LINE_PALETTE: [&str; 6] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
];

// Spawning -----------------------------------------------------------------
pub(crate) const STATION_SPAWN_INTERVAL_MS: u64 = 15_000;
pub(crate) const MAX_STATIONS: usize = 15;
pub(crate) const MIN_STATION_SPACING: f64 = 100.0;
pub(crate) const SPAWN_MARGIN: f64 = 50.0;
pub(crate) const INITIAL_STATIONS: usize = 3;
pub(crate) const SPAWN_PLACEMENT_ATTEMPTS: u32 = 256;
pub(crate) const PASSENGER_SPAWN_CHANCE: f64 = 0.05;
pub(crate) const PASSENGER_BURST_MIN: u32 = 1;
pub(crate) const PASSENGER_BURST_MAX: u32 = 3;

// Satisfaction -------------------------------------------------------------
pub(crate) const SATISFACTION_MAX: f64 = 100.0;
pub(crate) const OVERCROWDING_THRESHOLD: u32 = 100;
pub(crate) const CROWDING_WARNING_THRESHOLD: u32 = 80;
pub(crate) const SATISFACTION_DECAY_RATE: f64 = 0.01;
pub(crate) const SATISFACTION_RECOVERY_RATE: f64 = 0.005;
pub(crate) const SATISFACTION_GOOD_BAND: f64 = 70.0;
pub(crate) const SATISFACTION_WARNING_BAND: f64 = 40.0;

// Input --------------------------------------------------------------------
pub(crate) const STATION_HIT_RADIUS: f64 = 20.0;
pub(crate) const LINE_HIT_RADIUS: f64 = 10.0;

// Tutorial -----------------------------------------------------------------
pub(crate) const TUTORIAL_STATION_OFFSET: f64 = 100.0;
pub(crate) const TUTORIAL_STATION_DROP: f64 = 50.0;
pub(crate) const TUTORIAL_CITY_COLOR: &str = "#4A90E2";
pub(crate) const DRAG_PREVIEW_FALLBACK_COLOR: &str = "#999999";

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SESSION: &str = "metroline::session";
pub(crate) const LOG_TARGET_TRAINS: &str = "metroline::trains";
pub(crate) const LOG_TARGET_SPAWN: &str = "metroline::spawn";
