//! Metroline Game Engine
//!
//! Platform-agnostic simulation core for the Metroline transit network game.
//! Stations appear over time, the player joins them with coloured lines and
//! runs trains along them, and riders pile up until satisfaction collapses.
//! This crate owns every rule and leaves drawing and DOM wiring to the
//! caller, which drives [`Session::tick`] and reads [`Session::render_state`].

pub mod carriage;
pub mod city;
pub mod command;
pub mod config;
mod constants;
pub mod economy;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod input;
pub mod network;
pub mod numbers;
pub mod result;
pub mod rng;
pub mod satisfaction;
pub mod session;
pub mod snapshot;
pub mod spawning;
pub mod train;

// Re-export commonly used types
pub use carriage::Carriage;
pub use city::{
    City, CityProfile, ConnectionSet, Line, LineId, Station, StationId, StationShape, TrainId,
};
pub use command::{Command, CommandOutcome};
pub use config::{
    ConfigError, InputConfig, ResourceConfig, SatisfactionConfig, SimConfig, SpawnConfig,
    TimingConfig, TrainConfig,
};
pub use economy::{Calendar, Cost, GameClock, Resources, RewardKind};
pub use error::CommandError;
pub use events::SessionEvent;
pub use geometry::{Point, Viewport, angle_between, distance_to_segment};
pub use history::{Pose, PoseHistory};
pub use input::{DragState, PointerTarget};
pub use network::{ConnectOutcome, connect_stations, line_at, station_at};
pub use result::FinalStats;
pub use rng::{CountingRng, RngBundle};
pub use satisfaction::{Satisfaction, SatisfactionBand};
pub use session::{Session, SessionMode, SessionStatus};
pub use snapshot::{CarriageView, DragPreview, Hud, LineView, RenderState, StationView, TrainView};
pub use train::{Direction, ExchangeOutcome, StopEndpoint, Train, TrainPhase};
