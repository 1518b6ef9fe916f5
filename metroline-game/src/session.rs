//! The playable session: one active city plus the economy around it.
//!
//! A [`Session`] owns every piece of mutable simulation state. The
//! presentation layer drives it with [`Session::tick`], issues discrete
//! commands, and reads [`Session::render_state`] to draw a frame.
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::city::{City, CityProfile, LineId, StationId, TrainId};
use crate::config::{ConfigError, SimConfig};
use crate::constants::LOG_TARGET_SESSION;
use crate::economy::{Cost, GameClock, Resources, RewardKind};
use crate::error::CommandError;
use crate::events::SessionEvent;
use crate::geometry::{Point, Viewport};
use crate::input::DragState;
use crate::network::{ConnectOutcome, connect_stations};
use crate::result::FinalStats;
use crate::rng::RngBundle;
use crate::satisfaction::Satisfaction;
use crate::spawning::{
    SpawnTimer, generate_passengers, seed_initial_stations, seed_tutorial_stations,
    spawn_station,
};
use crate::train::Train;

/// Which rule set the session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Normal,
    /// Fixed three-station layout: only trains move and building is free.
    Tutorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Paused,
    /// A week has passed; ticks are suspended until a reward is chosen.
    AwaitingReward,
    GameOver { stats: FinalStats },
}

impl SessionStatus {
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) mode: SessionMode,
    pub(crate) profile: CityProfile,
    pub(crate) config: SimConfig,
    pub(crate) stop_ticks: u64,
    pub(crate) viewport: Viewport,
    pub(crate) city: City,
    pub(crate) resources: Resources,
    pub(crate) clock: GameClock,
    pub(crate) satisfaction: Satisfaction,
    pub(crate) status: SessionStatus,
    pub(crate) rng: RngBundle,
    pub(crate) spawn_timer: SpawnTimer,
    /// Riders generated and not yet dropped off, across the run.
    pub(crate) total_passengers: u64,
    pub(crate) delivered: u64,
    pub(crate) trains_built: u32,
    pub(crate) drag: DragState,
    pub(crate) selected_line: Option<LineId>,
    /// Stations currently above the crowding warning level.
    pub(crate) crowding_warned: Vec<bool>,
    pub(crate) events: Vec<SessionEvent>,
}

impl Session {
    /// Start a normal session in `profile` with three scattered stations and
    /// one empty line.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant in `config`.
    pub fn start(
        profile: CityProfile,
        seed: u64,
        viewport: Viewport,
        config: SimConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(SessionMode::Normal, profile, seed, viewport, config))
    }

    /// Start the tutorial world.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant in `config`.
    pub fn tutorial(seed: u64, viewport: Viewport, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(
            SessionMode::Tutorial,
            CityProfile::tutorial(),
            seed,
            viewport,
            config,
        ))
    }

    fn build(
        mode: SessionMode,
        profile: CityProfile,
        seed: u64,
        viewport: Viewport,
        config: SimConfig,
    ) -> Self {
        let mut rng = RngBundle::from_user_seed(seed);
        let mut city = City::new(&profile);
        match mode {
            SessionMode::Normal => {
                seed_initial_stations(&mut city, viewport, &config.spawn, rng.spawn());
            }
            SessionMode::Tutorial => seed_tutorial_stations(&mut city, viewport),
        }
        if let Some(color) = config.resources.line_palette.first() {
            city.add_line(color.clone());
        }
        info!(
            target: LOG_TARGET_SESSION,
            "session started: {} ({mode:?}) seed={seed} stations={}",
            city.name,
            city.stations.len()
        );
        Self {
            mode,
            profile,
            stop_ticks: config.stop_ticks(),
            viewport,
            resources: config.resources.starting,
            clock: GameClock::default(),
            satisfaction: Satisfaction::default(),
            status: SessionStatus::Running,
            rng,
            spawn_timer: SpawnTimer::default(),
            total_passengers: 0,
            delivered: 0,
            trains_built: 0,
            drag: DragState::Idle,
            selected_line: None,
            crowding_warned: vec![false; city.stations.len()],
            events: Vec::new(),
            city,
            config,
        }
    }

    /// Rebuild the same city from the same seed and configuration.
    pub fn restart(&mut self) {
        let seed = self.rng.seed();
        *self = Self::build(
            self.mode,
            self.profile,
            seed,
            self.viewport,
            self.config.clone(),
        );
    }

    /// Advance one nominal frame.
    pub fn tick(&mut self) {
        let frame = Duration::from_millis(self.config.timing.frame_ms());
        self.tick_elapsed(frame);
    }

    /// Advance one simulation step, crediting `elapsed` real time to the
    /// station spawn cadence. Does nothing unless the session is running.
    pub fn tick_elapsed(&mut self, elapsed: Duration) {
        if !self.status.is_running() {
            return;
        }
        match self.mode {
            SessionMode::Tutorial => self.step_trains(),
            SessionMode::Normal => self.step_world(elapsed),
        }
    }

    fn step_world(&mut self, elapsed: Duration) {
        let week_complete = self.clock.advance(&self.config.timing);

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if self
            .spawn_timer
            .advance(elapsed_ms, self.config.spawn.station_interval_ms)
        {
            self.spawn_one_station();
        }

        let added = generate_passengers(&mut self.city, &self.config.spawn, self.rng.passengers());
        self.total_passengers = self.total_passengers.saturating_add(u64::from(added));

        self.step_trains();
        self.check_crowding();

        let crowded = self
            .city
            .crowded_stations(self.config.satisfaction.overcrowding_threshold);
        self.satisfaction.update(crowded, &self.config.satisfaction);
        if self.satisfaction.is_depleted() {
            self.end_run();
            return;
        }

        if week_complete {
            let week = self.clock.calendar(&self.config.timing).week - 1;
            info!(target: LOG_TARGET_SESSION, "week {week} complete; awaiting reward");
            self.status = SessionStatus::AwaitingReward;
            self.events.push(SessionEvent::WeeklyRewardDue {
                week,
                options: RewardKind::ALL.to_vec(),
            });
        }
    }

    fn spawn_one_station(&mut self) {
        if let Some(station) = spawn_station(
            &mut self.city,
            self.viewport,
            &self.config.spawn,
            self.rng.spawn(),
        ) {
            self.events.push(SessionEvent::StationSpawned {
                station,
                label: self.city.station_label(station),
            });
        }
    }

    fn step_trains(&mut self) {
        let City {
            stations,
            lines,
            trains,
            passengers,
            ..
        } = &mut self.city;
        let cfg = &self.config.trains;
        for train in trains.iter_mut() {
            let Some(line) = lines.get(train.line.index()) else {
                continue;
            };
            let path: Vec<Point> = line
                .stations
                .iter()
                .filter_map(|id| stations.get(id.index()).map(|s| s.position))
                .collect();
            let Some(index) = train.advance(&path, cfg, self.stop_ticks) else {
                continue;
            };
            let Some(station) = line
                .station_at(index)
                .and_then(|id| stations.get_mut(id.index()))
            else {
                continue;
            };
            let outcome = train.exchange(&mut station.waiting, cfg.max_pickup, self.rng.exchange());
            let dropped = u64::from(outcome.dropped_off);
            *passengers = passengers.saturating_sub(dropped);
            self.total_passengers = self.total_passengers.saturating_sub(dropped);
            self.delivered = self.delivered.saturating_add(dropped);
        }
    }

    fn check_crowding(&mut self) {
        let threshold = self.config.satisfaction.warning_threshold;
        self.crowding_warned.resize(self.city.stations.len(), false);
        for (station, warned) in self.city.stations.iter().zip(self.crowding_warned.iter_mut()) {
            let crowded = station.waiting > threshold;
            if crowded && !*warned {
                self.events.push(SessionEvent::CrowdingWarning {
                    station: station.id,
                    waiting: station.waiting,
                });
            }
            *warned = crowded;
        }
    }

    fn end_run(&mut self) {
        let stats = self.stats();
        info!(target: LOG_TARGET_SESSION, "game over: {stats}");
        self.status = SessionStatus::GameOver { stats };
        self.drag = DragState::Idle;
        self.events.push(SessionEvent::GameOver { stats });
    }

    fn ensure_accepting_commands(&self) -> Result<(), CommandError> {
        match self.status {
            SessionStatus::GameOver { .. } => Err(CommandError::GameOver),
            SessionStatus::AwaitingReward => Err(CommandError::RewardPending),
            SessionStatus::Running | SessionStatus::Paused => Ok(()),
        }
    }

    fn cost(&self, cost: Cost) -> Cost {
        match self.mode {
            SessionMode::Normal => cost,
            SessionMode::Tutorial => Cost::free(),
        }
    }

    /// Join two stations on `line`. Re-connecting a pair already on the line
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, self-loops and non-endpoint attachments, and any
    /// command while a reward is pending or after game over.
    pub fn connect(
        &mut self,
        a: StationId,
        b: StationId,
        line: LineId,
    ) -> Result<ConnectOutcome, CommandError> {
        self.ensure_accepting_commands()?;
        let outcome = connect_stations(&mut self.city, a, b, line)?;
        if let ConnectOutcome::Prepended(_) = outcome {
            let City { lines, trains, .. } = &mut self.city;
            if let Some(path) = lines.get(line.index()) {
                for id in &path.trains {
                    if let Some(train) = trains.get_mut(id.index()) {
                        train.shift_for_prepend();
                    }
                }
            }
        }
        if outcome.changed() {
            debug!(target: LOG_TARGET_SESSION, "line {line}: connected {a} and {b} ({outcome:?})");
            self.events.push(SessionEvent::StationsConnected {
                line,
                from: a,
                to: b,
            });
        }
        Ok(outcome)
    }

    /// Open a new empty line in the next palette colour.
    ///
    /// # Errors
    ///
    /// Fails when every palette colour is taken or no line slot is left.
    pub fn add_line(&mut self) -> Result<LineId, CommandError> {
        self.ensure_accepting_commands()?;
        let palette = &self.config.resources.line_palette;
        let Some(color) = palette.get(self.city.lines.len()).cloned() else {
            return Err(CommandError::LineLimitReached);
        };
        self.resources.spend(self.cost(Cost::line()))?;
        let line = self.city.add_line(color.clone());
        debug!(target: LOG_TARGET_SESSION, "line {line} opened ({color})");
        self.events.push(SessionEvent::LineBuilt { line, color });
        Ok(line)
    }

    /// Build a train on `line`, or on a random runnable line when `None`.
    ///
    /// # Errors
    ///
    /// Fails when stock is short, the city has no lines, or the chosen line
    /// has fewer than two stations.
    pub fn add_train(&mut self, line: Option<LineId>) -> Result<TrainId, CommandError> {
        self.ensure_accepting_commands()?;
        let cost = self.cost(Cost::train(self.config.trains.carriages_per_train));
        self.resources.check(cost)?;

        let line = match line {
            Some(id) => {
                let chosen = self.city.line(id).ok_or(CommandError::UnknownLine(id))?;
                if !chosen.is_runnable() {
                    return Err(CommandError::LineTooShort { line: id });
                }
                id
            }
            None => {
                let runnable: Vec<LineId> = self
                    .city
                    .lines
                    .iter()
                    .filter(|l| l.is_runnable())
                    .map(|l| l.id)
                    .collect();
                match (runnable.is_empty(), self.city.lines.first()) {
                    (_, None) => return Err(CommandError::NoLines),
                    (true, Some(first)) => {
                        return Err(CommandError::LineTooShort { line: first.id });
                    }
                    (false, Some(_)) => runnable[self.rng.dispatch().gen_range(0..runnable.len())],
                }
            }
        };

        let start = self
            .city
            .line(line)
            .and_then(|l| l.head())
            .and_then(|id| self.city.station(id))
            .map(|s| s.position)
            .ok_or(CommandError::LineTooShort { line })?;
        self.resources.spend(cost)?;

        let id = TrainId(self.city.trains.len());
        let train = Train::new(id, line, start, &self.config.trains, self.stop_ticks);
        self.city.trains.push(train);
        if let Some(path) = self.city.lines.get_mut(line.index()) {
            path.trains.push(id);
        }
        self.trains_built += 1;
        debug!(target: LOG_TARGET_SESSION, "train {id} placed on line {line}");
        self.events.push(SessionEvent::TrainBuilt { train: id, line });
        Ok(id)
    }

    /// Couple a carriage to `train`, raising its capacity.
    ///
    /// # Errors
    ///
    /// Fails for an unknown train or when no carriage is in stock.
    pub fn add_carriage(&mut self, train: TrainId) -> Result<u32, CommandError> {
        self.ensure_accepting_commands()?;
        if self.city.train(train).is_none() {
            return Err(CommandError::UnknownTrain(train));
        }
        self.resources.spend(self.cost(Cost::carriage()))?;
        let cfg = &self.config.trains;
        let Some(target) = self.city.train_mut(train) else {
            return Err(CommandError::UnknownTrain(train));
        };
        target.attach_carriage(cfg);
        let capacity = target.capacity();
        debug!(target: LOG_TARGET_SESSION, "train {train} capacity now {capacity}");
        self.events.push(SessionEvent::CarriageAdded { train, capacity });
        Ok(capacity)
    }

    /// Claim the pending weekly reward and resume the clock.
    ///
    /// # Errors
    ///
    /// Fails unless a reward is waiting.
    pub fn select_weekly_reward(&mut self, reward: RewardKind) -> Result<Resources, CommandError> {
        if self.status != SessionStatus::AwaitingReward {
            return Err(CommandError::NoRewardPending);
        }
        self.resources.grant(reward);
        self.status = SessionStatus::Running;
        info!(target: LOG_TARGET_SESSION, "reward applied: {reward}");
        self.events.push(SessionEvent::RewardApplied { reward });
        Ok(self.resources)
    }

    /// Suspend ticking. Returns false when the session was not running.
    pub fn pause(&mut self) -> bool {
        if !self.status.is_running() {
            return false;
        }
        self.status = SessionStatus::Paused;
        self.events.push(SessionEvent::Paused);
        true
    }

    /// Resume after [`Session::pause`]. Returns false when not paused.
    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        self.events.push(SessionEvent::Resumed);
        true
    }

    /// Toggle between running and paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.status == SessionStatus::Paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Update the canvas extent used for future station placement.
    pub const fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Take every queued notification.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Figures for the game-over screen, computed from the current state.
    #[must_use]
    pub fn stats(&self) -> FinalStats {
        FinalStats {
            passengers_transported: self.delivered,
            outstanding_passengers: self.total_passengers,
            days_operated: self.clock.days_elapsed(&self.config.timing),
            trains_built: self.trains_built,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn city(&self) -> &City {
        &self.city
    }

    #[must_use]
    pub const fn profile(&self) -> &CityProfile {
        &self.profile
    }

    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub const fn resources(&self) -> Resources {
        self.resources
    }

    #[must_use]
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    #[must_use]
    pub const fn satisfaction(&self) -> Satisfaction {
        self.satisfaction
    }

    #[must_use]
    pub const fn total_passengers(&self) -> u64 {
        self.total_passengers
    }

    #[must_use]
    pub const fn passengers_delivered(&self) -> u64 {
        self.delivered
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Line currently highlighted by the pointer adapter.
    #[must_use]
    pub const fn selected_line(&self) -> Option<LineId> {
        self.selected_line
    }

    /// Borrow the mutable city for scripted setups.
    pub const fn city_mut(&mut self) -> &mut City {
        &mut self.city
    }

    /// Overwrite the resource pool for scripted setups.
    pub const fn set_resources(&mut self, resources: Resources) {
        self.resources = resources;
    }

    /// Overwrite the satisfaction score for scripted setups.
    pub const fn set_satisfaction(&mut self, satisfaction: Satisfaction) {
        self.satisfaction = satisfaction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::start(
            CityProfile::catalog()[1],
            7,
            Viewport::default(),
            SimConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn start_builds_three_stations_and_an_empty_line() {
        let session = session();
        assert_eq!(session.city().stations.len(), 3);
        assert_eq!(session.city().lines.len(), 1);
        assert!(session.city().lines[0].is_empty());
        assert!(session.city().trains.is_empty());
        assert_eq!(session.resources().locomotives, 5);
        assert!(session.status().is_running());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = SimConfig::default();
        config.trains.speed = -1.0;
        assert!(Session::start(CityProfile::catalog()[0], 1, Viewport::default(), config).is_err());
    }

    #[test]
    fn train_construction_spends_stock() {
        let mut session = session();
        assert_eq!(session.add_train(None), Err(CommandError::LineTooShort { line: LineId(0) }));
        session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
        let id = session.add_train(None).unwrap();
        assert_eq!(id, TrainId(0));
        assert_eq!(session.resources().locomotives, 4);
        assert_eq!(session.resources().carriages, 8);
        assert_eq!(session.city().lines[0].trains, vec![id]);
        assert_eq!(session.add_carriage(id), Ok(100));
        assert_eq!(session.resources().carriages, 7);
    }

    #[test]
    fn prepending_keeps_trains_on_their_stations() {
        let mut session = session();
        session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
        let id = session.add_train(Some(LineId(0))).unwrap();
        session
            .connect(StationId(2), StationId(0), LineId(0))
            .unwrap();
        let train = session.city().train(id).unwrap();
        assert_eq!((train.current, train.next), (1, 2));
        assert_eq!(session.city().lines[0].stations[train.current], StationId(0));
    }

    #[test]
    fn pause_and_resume_gate_ticks() {
        let mut session = session();
        assert!(session.pause());
        assert!(!session.pause());
        let before = session.clock().ticks();
        session.tick();
        assert_eq!(session.clock().ticks(), before);
        assert!(session.resume());
        session.tick();
        assert_eq!(session.clock().ticks(), before + 1);
        let events = session.drain_events();
        assert_eq!(events, vec![SessionEvent::Paused, SessionEvent::Resumed]);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn restart_reproduces_the_opening_layout() {
        let mut session = session();
        let opening: Vec<Point> = session.city().stations.iter().map(|s| s.position).collect();
        session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
        session.add_train(None).unwrap();
        for _ in 0..500 {
            session.tick();
        }
        session.restart();
        let again: Vec<Point> = session.city().stations.iter().map(|s| s.position).collect();
        assert_eq!(opening, again);
        assert!(session.city().trains.is_empty());
        assert_eq!(session.clock().ticks(), 0);
        assert_eq!(session.resources().locomotives, 5);
    }

    #[test]
    fn tutorial_waives_costs_and_freezes_the_clock() {
        let mut session = Session::tutorial(1, Viewport::default(), SimConfig::default()).unwrap();
        session.set_resources(Resources::default());
        session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
        let id = session.add_train(Some(LineId(0))).unwrap();
        session.add_line().unwrap();
        for _ in 0..200 {
            session.tick();
        }
        assert_eq!(session.clock().ticks(), 0);
        assert_eq!(session.city().stations.len(), 3);
        assert!(session.city().train(id).unwrap().history.len() > 1);
        assert_eq!(session.resources(), Resources::default());
    }
}
