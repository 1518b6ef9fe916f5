use anyhow::{Result, bail, ensure};
use metroline_game::{
    CityProfile, CommandError, Line, LineId, Resources, RewardKind, Session, SessionEvent,
    SessionStatus, SimConfig, StationId, TrainId, Viewport,
};
use serde::{Deserialize, Serialize};

/// Inputs shared by every scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub ticks: u64,
    pub config: SimConfig,
    pub verbose: bool,
}

/// What a scenario observed, reported alongside pass/fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub status: String,
    pub stations: usize,
    pub trains: usize,
    pub passengers_delivered: u64,
    pub passengers_outstanding: u64,
    pub satisfaction: f64,
    pub rewards_claimed: u32,
    pub rejections: u32,
}

type ScenarioFn = fn(&ScenarioCtx) -> Result<RunSummary>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Execute the scenario once.
    ///
    /// # Errors
    ///
    /// Returns the first violated expectation.
    pub fn run(&self, ctx: &ScenarioCtx) -> Result<RunSummary> {
        (self.run)(ctx)
    }
}

const CATALOG: [Scenario; 6] = [
    Scenario {
        key: "smoke",
        description: "One line, one train, invariants checked every tick",
        run: smoke,
    },
    Scenario {
        key: "oscillation",
        description: "A train visits every station of a line end to end and back",
        run: oscillation,
    },
    Scenario {
        key: "reward-cadence",
        description: "Exactly one reward pause per simulated week",
        run: reward_cadence,
    },
    Scenario {
        key: "overcrowding-collapse",
        description: "Crowded platforms drain satisfaction to a single game over",
        run: overcrowding_collapse,
    },
    Scenario {
        key: "resource-exhaustion",
        description: "Construction refuses cleanly once stock runs out",
        run: resource_exhaustion,
    },
    Scenario {
        key: "busy-network",
        description: "A growing network with every locomotive in service",
        run: busy_network,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.key, s.description))
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<Scenario> {
    CATALOG.iter().find(|s| s.key == key).copied()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    CATALOG.iter().map(|s| s.key.to_string()).collect()
}

fn start(ctx: &ScenarioCtx, config: SimConfig) -> Result<Session> {
    let profiles = CityProfile::catalog();
    let index = usize::try_from(ctx.seed).unwrap_or_default() % profiles.len();
    Ok(Session::start(
        profiles[index],
        ctx.seed,
        Viewport::default(),
        config,
    )?)
}

fn quiet(config: &SimConfig) -> SimConfig {
    let mut config = config.clone();
    config.spawn.passenger_chance = 0.0;
    config.spawn.station_interval_ms = u64::MAX;
    config
}

fn summarize(session: &Session, rewards_claimed: u32, rejections: u32) -> RunSummary {
    let status = match session.status() {
        SessionStatus::Running => "running",
        SessionStatus::Paused => "paused",
        SessionStatus::AwaitingReward => "awaiting_reward",
        SessionStatus::GameOver { .. } => "game_over",
    };
    RunSummary {
        ticks_run: session.clock().ticks(),
        status: status.to_string(),
        stations: session.city().stations.len(),
        trains: session.city().trains.len(),
        passengers_delivered: session.passengers_delivered(),
        passengers_outstanding: session.total_passengers(),
        satisfaction: session.satisfaction().value(),
        rewards_claimed,
        rejections,
    }
}

fn check_invariants(session: &Session) -> Result<()> {
    let city = session.city();
    for train in &city.trains {
        let Some(line) = city.line(train.line) else {
            bail!("train {} references missing line {}", train.id, train.line);
        };
        ensure!(
            (0.0..=1.0).contains(&train.progress),
            "train {} progress {} out of range",
            train.id,
            train.progress
        );
        ensure!(
            train.current < line.len() && train.next < line.len(),
            "train {} indices ({}, {}) outside line of {}",
            train.id,
            train.current,
            train.next,
            line.len()
        );
        ensure!(
            train.passengers <= train.capacity(),
            "train {} carries {} over capacity {}",
            train.id,
            train.passengers,
            train.capacity()
        );
    }
    let value = session.satisfaction().value();
    ensure!((0.0..=100.0).contains(&value), "satisfaction {value} out of range");
    ensure!(
        city.waiting_passengers() + city.riding_passengers() == session.total_passengers(),
        "rider ledger out of balance"
    );
    Ok(())
}

/// Tick once, claiming any pending reward in rotation.
fn step(session: &mut Session, claimed: &mut u32) -> Result<()> {
    session.tick();
    if session.status() == SessionStatus::AwaitingReward {
        let turn = usize::try_from(*claimed).unwrap_or_default();
        let reward = RewardKind::ALL[turn % RewardKind::ALL.len()];
        session.select_weekly_reward(reward)?;
        *claimed += 1;
    }
    Ok(())
}

fn smoke(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut session = start(ctx, ctx.config.clone())?;
    session.connect(StationId(0), StationId(1), LineId(0))?;
    session.add_train(Some(LineId(0)))?;
    let mut claimed = 0;
    for _ in 0..ctx.ticks {
        step(&mut session, &mut claimed)?;
        check_invariants(&session)?;
        if session.status().is_game_over() {
            break;
        }
    }
    ensure!(session.clock().ticks() > 0, "clock never advanced");
    Ok(summarize(&session, claimed, 0))
}

fn oscillation(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut config = quiet(&ctx.config);
    config.spawn.initial_stations = config.spawn.initial_stations.max(4);
    let mut session = start(ctx, config)?;
    let count = session.city().stations.len();
    ensure!(count >= 2, "only {count} stations were placed");
    for index in 1..count {
        session.connect(StationId(index - 1), StationId(index), LineId(0))?;
    }
    let train = session.add_train(Some(LineId(0)))?;

    let mut stops = Vec::new();
    let mut claimed = 0;
    for _ in 0..ctx.ticks.max(20_000) {
        step(&mut session, &mut claimed)?;
        check_invariants(&session)?;
        let Some(state) = session.city().train(train) else {
            bail!("train {train} disappeared");
        };
        if let Some(index) = state.stop_index()
            && stops.last() != Some(&index)
        {
            stops.push(index);
        }
        if stops.len() >= 2 * count - 1 {
            break;
        }
    }
    let expected: Vec<usize> = (0..count).chain((0..count - 1).rev()).collect();
    ensure!(
        stops == expected,
        "stop sequence {stops:?}, expected {expected:?}"
    );
    Ok(summarize(&session, claimed, 0))
}

fn reward_cadence(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut session = start(ctx, quiet(&ctx.config))?;
    let week = session.config().timing.ticks_per_week();
    let mut due = 0;
    for tick in 1..=week {
        session.tick();
        due += session
            .drain_events()
            .iter()
            .filter(|event| matches!(event, SessionEvent::WeeklyRewardDue { .. }))
            .count();
        if tick < week {
            ensure!(due == 0, "reward offered early at tick {tick}");
        }
    }
    ensure!(due == 1, "expected one reward pause, saw {due}");
    ensure!(
        session.status() == SessionStatus::AwaitingReward,
        "session did not pause for the reward"
    );

    let before = session.resources();
    let after = session.select_weekly_reward(RewardKind::Carriages)?;
    ensure!(
        after.carriages == before.carriages + 3,
        "carriage reward not applied"
    );
    Ok(summarize(&session, 1, 0))
}

fn overcrowding_collapse(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let config = quiet(&ctx.config);
    let threshold = config.satisfaction.overcrowding_threshold;
    let mut session = start(ctx, config)?;
    for station in &mut session.city_mut().stations {
        station.waiting = threshold.saturating_add(1);
    }
    session.drain_events();

    let mut game_overs = 0;
    let mut claimed = 0;
    for _ in 0..ctx.ticks.max(50_000) {
        step(&mut session, &mut claimed)?;
        check_invariants(&session)?;
        game_overs += session
            .drain_events()
            .iter()
            .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
            .count();
        if session.status().is_game_over() {
            break;
        }
    }
    // Further ticks must not re-trigger.
    for _ in 0..10 {
        session.tick();
    }
    game_overs += session
        .drain_events()
        .iter()
        .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
        .count();
    ensure!(game_overs == 1, "expected one game over, saw {game_overs}");
    ensure!(
        session.satisfaction().is_depleted(),
        "satisfaction not depleted"
    );
    Ok(summarize(&session, claimed, 0))
}

fn resource_exhaustion(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut session = start(ctx, quiet(&ctx.config))?;
    session.connect(StationId(0), StationId(1), LineId(0))?;
    let mut rejections = 0;

    session.set_resources(Resources {
        locomotives: 0,
        ..session.resources()
    });
    let trains_before = session.city().trains.len();
    ensure!(
        session.add_train(Some(LineId(0))) == Err(CommandError::NoLocomotives),
        "train built without a locomotive"
    );
    rejections += 1;
    ensure!(
        session.city().trains.len() == trains_before,
        "rejected train still appeared"
    );

    session.set_resources(Resources {
        locomotives: 1,
        carriages: 3,
        lines: 0,
    });
    let train = session.add_train(Some(LineId(0)))?;
    session.add_carriage(train)?;
    let stock = session.resources();
    ensure!(
        session.add_carriage(train) == Err(CommandError::NoCarriages),
        "carriage built from empty stock"
    );
    ensure!(
        session.add_line() == Err(CommandError::NoLinesAvailable),
        "line built from empty stock"
    );
    ensure!(
        session.add_carriage(TrainId(99)) == Err(CommandError::UnknownTrain(TrainId(99))),
        "unknown train accepted"
    );
    rejections += 3;
    ensure!(session.resources() == stock, "rejections spent stock");
    Ok(summarize(&session, 0, rejections))
}

fn busy_network(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut session = start(ctx, ctx.config.clone())?;
    let count = session.city().stations.len();
    for index in 1..count {
        session.connect(StationId(index - 1), StationId(index), LineId(0))?;
    }
    let mut rejections = 0;
    loop {
        match session.add_train(None) {
            Ok(_) => {}
            Err(err) if err.is_resource_exhaustion() => {
                rejections += 1;
                break;
            }
            Err(err) => bail!("unexpected rejection while filling the network: {err}"),
        }
    }

    let mut claimed = 0;
    for _ in 0..ctx.ticks {
        step(&mut session, &mut claimed)?;
        check_invariants(&session)?;
        if session.status().is_game_over() {
            break;
        }
        for event in session.drain_events() {
            if let SessionEvent::StationSpawned { station, .. } = event {
                let Some(tail) = session.city().lines.first().and_then(Line::tail) else {
                    continue;
                };
                session.connect(tail, station, LineId(0))?;
                match session.add_train(Some(LineId(0))) {
                    Ok(_) => {}
                    Err(err) if err.is_resource_exhaustion() => rejections += 1,
                    Err(err) => bail!("unexpected rejection on line 0: {err}"),
                }
            }
        }
    }
    if ctx.verbose {
        log::info!(
            "busy-network seed {}: {} trains, {} delivered",
            ctx.seed,
            session.city().trains.len(),
            session.passengers_delivered()
        );
    }
    ensure!(!session.city().trains.is_empty(), "no trains were built");
    Ok(summarize(&session, claimed, rejections))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(seed: u64) -> ScenarioCtx {
        ScenarioCtx {
            seed,
            ticks: 2_000,
            config: SimConfig::default(),
            verbose: false,
        }
    }

    #[test]
    fn rewards_are_claimed_in_rotation() {
        let mut config = quiet(&SimConfig::default());
        config.timing.day_length_secs = 1;
        config.timing.days_per_week = 1;
        let mut session = start(&ctx(3), config).unwrap();
        let week = session.config().timing.ticks_per_week();
        let mut claimed = 0;
        for _ in 0..week * 4 {
            step(&mut session, &mut claimed).unwrap();
        }
        assert_eq!(claimed, 4);
        assert_eq!(
            session.resources(),
            Resources {
                locomotives: 7,
                carriages: 17,
                lines: 4,
            }
        );
    }

    #[test]
    fn catalog_keys_resolve() {
        for key in all_scenario_keys() {
            assert!(get_scenario(&key).is_some(), "{key}");
        }
        assert!(get_scenario("nope").is_none());
        assert_eq!(list_scenarios().count(), 6);
    }

    #[test]
    fn every_scenario_passes_on_a_fixed_seed() {
        for key in all_scenario_keys() {
            let scenario = get_scenario(&key).unwrap();
            let summary = scenario
                .run(&ctx(1337))
                .unwrap_or_else(|err| panic!("{key}: {err:#}"));
            assert!(summary.ticks_run > 0 || key == "resource-exhaustion");
        }
    }

    #[test]
    fn collapse_reports_game_over() {
        let summary = get_scenario("overcrowding-collapse")
            .unwrap()
            .run(&ctx(7))
            .unwrap();
        assert_eq!(summary.status, "game_over");
        assert!(summary.satisfaction.abs() < f64::EPSILON);
    }
}
