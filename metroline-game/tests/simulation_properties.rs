use metroline_game::{
    CityProfile, CommandError, LineId, Resources, RewardKind, Satisfaction, Session,
    SessionEvent, SessionStatus, SimConfig, StationId, StopEndpoint, TrainPhase, Viewport,
};

fn start(seed: u64, config: SimConfig) -> Session {
    Session::start(CityProfile::catalog()[0], seed, Viewport::default(), config).unwrap()
}

/// No passengers and no new stations: a quiet network for timing checks.
fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.spawn.passenger_chance = 0.0;
    config.spawn.station_interval_ms = u64::MAX;
    config
}

fn assert_train_invariants(session: &Session) {
    let city = session.city();
    for train in &city.trains {
        let line = city.line(train.line).unwrap();
        assert!((0.0..=1.0).contains(&train.progress), "progress {}", train.progress);
        assert!(train.current < line.len() && train.next < line.len());
        assert!(train.passengers <= train.capacity());
        for carriage in &train.carriages {
            assert!(carriage.passengers <= carriage.capacity);
        }
    }
}

#[test]
fn long_run_keeps_every_train_in_bounds() {
    let mut session = start(2024, SimConfig::default());
    session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
    session.connect(StationId(1), StationId(2), LineId(0)).unwrap();
    session.add_train(Some(LineId(0))).unwrap();
    session.add_train(None).unwrap();

    for _ in 0..25_000 {
        session.tick();
        assert_train_invariants(&session);
        let city = session.city();
        assert_eq!(
            city.waiting_passengers() + city.riding_passengers(),
            session.total_passengers()
        );
        if session.status() == SessionStatus::AwaitingReward {
            session.select_weekly_reward(RewardKind::Carriages).unwrap();
        }
    }
}

#[test]
fn connecting_a_pair_on_an_empty_line_is_idempotent() {
    let mut session = start(1, quiet_config());
    let (a, b) = (StationId(2), StationId(0));
    session.connect(a, b, LineId(0)).unwrap();
    let path = session.city().lines[0].stations.clone();
    assert!(path == vec![a, b] || path == vec![b, a]);

    session.connect(a, b, LineId(0)).unwrap();
    session.connect(b, a, LineId(0)).unwrap();
    assert_eq!(session.city().lines[0].stations, path);
}

#[test]
fn trains_oscillate_end_to_end() {
    let mut config = quiet_config();
    config.spawn.initial_stations = 4;
    let mut session = start(77, config);
    assert_eq!(session.city().stations.len(), 4);
    for (a, b) in [(0, 1), (1, 2), (2, 3)] {
        session
            .connect(StationId(a), StationId(b), LineId(0))
            .unwrap();
    }
    let train = session.add_train(Some(LineId(0))).unwrap();

    let mut stops = Vec::new();
    for _ in 0..3_000 {
        session.tick();
        let state = session.city().train(train).unwrap();
        assert!(state.current <= 3 && state.next <= 3);
        if let Some(index) = state.stop_index()
            && stops.last() != Some(&index)
        {
            stops.push(index);
        }
    }
    assert!(stops.len() >= 7, "stops {stops:?}");
    assert_eq!(&stops[..7], &[0, 1, 2, 3, 2, 1, 0]);
}

#[test]
fn one_week_yields_exactly_one_reward_pause() {
    let mut session = start(5, quiet_config());
    let week = session.config().timing.ticks_per_week();
    let mut reward_events = 0;
    for _ in 0..week - 1 {
        session.tick();
    }
    assert!(session.status().is_running());

    session.tick();
    assert_eq!(session.status(), SessionStatus::AwaitingReward);
    for _ in 0..500 {
        session.tick();
    }
    assert_eq!(session.clock().ticks(), week);
    reward_events += session
        .drain_events()
        .iter()
        .filter(|event| matches!(event, SessionEvent::WeeklyRewardDue { week: 1, .. }))
        .count();
    assert_eq!(reward_events, 1);
    assert!((session.satisfaction().value() - 100.0).abs() < f64::EPSILON);

    let before = session.resources();
    let after = session.select_weekly_reward(RewardKind::Locomotive).unwrap();
    assert_eq!(after.locomotives, before.locomotives + 1);
    assert_eq!(after.carriages, before.carriages + 2);
    assert_eq!(
        session.select_weekly_reward(RewardKind::Line),
        Err(CommandError::NoRewardPending)
    );

    for _ in 0..week - 1 {
        session.tick();
    }
    assert!(session.status().is_running());
    session.tick();
    assert_eq!(session.status(), SessionStatus::AwaitingReward);
}

#[test]
fn satisfaction_stays_within_bounds() {
    let mut session = start(9, quiet_config());
    for _ in 0..2_000 {
        session.tick();
        let value = session.satisfaction().value();
        assert!((0.0..=100.0).contains(&value));
    }
    for station in &mut session.city_mut().stations {
        station.waiting = 500;
    }
    for _ in 0..5_000 {
        session.tick();
        let value = session.satisfaction().value();
        assert!((0.0..=100.0).contains(&value));
    }
    assert!(session.status().is_game_over());
}

#[test]
fn single_segment_line_shuttles_for_ten_thousand_ticks() {
    let mut session = start(31, SimConfig::default());
    assert_eq!(session.city().stations.len(), 3);
    session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
    let train = session.add_train(Some(LineId(0))).unwrap();

    let mut parked_at = [false, false];
    for _ in 0..10_000 {
        session.tick();
        let state = session.city().train(train).unwrap();
        assert!(state.current < 2 && state.next < 2);
        assert_ne!(state.current, state.next);
        if let TrainPhase::Stopped { at, .. } = state.phase {
            let index = if at == StopEndpoint::Next {
                state.next
            } else {
                state.current
            };
            parked_at[index] = true;
        }
    }
    assert_eq!(parked_at, [true, true]);
}

#[test]
fn building_without_locomotives_changes_nothing() {
    let mut session = start(3, quiet_config());
    session.connect(StationId(0), StationId(1), LineId(0)).unwrap();
    let stock = Resources {
        locomotives: 0,
        carriages: 10,
        lines: 3,
    };
    session.set_resources(stock);
    assert_eq!(
        session.add_train(Some(LineId(0))),
        Err(CommandError::NoLocomotives)
    );
    assert_eq!(session.add_train(None), Err(CommandError::NoLocomotives));
    assert!(session.city().trains.is_empty());
    assert!(session.city().lines[0].trains.is_empty());
    assert_eq!(session.resources(), stock);
}

#[test]
fn collapse_ends_the_run_exactly_once() {
    let mut session = start(12, quiet_config());
    session.set_satisfaction(Satisfaction::new(0.5));
    session.city_mut().stations[0].waiting = 150;
    session.drain_events();

    let mut game_overs = 0;
    for _ in 0..300 {
        session.tick();
        game_overs += session
            .drain_events()
            .iter()
            .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
            .count();
    }
    assert_eq!(game_overs, 1);
    let SessionStatus::GameOver { stats } = session.status() else {
        panic!("expected game over, got {:?}", session.status());
    };
    assert_eq!(stats.trains_built, 0);
    assert!(session.satisfaction().is_depleted());
    let frozen = session.clock().ticks();
    session.tick();
    assert_eq!(session.clock().ticks(), frozen);
    assert_eq!(session.add_line(), Err(CommandError::GameOver));
    assert!(!session.resume());
}

#[test]
fn a_run_already_at_zero_ends_on_the_next_crowded_tick() {
    let mut session = start(14, quiet_config());
    session.set_satisfaction(Satisfaction::new(0.0));
    session.city_mut().stations[0].waiting = 500;
    session.drain_events();

    let mut game_overs = 0;
    for _ in 0..1_000 {
        session.tick();
        game_overs += session
            .drain_events()
            .iter()
            .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
            .count();
    }
    assert_eq!(game_overs, 1);
    assert!(session.status().is_game_over());
    assert_eq!(session.clock().ticks(), 1);
}

#[test]
fn extreme_but_valid_timing_ticks_without_overflow() {
    let config = SimConfig::from_json(
        r#"{ "timing": { "ticks_per_second": 4000000000, "day_length_secs": 4000000000, "days_per_week": 1 } }"#,
    )
    .unwrap();
    let mut session = start(15, config);
    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(session.clock().ticks(), 10);
    assert_eq!(session.render_state().hud.clock, "Week 1, Day 1 - 00:00");
}
