use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use blockfire_core::{BlockColor, Event, LevelData, ShooterId, ShooterSpec};
use blockfire_session::{GameState, LevelCatalog, LevelSession, SessionConfig};

const FRAME: Duration = Duration::from_millis(10);

fn single_row(ammo: u32) -> LevelData {
    LevelData::from_symbols(&["YYYYYYYYYY"], 1)
        .expect("valid level")
        .with_shooters(vec![ShooterSpec::new(BlockColor::Yellow, ammo)])
}

fn deploy(session: &mut LevelSession, shooter: u32, events: &mut Vec<Event>) {
    let mut activation = Vec::new();
    session.activate_shooter(ShooterId::new(shooter), &mut activation);
    let slot = activation
        .iter()
        .find_map(|event| match event {
            Event::ShooterActivated { slot, .. } => Some(*slot),
            _ => None,
        })
        .expect("activation accepted");
    events.extend(activation);
    session.arrive(slot, events);
}

fn play_until_settled(session: &mut LevelSession, frames: usize, events: &mut Vec<Event>) {
    for _ in 0..frames {
        if session.state() != GameState::Playing {
            break;
        }
        session.tick(FRAME, events);
    }
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn clearing_a_level_awards_gold_and_score() {
    let catalog = LevelCatalog::new(vec![
        single_row(10).with_number(1).with_name("first"),
        single_row(10).with_number(2).with_name("second"),
    ]);
    let mut session = LevelSession::with_catalog(SessionConfig::default(), catalog);
    let mut events = Vec::new();

    session.next_level(&mut events).expect("first level");
    deploy(&mut session, 0, &mut events);
    play_until_settled(&mut session, 1_000, &mut events);

    assert_eq!(session.state(), GameState::LevelComplete);
    assert_eq!(session.gold(), 50);
    assert_eq!(session.score(), 100);
    assert!(events.contains(&Event::LevelCleared { destroyed: 10 }));

    let summary = session.summary();
    assert_eq!(summary.level_number, 1);
    assert_eq!(summary.level_name, "first");
    assert_eq!(summary.destroyed, 10);
    assert_eq!(summary.total_blocks, 10);

    session.next_level(&mut events).expect("second level");
    assert_eq!(session.current_level(), Some(1));
    assert_eq!(session.state(), GameState::Playing);
    assert_eq!(session.score(), 0);
    assert_eq!(session.gold(), 50);
    assert_eq!(session.summary().level_name, "second");
}

#[test]
fn running_out_of_shooters_ends_the_game() {
    let mut session = LevelSession::new(SessionConfig::default());
    let mut events = Vec::new();

    session.load_level(single_row(3), &mut events);
    deploy(&mut session, 0, &mut events);
    play_until_settled(&mut session, 1_000, &mut events);

    assert_eq!(session.state(), GameState::GameOver);
    assert_eq!(session.gold(), 0);
    assert_eq!(session.score(), 30);
    assert!(events.contains(&Event::LevelFailed { remaining: 7 }));
}

#[test]
fn queued_shooter_restarts_after_stop() {
    let mut session = LevelSession::new(SessionConfig::default());
    let mut events = Vec::new();

    session.load_level(single_row(10), &mut events);
    deploy(&mut session, 0, &mut events);
    session.stop_shooter(ShooterId::new(0), &mut events);
    session.enqueue_shooter(ShooterId::new(0), &mut events);
    for _ in 0..5 {
        session.tick(FRAME, &mut events);
    }

    let started = events
        .iter()
        .filter(|event| {
            **event
                == Event::ShootingStarted {
                    shooter: ShooterId::new(0),
                }
        })
        .count();
    assert_eq!(started, 2);
    assert!(events.contains(&Event::ShootingStopped {
        shooter: ShooterId::new(0),
    }));
}

fn scripted_run() -> Vec<Event> {
    let level = LevelData::from_symbols(&["YBRYBRYBRY", "BRYBRYBRYB"], 3)
        .expect("valid level")
        .with_shooters(vec![
            ShooterSpec::new(BlockColor::Yellow, 5),
            ShooterSpec::new(BlockColor::Blue, 5),
            ShooterSpec::new(BlockColor::Red, 5),
        ]);
    let mut session = LevelSession::new(SessionConfig::default());
    let mut events = Vec::new();

    session.load_level(level, &mut events);
    for shooter in 0..3 {
        deploy(&mut session, shooter, &mut events);
        session.tick(FRAME, &mut events);
    }
    for _ in 0..600 {
        session.tick(FRAME, &mut events);
    }
    events
}

#[test]
fn seeded_sessions_replay_identically() {
    let first = scripted_run();
    let second = scripted_run();

    assert!(first
        .iter()
        .any(|event| matches!(event, Event::BlockDestroyed { .. })));
    assert_eq!(fingerprint(&first), fingerprint(&second));
    assert_eq!(first, second);
}
