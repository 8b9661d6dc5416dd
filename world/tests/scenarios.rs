use std::time::Duration;

use blockfire_core::{
    ActivationError, BlockColor, CellCoord, Command, DestroyReason, Event, LevelData, ShooterId,
    ShooterSpec, ShootingState, SlotIndex,
};
use blockfire_world::{self as world, query, Config, World};
use rand::rngs::mock::StepRng;

const FRAME: Duration = Duration::from_millis(10);

fn new_world(config: Config) -> World {
    World::with_rng(config, StepRng::new(0, 0))
}

fn level(rows: &[&str], platforms: u32, shooters: &[(BlockColor, u32)]) -> LevelData {
    LevelData::from_symbols(rows, platforms)
        .expect("valid level")
        .with_shooters(
            shooters
                .iter()
                .map(|(color, bullets)| ShooterSpec::new(*color, *bullets))
                .collect(),
        )
}

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn run_for(world: &mut World, duration: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        world::apply(world, Command::Tick { dt: FRAME }, &mut events);
        elapsed += FRAME;
    }
    events
}

/// Activates the shooter and immediately reports its arrival.
fn dock(world: &mut World, shooter: ShooterId) -> Vec<Event> {
    let mut events = send(world, Command::ActivateShooter { shooter });
    let slot = events
        .iter()
        .find_map(|event| match event {
            Event::ShooterActivated { slot, .. } => Some(*slot),
            _ => None,
        })
        .expect("activation accepted");
    events.extend(send(world, Command::CompleteArrival { slot }));
    events
}

fn id(value: u32) -> ShooterId {
    ShooterId::new(value)
}

#[test]
fn full_row_clears_when_ammo_covers_every_block() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 10)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });

    let events = run_for(&mut world, Duration::from_secs(10));

    assert!(events.contains(&Event::LevelCleared { destroyed: 10 }));
    assert_eq!(query::destroyed_count(&world), 10);
    assert!(query::is_cleared(&world));
    assert!(events.contains(&Event::ShooterDestroyed {
        shooter: id(0),
        reason: DestroyReason::AmmoExhausted,
    }));
    assert!(events.contains(&Event::SlotReleased {
        slot: SlotIndex::new(0),
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LevelFailed { .. })));
}

#[test]
fn short_ammo_destroys_one_block_per_round_then_fails() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 3)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });

    let events = run_for(&mut world, Duration::from_secs(5));

    let destroyed = events
        .iter()
        .filter(|event| matches!(event, Event::BlockDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 3);
    assert_eq!(query::destroyed_count(&world), 3);
    assert!(events.contains(&Event::LevelFailed { remaining: 7 }));
    assert!(query::shooter_view(&world).is_empty());
}

#[test]
fn ammo_is_spent_once_per_launch() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 4)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });

    let events = run_for(&mut world, Duration::from_secs(3));

    let launches = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileLaunched { .. }))
        .count();
    let ammo_reports: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::AmmoChanged { ammo, .. } => Some(*ammo),
            _ => None,
        })
        .collect();
    assert_eq!(launches, 4);
    assert_eq!(ammo_reports, vec![3, 2, 1, 0]);
}

#[test]
fn mismatched_landing_refunds_and_keeps_shooter() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YRRRRRRRRR", "BRRRRRRRRR"],
                2,
                &[(BlockColor::Yellow, 2), (BlockColor::Yellow, 2)],
            ),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = dock(&mut world, id(1));

    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let mut events = run_for(&mut world, Duration::from_millis(100));
    events.extend(send(&mut world, Command::StartShooting { shooter: id(1) }));
    assert_eq!(
        query::claims(&world, id(1)),
        query::claims(&world, id(0)),
        "both shooters converge on the only yellow block"
    );
    events.extend(run_for(&mut world, Duration::from_secs(1)));

    let origin = CellCoord::new(0, 0);
    assert_eq!(
        query::block_at(&world, origin).map(|block| block.color),
        Some(BlockColor::Blue)
    );
    assert!(events.contains(&Event::WrongHit {
        shooter: id(1),
        cell: origin,
        streak: 1,
    }));
    assert!(events.contains(&Event::AmmoChanged {
        shooter: id(1),
        ammo: 2,
    }));

    let view = query::shooter_view(&world);
    let refunded = view.get(id(1)).expect("shooter survives the wrong hit");
    assert_eq!(refunded.ammo, 2);
    assert_eq!(refunded.max_ammo, 2);
    assert_eq!(refunded.wrong_hits, 1);
    assert_eq!(view.get(id(0)).map(|shooter| shooter.ammo), Some(1));
}

#[test]
fn last_round_wrong_hit_keeps_shooter_alive() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YRRRRRRRRR", "BRRRRRRRRR"],
                2,
                &[(BlockColor::Yellow, 2), (BlockColor::Yellow, 1)],
            ),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = dock(&mut world, id(1));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let _ = run_for(&mut world, Duration::from_millis(100));
    let _ = send(&mut world, Command::StartShooting { shooter: id(1) });

    let events = run_for(&mut world, Duration::from_secs(2));

    assert!(!events.contains(&Event::ShooterDestroyed {
        shooter: id(1),
        reason: DestroyReason::AmmoExhausted,
    }));
    let view = query::shooter_view(&world);
    let shooter = view.get(id(1)).expect("shooter kept after refund");
    assert_eq!(shooter.ammo, 1);
    assert_eq!(shooter.wrong_hits, 1);
}

#[test]
fn three_docked_shooters_merge_into_the_middle_slot() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["BBBBBBBBBB"],
                3,
                &[
                    (BlockColor::Yellow, 5),
                    (BlockColor::Yellow, 5),
                    (BlockColor::Yellow, 5),
                ],
            ),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = dock(&mut world, id(1));
    let arrival = dock(&mut world, id(2));

    assert!(arrival.contains(&Event::MergeStarted {
        color: BlockColor::Yellow,
        participants: vec![id(0), id(1), id(2)],
        ammo: 15,
    }));
    assert!(query::merge_in_progress(&world));

    let events = run_for(&mut world, Duration::from_millis(1300));

    assert!(events.contains(&Event::MergeCompleted {
        survivor: id(1),
        ammo: 15,
    }));
    for loser in [id(0), id(2)] {
        assert!(events.contains(&Event::ShooterDestroyed {
            shooter: loser,
            reason: DestroyReason::Merged,
        }));
    }
    assert!(query::can_occupy(&world, SlotIndex::new(0)));
    assert!(query::can_occupy(&world, SlotIndex::new(2)));
    assert_eq!(query::slot_occupant(&world, SlotIndex::new(1)), Some(id(1)));

    let view = query::shooter_view(&world);
    let survivor = view.get(id(1)).expect("survivor");
    assert_eq!((survivor.ammo, survivor.max_ammo), (15, 15));
    assert!(!survivor.merging);
    assert_eq!(view.len(), 1);
    assert!(!query::merge_in_progress(&world));
}

#[test]
fn merge_checks_during_a_merge_are_deferred_until_it_completes() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["RRRRRRRRRR"],
                7,
                &[
                    (BlockColor::Blue, 1),
                    (BlockColor::Blue, 2),
                    (BlockColor::Blue, 3),
                    (BlockColor::Yellow, 1),
                    (BlockColor::Yellow, 2),
                    (BlockColor::Yellow, 3),
                    (BlockColor::Yellow, 4),
                ],
            ),
        },
    );
    for shooter in 0..7 {
        let _ = dock(&mut world, id(shooter));
    }
    let ignored = send(
        &mut world,
        Command::CheckForMerge {
            color: BlockColor::Yellow,
        },
    );
    assert!(ignored.is_empty());

    let events = run_for(&mut world, Duration::from_millis(2600));

    assert!(events.contains(&Event::MergeCompleted {
        survivor: id(1),
        ammo: 6,
    }));
    assert!(events.contains(&Event::MergeStarted {
        color: BlockColor::Yellow,
        participants: vec![id(3), id(4), id(5), id(6)],
        ammo: 10,
    }));
    assert!(events.contains(&Event::MergeCompleted {
        survivor: id(5),
        ammo: 10,
    }));
    let survivors: Vec<ShooterId> = query::shooter_view(&world)
        .iter()
        .map(|shooter| shooter.id)
        .collect();
    assert_eq!(survivors, vec![id(1), id(5)]);
}

#[test]
fn stopped_shooter_never_fires_again() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 5)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let _ = run_for(&mut world, Duration::from_millis(100));

    let stopped = send(&mut world, Command::StopShooting { shooter: id(0) });
    assert!(stopped.contains(&Event::ShootingStopped { shooter: id(0) }));

    let events = run_for(&mut world, Duration::from_secs(3));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ProjectileLaunched { .. })));
    let view = query::shooter_view(&world);
    let shooter = view.get(id(0)).expect("shooter");
    assert_eq!(shooter.ammo, 5);
    assert_eq!(shooter.state, ShootingState::Idle);
    assert!(query::claims(&world, id(0)).is_empty());
    assert_eq!(query::pending_tasks(&world), 0);
}

#[test]
fn starting_twice_does_not_spawn_a_second_loop() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 5)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let pending = query::pending_tasks(&world);

    let repeated = send(&mut world, Command::StartShooting { shooter: id(0) });

    assert!(repeated.is_empty());
    assert_eq!(query::pending_tasks(&world), pending);
    let events = run_for(&mut world, Duration::from_millis(390));
    let launches = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileLaunched { .. }))
        .count();
    assert_eq!(launches, 1);
}

#[test]
fn simultaneous_activations_never_share_a_slot() {
    let config = Config {
        exclusive_moves: false,
        ..Config::default()
    };
    let mut world = new_world(config);
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YYYYYYYYYY"],
                2,
                &[
                    (BlockColor::Yellow, 1),
                    (BlockColor::Blue, 1),
                    (BlockColor::Red, 1),
                ],
            ),
        },
    );

    let mut events = Vec::new();
    for shooter in 0..3 {
        world::apply(
            &mut world,
            Command::ActivateShooter {
                shooter: id(shooter),
            },
            &mut events,
        );
    }

    assert_eq!(
        events,
        vec![
            Event::ShooterActivated {
                shooter: id(0),
                slot: SlotIndex::new(0),
            },
            Event::ShooterActivated {
                shooter: id(1),
                slot: SlotIndex::new(1),
            },
            Event::ActivationRejected {
                shooter: id(2),
                reason: ActivationError::SlotUnavailable,
            },
        ]
    );
}

#[test]
fn activation_rejects_ineligible_shooters() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YYYYYYYYYY"],
                2,
                &[(BlockColor::Yellow, 2), (BlockColor::Blue, 1)],
            ),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = dock(&mut world, id(1));

    let mut events = Vec::new();
    for shooter in [0, 9] {
        world::apply(
            &mut world,
            Command::ActivateShooter {
                shooter: id(shooter),
            },
            &mut events,
        );
    }

    let reasons: Vec<ActivationError> = events
        .iter()
        .filter_map(|event| match event {
            Event::ActivationRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![ActivationError::NotOnDeck, ActivationError::UnknownShooter]
    );
}

#[test]
fn ammo_never_exceeds_maximum_during_play() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YBYBYBYBYB", "BYBYBYBYBY", "RRYYBBRRYY"],
                3,
                &[
                    (BlockColor::Yellow, 6),
                    (BlockColor::Blue, 6),
                    (BlockColor::Red, 2),
                ],
            ),
        },
    );
    for shooter in 0..3 {
        let _ = dock(&mut world, id(shooter));
        let _ = send(
            &mut world,
            Command::StartShooting {
                shooter: id(shooter),
            },
        );
    }

    for _ in 0..600 {
        let _ = send(&mut world, Command::Tick { dt: FRAME });
        for shooter in query::shooter_view(&world).iter() {
            assert!(shooter.ammo <= shooter.max_ammo);
        }
    }
}

#[test]
fn shooters_without_ammo_leave_play_on_load() {
    let mut world = new_world(Config::default());
    let events = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 0)]),
        },
    );

    assert_eq!(
        events[1..],
        [
            Event::ShooterDestroyed {
                shooter: id(0),
                reason: DestroyReason::AmmoExhausted,
            },
            Event::LevelFailed { remaining: 10 },
        ]
    );
    assert!(query::shooter_view(&world).is_empty());

    let rejected = send(&mut world, Command::ActivateShooter { shooter: id(0) });
    assert_eq!(
        rejected,
        vec![Event::ActivationRejected {
            shooter: id(0),
            reason: ActivationError::UnknownShooter,
        }]
    );
}

#[test]
fn stopping_after_the_last_launch_frees_the_slot_once_it_lands() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 1, &[(BlockColor::Yellow, 1)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let _ = run_for(&mut world, Duration::from_millis(400));

    let stopped = send(&mut world, Command::StopShooting { shooter: id(0) });
    assert!(!stopped
        .iter()
        .any(|event| matches!(event, Event::ShooterDestroyed { .. })));
    assert_eq!(query::projectiles_in_flight(&world), 1);

    let events = run_for(&mut world, Duration::from_secs(1));

    assert_eq!(query::destroyed_count(&world), 1);
    assert!(events.contains(&Event::SlotReleased {
        slot: SlotIndex::new(0),
    }));
    assert!(events.contains(&Event::ShooterDestroyed {
        shooter: id(0),
        reason: DestroyReason::AmmoExhausted,
    }));
    assert!(events.contains(&Event::LevelFailed { remaining: 9 }));
    assert_eq!(query::slot_occupant(&world, SlotIndex::new(0)), None);
}

#[test]
fn stopping_a_spent_shooter_retires_it_at_once() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(&["YYYYYYYYYY"], 2, &[(BlockColor::Yellow, 1), (BlockColor::Blue, 3)]),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    // The only shot has landed; the loop has not looked at its ammunition since.
    let _ = run_for(&mut world, Duration::from_millis(700));
    assert_eq!(query::destroyed_count(&world), 1);
    assert_eq!(query::projectiles_in_flight(&world), 0);

    let stopped = send(&mut world, Command::StopShooting { shooter: id(0) });

    assert_eq!(
        stopped,
        vec![
            Event::ShooterColorChanged {
                shooter: id(0),
                color: BlockColor::Yellow,
            },
            Event::ShootingStopped { shooter: id(0) },
            Event::SlotReleased {
                slot: SlotIndex::new(0),
            },
            Event::ShooterDestroyed {
                shooter: id(0),
                reason: DestroyReason::AmmoExhausted,
            },
        ]
    );
    assert_eq!(query::shooter_view(&world).len(), 1);
}

#[test]
fn merged_ammo_matches_the_participants_before_the_merge() {
    let mut world = new_world(Config::default());
    let _ = send(
        &mut world,
        Command::LoadLevel {
            level: level(
                &["YYYYYYYYYY"],
                3,
                &[
                    (BlockColor::Yellow, 5),
                    (BlockColor::Yellow, 5),
                    (BlockColor::Yellow, 5),
                ],
            ),
        },
    );
    let _ = dock(&mut world, id(0));
    let _ = send(&mut world, Command::StartShooting { shooter: id(0) });
    let _ = run_for(&mut world, Duration::from_millis(400));
    let _ = dock(&mut world, id(1));
    let arrival = dock(&mut world, id(2));

    assert!(arrival.contains(&Event::MergeStarted {
        color: BlockColor::Yellow,
        participants: vec![id(0), id(1), id(2)],
        ammo: 14,
    }));

    let events = run_for(&mut world, Duration::from_millis(1300));

    assert_eq!(query::destroyed_count(&world), 1);
    assert!(events.contains(&Event::MergeCompleted {
        survivor: id(1),
        ammo: 14,
    }));
}

#[test]
fn oversized_shooter_lists_are_clamped_on_load() {
    let mut world = new_world(Config::default());
    let oversized = LevelData::from_symbols(&["YYYYYYYYYY"], 2)
        .expect("valid level")
        .with_shooters(vec![ShooterSpec::new(BlockColor::Yellow, 1); 100]);

    let events = send(&mut world, Command::LoadLevel { level: oversized });

    assert!(matches!(
        events.first(),
        Some(Event::LevelLoaded { shooters: 64, .. })
    ));
    assert_eq!(
        query::shooter_view(&world).len(),
        blockfire_core::MAX_SHOOTERS as usize
    );
}
