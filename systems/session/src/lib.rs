#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level session that wires the world and the fire scheduler together.
//!
//! A [`LevelSession`] owns one [`World`] and one [`FireScheduler`]. Every
//! operation applies its command to the world, lets the scheduler react to
//! the resulting events, applies the commands the scheduler emitted and
//! repeats until nothing is left. All events are appended to the caller's
//! buffer in the order the world produced them.

use std::{collections::VecDeque, time::Duration};

use blockfire_core::{Command, Event, LevelData, ShooterId, SlotIndex};
use blockfire_system_fire_scheduler::{self as fire_scheduler, FireScheduler};
use blockfire_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_LEVEL_GOLD_REWARD: u32 = 50;
const DEFAULT_POINTS_PER_BLOCK: u32 = 10;

/// Configuration parameters required to construct a level session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Rules handed to the world.
    pub world: world::Config,
    /// Cadence of the fire scheduler.
    pub scheduler: fire_scheduler::Config,
    /// Gold awarded when a level is cleared.
    pub level_gold_reward: u32,
    /// Score awarded per destroyed block.
    pub points_per_block: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world: world::Config::default(),
            scheduler: fire_scheduler::Config::default(),
            level_gold_reward: DEFAULT_LEVEL_GOLD_REWARD,
            points_per_block: DEFAULT_POINTS_PER_BLOCK,
        }
    }
}

/// Progress of the level being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// No level has been loaded yet.
    Idle,
    /// The level is being played.
    Playing,
    /// Every block was destroyed.
    LevelComplete,
    /// Every shooter is gone while blocks remain.
    GameOver,
}

/// Errors raised when navigating the level catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The requested level index does not exist.
    #[error("level {index} is not in the catalog of {count} levels")]
    UnknownLevel {
        /// Requested index.
        index: usize,
        /// Number of catalog levels.
        count: usize,
    },
    /// The current level is the last one in the catalog.
    #[error("no level follows catalog level {index}")]
    CatalogExhausted {
        /// Index of the current level.
        index: usize,
    },
}

/// Ordered list of levels a player progresses through.
#[derive(Clone, Debug, Default)]
pub struct LevelCatalog {
    levels: Vec<LevelData>,
}

impl LevelCatalog {
    /// Creates a catalog from levels in play order.
    #[must_use]
    pub fn new(levels: Vec<LevelData>) -> Self {
        Self { levels }
    }

    /// Level at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Snapshot of the session used for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of the level being played.
    pub level_number: u32,
    /// Display name of the level being played.
    pub level_name: String,
    /// Progress of the level.
    pub state: GameState,
    /// Score collected in the current level.
    pub score: u32,
    /// Score the level expects players to reach.
    pub target_score: u32,
    /// Gold carried across levels.
    pub gold: u32,
    /// Blocks destroyed in the current level.
    pub destroyed: u32,
    /// Blocks the current level started with.
    pub total_blocks: u32,
    /// Simulated time spent in the current level.
    pub elapsed: Duration,
}

/// Explicit owner of the world, the scheduler and the player's progress.
#[derive(Debug)]
pub struct LevelSession {
    config: SessionConfig,
    world: World,
    scheduler: FireScheduler,
    catalog: LevelCatalog,
    current: Option<usize>,
    level: Option<LevelData>,
    state: GameState,
    gold: u32,
    score: u32,
}

impl LevelSession {
    /// Creates a session without a catalog.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_catalog(config, LevelCatalog::default())
    }

    /// Creates a session that progresses through the provided catalog.
    #[must_use]
    pub fn with_catalog(config: SessionConfig, catalog: LevelCatalog) -> Self {
        Self::with_world(config, World::new(config.world), catalog)
    }

    /// Creates a session around a prepared world, e.g. one with an injected
    /// random source.
    #[must_use]
    pub fn with_world(config: SessionConfig, world: World, catalog: LevelCatalog) -> Self {
        Self {
            config,
            world,
            scheduler: FireScheduler::new(config.scheduler),
            catalog,
            current: None,
            level: None,
            state: GameState::Idle,
            gold: 0,
            score: 0,
        }
    }

    /// Loads a level outside the catalog.
    pub fn load_level(&mut self, level: LevelData, out: &mut Vec<Event>) {
        self.current = None;
        self.start_level(level, out);
    }

    /// Loads the catalog level at `index`.
    pub fn load_catalog_level(
        &mut self,
        index: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), SessionError> {
        let level = self
            .catalog
            .get(index)
            .cloned()
            .ok_or(SessionError::UnknownLevel {
                index,
                count: self.catalog.len(),
            })?;
        self.current = Some(index);
        self.start_level(level, out);
        Ok(())
    }

    /// Loads the catalog level after the current one, or the first level
    /// when none has been loaded from the catalog yet.
    pub fn next_level(&mut self, out: &mut Vec<Event>) -> Result<(), SessionError> {
        let next = self.current.map_or(0, |index| index + 1);
        if next >= self.catalog.len() {
            return match self.current {
                Some(index) => Err(SessionError::CatalogExhausted { index }),
                None => Err(SessionError::UnknownLevel {
                    index: next,
                    count: self.catalog.len(),
                }),
            };
        }
        self.load_catalog_level(next, out)
    }

    /// Player selected an on-deck shooter.
    pub fn activate_shooter(&mut self, shooter: ShooterId, out: &mut Vec<Event>) {
        self.pump(Command::ActivateShooter { shooter }, out);
    }

    /// The presentation layer finished moving a shooter onto `slot`.
    pub fn arrive(&mut self, slot: SlotIndex, out: &mut Vec<Event>) {
        self.pump(Command::CompleteArrival { slot }, out);
    }

    /// Stops a shooter's loop.
    pub fn stop_shooter(&mut self, shooter: ShooterId, out: &mut Vec<Event>) {
        self.pump(Command::StopShooting { shooter }, out);
    }

    /// Requests a bulk fire pass over every docked shooter.
    pub fn fire_all(&mut self, out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.scheduler
            .fire_all(&query::shooter_view(&self.world), &mut commands);
        for command in commands {
            self.pump(command, out);
        }
    }

    /// Queues a single shooter for an ad-hoc start.
    pub fn enqueue_shooter(&mut self, shooter: ShooterId, out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.scheduler
            .enqueue(shooter, &query::shooter_view(&self.world), &mut commands);
        for command in commands {
            self.pump(command, out);
        }
    }

    /// Advances the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.pump(Command::Tick { dt }, out);
    }

    /// Provides read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Provides read-only access to the fire scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &FireScheduler {
        &self.scheduler
    }

    /// Provides mutable access to the fire scheduler, e.g. to retune it.
    pub fn scheduler_mut(&mut self) -> &mut FireScheduler {
        &mut self.scheduler
    }

    /// Progress of the current level.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Gold carried across levels.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Score collected in the current level.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Catalog index of the current level, if it came from the catalog.
    #[must_use]
    pub fn current_level(&self) -> Option<usize> {
        self.current
    }

    /// Rules the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Summarises the current level for reporting.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let (level_number, level_name, target_score) = self
            .level
            .as_ref()
            .map(|level| (level.number(), level.name().to_owned(), level.target_score()))
            .unwrap_or_default();
        SessionSummary {
            level_number,
            level_name,
            state: self.state,
            score: self.score,
            target_score,
            gold: self.gold,
            destroyed: query::destroyed_count(&self.world),
            total_blocks: query::total_blocks(&self.world),
            elapsed: query::elapsed(&self.world),
        }
    }

    fn start_level(&mut self, level: LevelData, out: &mut Vec<Event>) {
        self.level = Some(level.clone());
        self.pump(Command::LoadLevel { level }, out);
    }

    fn pump(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut pending = VecDeque::from([command]);
        while let Some(command) = pending.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);

            let mut follow_up = Vec::new();
            self.scheduler
                .handle(&events, &query::shooter_view(&self.world), &mut follow_up);
            self.observe(&events);

            out.extend(events);
            pending.extend(follow_up);
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelLoaded { .. } => {
                    self.state = GameState::Playing;
                    self.score = 0;
                }
                Event::BlockDestroyed { .. } => {
                    self.score = self.score.saturating_add(self.config.points_per_block);
                }
                Event::LevelCleared { destroyed } => {
                    if self.state == GameState::Playing {
                        self.state = GameState::LevelComplete;
                        self.gold = self.gold.saturating_add(self.config.level_gold_reward);
                        info!(destroyed, gold = self.gold, score = self.score, "level complete");
                    }
                }
                Event::LevelFailed { remaining } => {
                    if self.state == GameState::Playing {
                        self.state = GameState::GameOver;
                        info!(remaining, score = self.score, "game over");
                    }
                }
                Event::ActivationRejected { shooter, reason } => {
                    debug!(shooter = shooter.get(), %reason, "activation rejected");
                }
                _ => {}
            }
        }
    }
}
