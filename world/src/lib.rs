#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Blockfire.
//!
//! The world owns the block grid, every shooter, the launch platforms and a
//! timeline of suspended work. Adapters and systems mutate it exclusively
//! through [`apply`] and observe it through the [`query`] module.

mod grid;
mod platform;
mod shooter;
mod timeline;

use std::{collections::BTreeMap, time::Duration};

use blockfire_core::{
    ActivationError, BlockColor, CellCoord, Command, DestroyReason, Event, LevelData, ProjectileId,
    ShooterId, ShootingState, SlotIndex, MAX_SHOOTERS,
};
use blockfire_system_targeting::{TargetDecision, TargetingPolicy};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    grid::Grid,
    platform::PlatformSlots,
    shooter::Shooter,
    timeline::{MergePhase, Task, Timeline},
};

const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const DEFAULT_MAX_WRONG_HITS: u32 = 3;
const MIN_LOOP_DELAY: Duration = Duration::from_millis(1);

/// Delays that pace a shooter's loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShooterTiming {
    /// Orientation time between picking a target and launching at it.
    pub aim: Duration,
    /// Wait after a shot before the loop looks for the next target.
    pub fire_delay: Duration,
    /// Wait after an invalid target or while a shot is still outstanding.
    pub retry_cooldown: Duration,
    /// Wait when nothing of the shooter's color is reachable.
    pub idle_wait: Duration,
    /// Time a projectile needs to reach its cell.
    pub projectile_flight: Duration,
}

impl Default for ShooterTiming {
    fn default() -> Self {
        Self {
            aim: Duration::from_millis(360),
            fire_delay: Duration::from_millis(400),
            retry_cooldown: Duration::from_millis(200),
            idle_wait: Duration::from_millis(500),
            projectile_flight: Duration::from_millis(300),
        }
    }
}

/// Delays between the stages of a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeTiming {
    /// Wait after stopping participants before the survivor is picked.
    pub settle: Duration,
    /// Duration of the combine animation.
    pub combine: Duration,
    /// Wait before the survivor may shoot again.
    pub resume: Duration,
}

impl Default for MergeTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(200),
            combine: Duration::from_millis(700),
            resume: Duration::from_millis(300),
        }
    }
}

/// Tunable gameplay rules of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Shooter loop pacing.
    pub shooter: ShooterTiming,
    /// Merge sequence pacing.
    pub merge: MergeTiming,
    /// Consecutive wrong hits after which refunds stop.
    pub max_wrong_hits: u32,
    /// Rejects activations while another shooter is still travelling.
    pub exclusive_moves: bool,
    /// Seed of the default targeting random source.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shooter: ShooterTiming::default(),
            merge: MergeTiming::default(),
            max_wrong_hits: DEFAULT_MAX_WRONG_HITS,
            exclusive_moves: true,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    shooter: ShooterId,
    color: BlockColor,
    target: CellCoord,
}

#[derive(Clone, Debug)]
struct MergeSequence {
    color: BlockColor,
    participants: Vec<ShooterId>,
    pre_merge: BTreeMap<ShooterId, u32>,
    survivor: Option<ShooterId>,
}

/// Represents the authoritative Blockfire world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    grid: Grid,
    shooters: BTreeMap<ShooterId, Shooter>,
    platforms: PlatformSlots,
    timeline: Timeline,
    targeting: TargetingPolicy<Box<dyn RngCore>>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_projectile: u32,
    merge: Option<MergeSequence>,
    failure_reported: bool,
}

impl World {
    /// Creates an empty world whose targeting draws from a seeded generator.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.rng_seed))
    }

    /// Creates an empty world whose targeting draws from the provided generator.
    #[must_use]
    pub fn with_rng<R>(config: Config, rng: R) -> Self
    where
        R: RngCore + 'static,
    {
        let rng: Box<dyn RngCore> = Box::new(rng);
        Self {
            config,
            grid: Grid::empty(),
            shooters: BTreeMap::new(),
            platforms: PlatformSlots::default(),
            timeline: Timeline::default(),
            targeting: TargetingPolicy::new(rng),
            projectiles: BTreeMap::new(),
            next_projectile: 0,
            merge: None,
            failure_reported: false,
        }
    }

    fn load_level(&mut self, level: &LevelData, out_events: &mut Vec<Event>) {
        self.grid = Grid::from_level(level);
        let shooter_count = level.shooter_count().min(MAX_SHOOTERS);
        self.shooters = (0..shooter_count)
            .map(|index| {
                let id = ShooterId::new(index);
                let spec = level.shooter_at(usize::try_from(index).unwrap_or(usize::MAX));
                (id, Shooter::new(id, spec))
            })
            .collect();
        self.platforms = PlatformSlots::new(level.platform_count());
        self.timeline.clear();
        self.projectiles.clear();
        self.next_projectile = 0;
        self.merge = None;
        self.failure_reported = false;

        info!(
            number = level.number(),
            name = level.name(),
            blocks = self.grid.total_blocks(),
            shooters = self.shooters.len(),
            "level loaded"
        );
        out_events.push(Event::LevelLoaded {
            columns: self.grid.columns(),
            rows: self.grid.rows(),
            blocks: self.grid.total_blocks(),
            shooters: shooter_count,
            platforms: self.platforms.len(),
        });

        let listed: Vec<ShooterId> = self.shooters.keys().copied().collect();
        for id in listed {
            self.retire_if_spent(id, out_events);
        }
        self.check_failure(out_events);
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let until = self.timeline.now().saturating_add(dt);
        while let Some(task) = self.timeline.pop_due(until) {
            self.run_task(task, out_events);
        }
        self.timeline.settle_at(until);
    }

    fn run_task(&mut self, task: Task, out_events: &mut Vec<Event>) {
        match task {
            Task::Resume {
                shooter,
                generation,
            } => {
                if self.is_current(shooter, generation) {
                    self.run_shooter(shooter, out_events);
                } else {
                    debug!(shooter = shooter.get(), "discarding stale resumption");
                }
            }
            Task::Launch {
                shooter,
                generation,
            } => {
                if self.is_current(shooter, generation) {
                    self.launch(shooter, out_events);
                } else {
                    debug!(shooter = shooter.get(), "discarding stale launch");
                }
            }
            Task::Arrival { projectile } => self.land(projectile, out_events),
            Task::Merge { phase } => self.advance_merge(phase, out_events),
        }
    }

    fn is_current(&self, shooter: ShooterId, generation: u32) -> bool {
        self.shooters.get(&shooter).map_or(false, |entry| {
            entry.generation == generation && entry.state == ShootingState::Shooting
        })
    }

    fn schedule_resume(&mut self, shooter: ShooterId, generation: u32, delay: Duration) {
        self.timeline.schedule(
            delay.max(MIN_LOOP_DELAY),
            Task::Resume {
                shooter,
                generation,
            },
        );
    }

    /// One iteration of the shooting loop. Claims are purged and the target
    /// searched within this single step.
    fn run_shooter(&mut self, id: ShooterId, out_events: &mut Vec<Event>) {
        let timing = self.config.shooter;
        let Some(shooter) = self.shooters.get_mut(&id) else {
            return;
        };
        let generation = shooter.generation;

        if shooter.ammo == 0 {
            if shooter.shot_outstanding() {
                self.schedule_resume(id, generation, timing.retry_cooldown);
            } else {
                self.destroy_shooter(id, DestroyReason::AmmoExhausted, out_events);
            }
            return;
        }

        if shooter.animation.pending_launch.is_some() {
            self.schedule_resume(id, generation, timing.retry_cooldown);
            return;
        }

        let grid = &self.grid;
        let bottom_row = grid.bottom_row();
        let decision = self.targeting.find_target(
            shooter.color,
            &mut shooter.targeting.claims,
            &bottom_row,
            |block| grid.block(block),
        );

        let delay = match decision {
            TargetDecision::Fresh(block) | TargetDecision::Reclaimed(block) => {
                if matches!(decision, TargetDecision::Fresh(_)) && shooter.highlight(Some(block.color)) {
                    out_events.push(Event::ShooterColorChanged {
                        shooter: id,
                        color: block.color,
                    });
                }

                let valid = grid
                    .block(block.id)
                    .map_or(false, |live| live.color == shooter.color);
                if valid {
                    shooter.animation.pending_launch = Some(block.id);
                    self.timeline.schedule(
                        timing.aim,
                        Task::Launch {
                            shooter: id,
                            generation,
                        },
                    );
                    timing.fire_delay
                } else {
                    let _ = shooter.targeting.claims.release(block.id);
                    timing.retry_cooldown
                }
            }
            TargetDecision::NoTarget => {
                if shooter.highlight(None) {
                    out_events.push(Event::ShooterColorChanged {
                        shooter: id,
                        color: shooter.color,
                    });
                }
                timing.idle_wait
            }
        };
        self.schedule_resume(id, generation, delay);
    }

    /// Launch phase of a shot: the only point where ammunition is spent.
    fn launch(&mut self, id: ShooterId, out_events: &mut Vec<Event>) {
        let Some(shooter) = self.shooters.get_mut(&id) else {
            return;
        };
        let Some(target) = shooter.animation.pending_launch.take() else {
            return;
        };
        let live = self
            .grid
            .block(target)
            .filter(|block| block.color == shooter.color);
        let Some(block) = live else {
            debug!(shooter = id.get(), block = target.get(), "target vanished before launch");
            let _ = shooter.targeting.claims.release(target);
            return;
        };
        if !shooter.consume_ammo() {
            return;
        }
        shooter.animation.in_flight = shooter.animation.in_flight.saturating_add(1);

        let projectile = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        let _ = self.projectiles.insert(
            projectile,
            Projectile {
                shooter: id,
                color: shooter.color,
                target: block.cell,
            },
        );

        out_events.push(Event::AmmoChanged {
            shooter: id,
            ammo: shooter.ammo,
        });
        out_events.push(Event::ProjectileLaunched {
            shooter: id,
            projectile,
            target: block.cell,
        });
        self.timeline
            .schedule(self.config.shooter.projectile_flight, Task::Arrival { projectile });
    }

    fn land(&mut self, id: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(projectile) = self.projectiles.remove(&id) else {
            return;
        };
        let mut owner = self.shooters.get_mut(&projectile.shooter);
        if let Some(shooter) = owner.as_deref_mut() {
            shooter.animation.in_flight = shooter.animation.in_flight.saturating_sub(1);
        }

        match self.grid.get(projectile.target) {
            None => out_events.push(Event::ProjectileMissed {
                projectile: id,
                cell: projectile.target,
            }),
            Some(block) if block.color == projectile.color => {
                match owner {
                    Some(shooter) => shooter.register_hit(block.id),
                    None => debug!(
                        shooter = projectile.shooter.get(),
                        "hit reported for a shooter that left play"
                    ),
                }
                let _ = self.grid.remove(projectile.target, out_events);
            }
            Some(_) => match owner {
                Some(shooter) => {
                    let refunded = shooter.register_wrong_hit(self.config.max_wrong_hits);
                    out_events.push(Event::WrongHit {
                        shooter: shooter.id,
                        cell: projectile.target,
                        streak: shooter.wrong_hits,
                    });
                    if refunded {
                        out_events.push(Event::AmmoChanged {
                            shooter: shooter.id,
                            ammo: shooter.ammo,
                        });
                    }
                }
                None => debug!(
                    shooter = projectile.shooter.get(),
                    "wrong hit reported for a shooter that left play"
                ),
            },
        }

        self.retire_if_spent(projectile.shooter, out_events);
        self.check_failure(out_events);
    }

    fn destroy_shooter(&mut self, id: ShooterId, reason: DestroyReason, out_events: &mut Vec<Event>) {
        let Some(mut shooter) = self.shooters.remove(&id) else {
            debug!(shooter = id.get(), "ignoring destruction of a shooter that left play");
            return;
        };
        let slot = shooter.slot.or(shooter.movement.reserved);
        shooter.teardown();

        if let Some(slot) = slot {
            if self.platforms.release(slot) {
                out_events.push(Event::SlotReleased { slot });
            }
        }
        debug!(shooter = id.get(), ?reason, "shooter destroyed");
        out_events.push(Event::ShooterDestroyed {
            shooter: id,
            reason,
        });
        self.check_failure(out_events);
    }

    fn activate(&mut self, id: ShooterId) -> Result<SlotIndex, ActivationError> {
        let snapshot = self
            .shooters
            .get(&id)
            .map(Shooter::snapshot)
            .ok_or(ActivationError::UnknownShooter)?;
        if self.config.exclusive_moves
            && self
                .shooters
                .values()
                .any(|shooter| shooter.state == ShootingState::Moving)
        {
            return Err(ActivationError::MoveInFlight);
        }
        if !snapshot.on_deck() {
            return Err(ActivationError::NotOnDeck);
        }
        if snapshot.ammo == 0 {
            return Err(ActivationError::OutOfAmmo);
        }

        let slot = self
            .platforms
            .first_free()
            .ok_or(ActivationError::SlotUnavailable)?;
        self.platforms
            .reserve(slot, id)
            .map_err(|_| ActivationError::SlotUnavailable)?;
        if let Some(shooter) = self.shooters.get_mut(&id) {
            shooter.begin_move(slot);
        }
        Ok(slot)
    }

    fn complete_arrival(&mut self, slot: SlotIndex, out_events: &mut Vec<Event>) {
        let Some(id) = self.platforms.complete(slot) else {
            debug!(slot = slot.get(), "arrival reported for a slot without reservation");
            return;
        };
        let Some(shooter) = self.shooters.get_mut(&id) else {
            let _ = self.platforms.release(slot);
            return;
        };
        shooter.dock(slot);
        let color = shooter.color;
        out_events.push(Event::SlotArrived { slot, shooter: id });
        self.check_for_merge(color, out_events);
    }

    fn start_shooting(&mut self, id: ShooterId, out_events: &mut Vec<Event>) {
        let Some(shooter) = self.shooters.get_mut(&id) else {
            debug!(shooter = id.get(), "start requested for a shooter that left play");
            return;
        };
        if !shooter.start() {
            debug!(shooter = id.get(), state = ?shooter.state, "start ignored");
            return;
        }
        out_events.push(Event::ShootingStarted { shooter: id });
        self.run_shooter(id, out_events);
    }

    fn stop_shooting(&mut self, id: ShooterId, out_events: &mut Vec<Event>) {
        let Some(shooter) = self.shooters.get_mut(&id) else {
            debug!(shooter = id.get(), "stop requested for a shooter that left play");
            return;
        };
        halt(shooter, out_events);
        self.retire_if_spent(id, out_events);
    }

    /// Destroys a shooter that is out of ammunition and no longer running its
    /// loop. Shooting shooters retire from their own loop and merge
    /// participants are resolved by the merge.
    fn retire_if_spent(&mut self, id: ShooterId, out_events: &mut Vec<Event>) {
        let spent = self.shooters.get(&id).map_or(false, |shooter| {
            shooter.ammo == 0
                && shooter.state != ShootingState::Shooting
                && !shooter.merging
                && !shooter.shot_outstanding()
        });
        if spent {
            self.destroy_shooter(id, DestroyReason::AmmoExhausted, out_events);
        }
    }

    fn check_for_merge(&mut self, color: BlockColor, out_events: &mut Vec<Event>) {
        if self.merge.is_some() {
            debug!(%color, "merge already in progress");
            return;
        }

        let participants: Vec<ShooterId> = self
            .platforms
            .occupied()
            .filter_map(|(_, id)| self.shooters.get(&id))
            .filter(|shooter| shooter.color == color)
            .map(|shooter| shooter.id)
            .collect();
        if participants.len() < 3 {
            return;
        }

        for id in &participants {
            if let Some(shooter) = self.shooters.get_mut(id) {
                halt(shooter, out_events);
                shooter.merging = true;
            }
        }

        let pre_merge: BTreeMap<ShooterId, u32> = participants
            .iter()
            .filter_map(|id| self.shooters.get(id))
            .map(|shooter| (shooter.id, shooter.ammo))
            .collect();
        let ammo = pre_merge
            .values()
            .fold(0_u32, |sum, ammo| sum.saturating_add(*ammo));

        info!(%color, participants = participants.len(), ammo, "merge started");
        out_events.push(Event::MergeStarted {
            color,
            participants: participants.clone(),
            ammo,
        });
        self.merge = Some(MergeSequence {
            color,
            participants,
            pre_merge,
            survivor: None,
        });
        self.timeline.schedule(
            self.config.merge.settle,
            Task::Merge {
                phase: MergePhase::Settle,
            },
        );
    }

    fn advance_merge(&mut self, phase: MergePhase, out_events: &mut Vec<Event>) {
        let Some(merge) = self.merge.as_mut() else {
            return;
        };

        match phase {
            MergePhase::Settle => {
                let shooters = &mut self.shooters;
                merge.participants.retain(|id| shooters.contains_key(id));
                for id in &merge.participants {
                    if let Some(shooter) = shooters.get_mut(id) {
                        halt(shooter, out_events);
                    }
                }
                merge
                    .participants
                    .sort_by_key(|id| shooters.get(id).and_then(|shooter| shooter.slot));

                if merge.participants.is_empty() {
                    self.abort_merge();
                    return;
                }
                let middle = merge.participants.len() / 2;
                merge.survivor = Some(merge.participants[middle]);
                self.timeline.schedule(
                    self.config.merge.combine,
                    Task::Merge {
                        phase: MergePhase::Combine,
                    },
                );
            }
            MergePhase::Combine => {
                let Some(survivor) = merge.survivor else {
                    self.abort_merge();
                    return;
                };
                let participants = merge.participants.clone();
                let total = participants
                    .iter()
                    .filter_map(|id| merge.pre_merge.get(id))
                    .fold(0_u32, |sum, ammo| sum.saturating_add(*ammo));

                for id in participants.into_iter().filter(|id| *id != survivor) {
                    self.destroy_shooter(id, DestroyReason::Merged, out_events);
                }

                let Some(shooter) = self.shooters.get_mut(&survivor) else {
                    self.abort_merge();
                    return;
                };
                shooter.ammo = total;
                shooter.max_ammo = total;
                out_events.push(Event::AmmoChanged {
                    shooter: survivor,
                    ammo: total,
                });
                self.timeline.schedule(
                    self.config.merge.resume,
                    Task::Merge {
                        phase: MergePhase::Resume,
                    },
                );
            }
            MergePhase::Resume => {
                let color = merge.color;
                let survivor = merge.survivor;
                self.abort_merge();

                let outcome = survivor
                    .and_then(|id| self.shooters.get(&id))
                    .map(|shooter| (shooter.id, shooter.ammo));
                if let Some((id, ammo)) = outcome {
                    info!(%color, survivor = id.get(), ammo, "merge completed");
                    out_events.push(Event::MergeCompleted { survivor: id, ammo });
                    if ammo == 0 {
                        self.destroy_shooter(id, DestroyReason::AmmoExhausted, out_events);
                    }
                }

                for color in BlockColor::ALL {
                    self.check_for_merge(color, out_events);
                }
            }
        }
    }

    /// Ends the running merge and returns its remaining participants to play.
    fn abort_merge(&mut self) {
        let Some(merge) = self.merge.take() else {
            return;
        };
        for id in merge.participants {
            if let Some(shooter) = self.shooters.get_mut(&id) {
                shooter.merging = false;
            }
        }
    }

    fn check_failure(&mut self, out_events: &mut Vec<Event>) {
        if self.failure_reported
            || self.grid.is_cleared()
            || !self.shooters.is_empty()
            || !self.projectiles.is_empty()
        {
            return;
        }
        self.failure_reported = true;
        let remaining = self.grid.remaining();
        info!(remaining, "no shooters left");
        out_events.push(Event::LevelFailed { remaining });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Stops a shooter's loop and reports it, reverting its highlight.
fn halt(shooter: &mut Shooter, out_events: &mut Vec<Event>) {
    if !shooter.stop() {
        return;
    }
    if shooter.highlight(None) {
        out_events.push(Event::ShooterColorChanged {
            shooter: shooter.id,
            color: shooter.color,
        });
    }
    out_events.push(Event::ShootingStopped { shooter: shooter.id });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => world.load_level(&level, out_events),
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::ActivateShooter { shooter } => match world.activate(shooter) {
            Ok(slot) => out_events.push(Event::ShooterActivated { shooter, slot }),
            Err(reason) => {
                debug!(shooter = shooter.get(), %reason, "activation rejected");
                out_events.push(Event::ActivationRejected { shooter, reason });
            }
        },
        Command::CompleteArrival { slot } => world.complete_arrival(slot, out_events),
        Command::StartShooting { shooter } => world.start_shooting(shooter, out_events),
        Command::StopShooting { shooter } => world.stop_shooting(shooter, out_events),
        Command::CheckForMerge { color } => world.check_for_merge(color, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Config, World};
    use blockfire_core::{
        BlockColor, BlockId, BlockSnapshot, CellCoord, PlatformView, ShooterId, ShooterView,
        SlotIndex,
    };

    /// Provides read-only access to the rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Simulated time elapsed since the level was loaded.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.timeline.now()
    }

    /// Number of `(columns, rows)` in the current grid.
    #[must_use]
    pub fn grid_dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Block resting in the cell. Cells outside the grid read as empty.
    #[must_use]
    pub fn block_at(world: &World, cell: CellCoord) -> Option<BlockSnapshot> {
        world.grid.get(cell)
    }

    /// Every live block in identifier order.
    #[must_use]
    pub fn blocks(world: &World) -> Vec<BlockSnapshot> {
        world.grid.snapshots()
    }

    /// Blocks resting on row zero in column order.
    #[must_use]
    pub fn bottom_row(world: &World) -> Vec<BlockSnapshot> {
        world.grid.bottom_row()
    }

    /// Number of blocks the level started with.
    #[must_use]
    pub fn total_blocks(world: &World) -> u32 {
        world.grid.total_blocks()
    }

    /// Number of blocks destroyed so far.
    #[must_use]
    pub fn destroyed_count(world: &World) -> u32 {
        world.grid.destroyed_count()
    }

    /// Number of blocks still on the grid.
    #[must_use]
    pub fn remaining_blocks(world: &World) -> u32 {
        world.grid.remaining()
    }

    /// Reports whether every block has been destroyed.
    #[must_use]
    pub fn is_cleared(world: &World) -> bool {
        world.grid.is_cleared()
    }

    /// Captures a read-only view of every shooter in play.
    #[must_use]
    pub fn shooter_view(world: &World) -> ShooterView {
        ShooterView::from_snapshots(world.shooters.values().map(|shooter| shooter.snapshot()).collect())
    }

    /// Captures a read-only view of the launch platforms.
    #[must_use]
    pub fn platform_view(world: &World) -> PlatformView {
        PlatformView::from_snapshots(world.platforms.iter().collect())
    }

    /// Reports whether the slot may be reserved right now.
    #[must_use]
    pub fn can_occupy(world: &World, slot: SlotIndex) -> bool {
        world.platforms.can_occupy(slot)
    }

    /// Shooter docked on the slot, if any.
    #[must_use]
    pub fn slot_occupant(world: &World, slot: SlotIndex) -> Option<ShooterId> {
        world.platforms.occupant(slot)
    }

    /// Blocks currently claimed by the shooter.
    #[must_use]
    pub fn claims(world: &World, shooter: ShooterId) -> Vec<BlockId> {
        world
            .shooters
            .get(&shooter)
            .map(|entry| entry.targeting.claims.iter().collect())
            .unwrap_or_default()
    }

    /// Color the shooter is highlighted with while it has a target.
    #[must_use]
    pub fn highlight(world: &World, shooter: ShooterId) -> Option<BlockColor> {
        world
            .shooters
            .get(&shooter)
            .and_then(|entry| entry.targeting.highlight)
    }

    /// Reports whether a merge sequence is running.
    #[must_use]
    pub fn merge_in_progress(world: &World) -> bool {
        world.merge.is_some()
    }

    /// Number of projectiles that have not landed yet.
    #[must_use]
    pub fn projectiles_in_flight(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Number of suspended tasks waiting on the timeline.
    #[must_use]
    pub fn pending_tasks(world: &World) -> usize {
        world.timeline.len()
    }
}
