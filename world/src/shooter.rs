//! Shooter entities and their owned sub-states.

use blockfire_core::{
    BlockColor, BlockId, ShooterId, ShooterSnapshot, ShooterSpec, ShootingState, SlotIndex,
};
use blockfire_system_targeting::ClaimSet;

/// Shared lifecycle of the parts a shooter is composed of.
pub(crate) trait Lifecycle {
    /// Puts the part into its freshly spawned state.
    fn initialize(&mut self);

    /// Drops whatever the part holds on to when its activity ends.
    fn cleanup(&mut self);
}

/// Slot reserved for a shooter that is still travelling.
#[derive(Clone, Debug, Default)]
pub(crate) struct MovementState {
    pub(crate) reserved: Option<SlotIndex>,
}

impl Lifecycle for MovementState {
    fn initialize(&mut self) {
        self.reserved = None;
    }

    fn cleanup(&mut self) {
        self.reserved = None;
    }
}

/// Claimed blocks plus the color the shooter is currently highlighted with.
#[derive(Clone, Debug, Default)]
pub(crate) struct TargetingState {
    pub(crate) claims: ClaimSet,
    pub(crate) highlight: Option<BlockColor>,
}

impl Lifecycle for TargetingState {
    fn initialize(&mut self) {
        self.claims.clear();
        self.highlight = None;
    }

    fn cleanup(&mut self) {
        self.claims.clear();
    }
}

/// Shot bookkeeping between aiming and the projectile landing.
#[derive(Clone, Debug, Default)]
pub(crate) struct AnimationHooks {
    /// Block the shooter is turning towards; launch has not happened yet.
    pub(crate) pending_launch: Option<BlockId>,
    /// Projectiles fired by this shooter that have not landed.
    pub(crate) in_flight: u32,
}

impl Lifecycle for AnimationHooks {
    fn initialize(&mut self) {
        self.pending_launch = None;
        self.in_flight = 0;
    }

    fn cleanup(&mut self) {
        // Projectiles already launched keep flying and still report back.
        self.pending_launch = None;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Shooter {
    pub(crate) id: ShooterId,
    pub(crate) color: BlockColor,
    pub(crate) ammo: u32,
    pub(crate) max_ammo: u32,
    pub(crate) wrong_hits: u32,
    pub(crate) state: ShootingState,
    pub(crate) slot: Option<SlotIndex>,
    pub(crate) merging: bool,
    /// Bumped whenever suspended work for this shooter must be discarded.
    pub(crate) generation: u32,
    pub(crate) movement: MovementState,
    pub(crate) targeting: TargetingState,
    pub(crate) animation: AnimationHooks,
}

impl Shooter {
    pub(crate) fn new(id: ShooterId, spec: ShooterSpec) -> Self {
        let mut shooter = Self {
            id,
            color: spec.color,
            ammo: spec.bullets,
            max_ammo: spec.bullets,
            wrong_hits: 0,
            state: ShootingState::Idle,
            slot: None,
            merging: false,
            generation: 0,
            movement: MovementState::default(),
            targeting: TargetingState::default(),
            animation: AnimationHooks::default(),
        };
        shooter.movement.initialize();
        shooter.targeting.initialize();
        shooter.animation.initialize();
        shooter
    }

    pub(crate) fn snapshot(&self) -> ShooterSnapshot {
        ShooterSnapshot {
            id: self.id,
            color: self.color,
            ammo: self.ammo,
            max_ammo: self.max_ammo,
            state: self.state,
            slot: self.slot,
            reserved_slot: self.movement.reserved,
            merging: self.merging,
            wrong_hits: self.wrong_hits,
        }
    }

    pub(crate) fn begin_move(&mut self, slot: SlotIndex) {
        self.state = ShootingState::Moving;
        self.movement.reserved = Some(slot);
    }

    pub(crate) fn dock(&mut self, slot: SlotIndex) {
        self.movement.cleanup();
        self.slot = Some(slot);
        self.state = ShootingState::Idle;
    }

    /// Enters the shooting loop. Returns `false` when the shooter cannot fire.
    pub(crate) fn start(&mut self) -> bool {
        if !self.snapshot().ready_to_fire() {
            return false;
        }
        self.state = ShootingState::Shooting;
        true
    }

    /// Leaves the shooting loop and invalidates any suspended resumption.
    ///
    /// Returns `true` when the shooter was shooting.
    pub(crate) fn stop(&mut self) -> bool {
        let was_shooting = self.state == ShootingState::Shooting;
        if was_shooting {
            self.state = ShootingState::Idle;
        }
        self.cancel_tasks();
        self.targeting.cleanup();
        self.animation.cleanup();
        was_shooting
    }

    /// Releases every owned sub-state before the shooter leaves play.
    pub(crate) fn teardown(&mut self) {
        let _ = self.stop();
        self.movement.cleanup();
        self.slot = None;
    }

    pub(crate) fn cancel_tasks(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Sets the highlight color. Returns `true` when it changed.
    pub(crate) fn highlight(&mut self, color: Option<BlockColor>) -> bool {
        if self.targeting.highlight == color {
            return false;
        }
        self.targeting.highlight = color;
        true
    }

    pub(crate) fn consume_ammo(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    /// Records a correct hit, resetting the wrong-hit streak.
    pub(crate) fn register_hit(&mut self, block: BlockId) {
        self.wrong_hits = 0;
        let _ = self.targeting.claims.release(block);
    }

    /// Records a wrong hit and refunds one round while the streak stays below
    /// `max_wrong_hits`. Returns whether ammunition was refunded.
    pub(crate) fn register_wrong_hit(&mut self, max_wrong_hits: u32) -> bool {
        self.wrong_hits = self.wrong_hits.saturating_add(1);
        if self.wrong_hits >= max_wrong_hits || self.ammo >= self.max_ammo {
            return false;
        }
        self.ammo += 1;
        true
    }

    /// Reports whether a shot is between aiming and landing.
    pub(crate) fn shot_outstanding(&self) -> bool {
        self.animation.pending_launch.is_some() || self.animation.in_flight > 0
    }
}
