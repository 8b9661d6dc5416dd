use std::{collections::BTreeMap, time::Duration};

use blockfire_core::{BlockColor, Event, ShooterId, ShooterSnapshot, SlotIndex};
use blockfire_session::LevelSession;
use blockfire_world::query;
use tracing::debug;

/// Plays a level by dispatching shooters and standing in for their travel.
///
/// One shooter travels at a time. Each accepted activation is followed by
/// an arrival once the configured travel time has elapsed.
#[derive(Debug)]
pub(crate) struct Autopilot {
    travel: Duration,
    in_transit: Vec<(SlotIndex, Duration)>,
}

impl Autopilot {
    pub(crate) fn new(travel: Duration) -> Self {
        Self {
            travel,
            in_transit: Vec::new(),
        }
    }

    /// Advances travelling shooters and dispatches the next one when idle.
    pub(crate) fn step(&mut self, session: &mut LevelSession, dt: Duration, out: &mut Vec<Event>) {
        let mut arrived = Vec::new();
        self.in_transit.retain_mut(|(slot, remaining)| {
            *remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                arrived.push(*slot);
                false
            } else {
                true
            }
        });
        for slot in arrived {
            session.arrive(slot, out);
        }

        if !self.in_transit.is_empty() {
            return;
        }
        let Some(shooter) = choose_shooter(session) else {
            return;
        };

        let mut events = Vec::new();
        session.activate_shooter(shooter, &mut events);
        for event in &events {
            if let Event::ShooterActivated { slot, .. } = event {
                self.in_transit.push((*slot, self.travel));
            }
        }
        out.extend(events);
    }

    /// Forgets travelling shooters, e.g. after a new level was loaded.
    pub(crate) fn reset(&mut self) {
        self.in_transit.clear();
    }
}

/// Picks the on-deck shooter whose color has the most bottom-row blocks.
fn choose_shooter(session: &LevelSession) -> Option<ShooterId> {
    let world = session.world();
    if query::platform_view(world).free_slots().next().is_none() {
        return None;
    }

    let mut exposed: BTreeMap<BlockColor, usize> = BTreeMap::new();
    for block in query::bottom_row(world) {
        *exposed.entry(block.color).or_default() += 1;
    }

    let view = query::shooter_view(world);
    let candidates: Vec<&ShooterSnapshot> = view
        .iter()
        .filter(|shooter| shooter.on_deck() && shooter.ammo > 0)
        .collect();
    let best = candidates
        .iter()
        .max_by_key(|shooter| {
            (
                exposed.get(&shooter.color).copied().unwrap_or(0),
                std::cmp::Reverse(shooter.id),
            )
        })
        .map(|shooter| shooter.id);
    if let Some(shooter) = best {
        debug!(shooter = shooter.get(), "dispatching shooter");
    }
    best
}
