//! Ordered queue of suspended work driven by the simulation clock.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    time::Duration,
};

use blockfire_core::{ProjectileId, ShooterId};

/// Stage of the merge sequence that runs when a task fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MergePhase {
    /// Participants have stopped; pick the survivor and total the ammunition.
    Settle,
    /// Hand the total to the survivor and remove the other participants.
    Combine,
    /// Release the survivor back into play.
    Resume,
}

/// Work suspended until a point on the simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    /// Next iteration of a shooter's loop.
    Resume {
        shooter: ShooterId,
        generation: u32,
    },
    /// Orientation finished; spawn the projectile.
    Launch {
        shooter: ShooterId,
        generation: u32,
    },
    /// Projectile reaches its target cell.
    Arrival { projectile: ProjectileId },
    /// Next merge stage.
    Merge { phase: MergePhase },
}

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    sequence: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.sequence).cmp(&(other.due, other.sequence))
    }
}

/// Min-heap keyed by due time; ties run in scheduling order.
#[derive(Debug, Default)]
pub(crate) struct Timeline {
    now: Duration,
    sequence: u64,
    pending: BinaryHeap<Reverse<Scheduled>>,
}

impl Timeline {
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    /// Schedules the task `delay` after the current clock reading.
    pub(crate) fn schedule(&mut self, delay: Duration, task: Task) {
        let scheduled = Scheduled {
            due: self.now.saturating_add(delay),
            sequence: self.sequence,
            task,
        };
        self.sequence = self.sequence.wrapping_add(1);
        self.pending.push(Reverse(scheduled));
    }

    /// Pops the earliest task due at or before `until`, moving the clock to it.
    pub(crate) fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let due = self.pending.peek().map(|Reverse(next)| next.due)?;
        if due > until {
            return None;
        }
        let Reverse(scheduled) = self.pending.pop()?;
        self.now = self.now.max(scheduled.due);
        Some(scheduled.task)
    }

    /// Moves the clock forward once every due task has run.
    pub(crate) fn settle_at(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.now = Duration::ZERO;
        self.sequence = 0;
    }
}
