#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sequential fire scheduler that staggers shooter start commands.
//!
//! When several shooters become ready at once (after a slot arrival or a
//! merge) the scheduler triggers them one per interval in slot order and
//! gives up once the pass has waited for its budget. Shooters left over are
//! picked up by the next pass. A secondary queue serves ad-hoc single
//! shooter triggers; only one pass of either kind runs at a time.

use std::{collections::VecDeque, time::Duration};

use blockfire_core::{Command, Event, ShooterId, ShooterView};

/// Smallest accepted delay between two triggers.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Smallest accepted wait budget for a single pass.
pub const MIN_MAX_WAIT: Duration = Duration::from_millis(100);

const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(500);

/// Configuration parameters required to construct the fire scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    interval: Duration,
    max_wait: Duration,
}

impl Config {
    /// Creates a new configuration using the provided cadence and wait budget.
    #[must_use]
    pub const fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Delay between two consecutive triggers.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulated wait after which a pass stops triggering.
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

/// Kind of pass currently triggering shooters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    /// Every docked shooter that was ready when the pass began.
    Bulk,
    /// Shooters submitted through [`FireScheduler::enqueue`].
    Queue,
}

#[derive(Debug)]
struct Pass {
    kind: PassKind,
    pending: VecDeque<ShooterId>,
    waited: Duration,
    next_at: Duration,
}

/// Pure system that turns fire requests into paced `StartShooting` commands.
#[derive(Debug)]
pub struct FireScheduler {
    interval: Duration,
    max_wait: Duration,
    clock: Duration,
    pass: Option<Pass>,
    queue: VecDeque<ShooterId>,
    bulk_deferred: bool,
    queue_deferred: bool,
}

impl FireScheduler {
    /// Creates a new fire scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            max_wait: config.max_wait,
            clock: Duration::ZERO,
            pass: None,
            queue: VecDeque::new(),
            bulk_deferred: false,
            queue_deferred: false,
        }
    }

    /// Consumes world events and emits the start commands that became due.
    ///
    /// Slot arrivals and completed merges request a bulk pass; elapsed time
    /// advances the running pass; loading a level drops all pending work.
    pub fn handle(&mut self, events: &[Event], shooters: &ShooterView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.clock = self.clock.saturating_add(*dt);
                    self.drive(shooters, out);
                }
                Event::SlotArrived { .. } | Event::MergeCompleted { .. } => {
                    self.fire_all(shooters, out);
                }
                Event::LevelLoaded { .. } => self.reset(),
                _ => {}
            }
        }
    }

    /// Starts a bulk pass over every docked shooter that is ready to fire.
    ///
    /// The first shooter is triggered immediately. When another pass is
    /// running the request is remembered and served once that pass ends.
    pub fn fire_all(&mut self, shooters: &ShooterView, out: &mut Vec<Command>) {
        if self.pass.is_some() {
            self.bulk_deferred = true;
            return;
        }
        self.begin_bulk(shooters);
        self.drive(shooters, out);
    }

    /// Queues a single shooter, starting a queue pass when nothing is running.
    pub fn enqueue(&mut self, shooter: ShooterId, shooters: &ShooterView, out: &mut Vec<Command>) {
        self.queue.push_back(shooter);
        self.process_queue(shooters, out);
    }

    /// Starts a queue pass over the queued shooters.
    pub fn process_queue(&mut self, shooters: &ShooterView, out: &mut Vec<Command>) {
        match self.active_pass() {
            Some(PassKind::Bulk) => {
                self.queue_deferred = true;
                return;
            }
            // The running queue pass drains new entries itself.
            Some(PassKind::Queue) => return,
            None => {}
        }
        if self.queue.is_empty() {
            return;
        }
        self.begin(PassKind::Queue, VecDeque::new());
        self.drive(shooters, out);
    }

    /// Drops queued shooters and cancels a running queue pass.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.queue_deferred = false;
        if self.pass.as_ref().map(|pass| pass.kind) == Some(PassKind::Queue) {
            self.pass = None;
        }
    }

    /// Reports whether the queue is empty and no queue pass is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.pass.as_ref().map(|pass| pass.kind) != Some(PassKind::Queue)
    }

    /// Number of shooters waiting in the queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Kind of the pass currently running, if any.
    #[must_use]
    pub fn active_pass(&self) -> Option<PassKind> {
        self.pass.as_ref().map(|pass| pass.kind)
    }

    /// Delay between two consecutive triggers.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulated wait after which a pass stops triggering.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Sets the trigger interval, raising it to [`MIN_INTERVAL`] if needed.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    /// Sets the pass budget, raising it to [`MIN_MAX_WAIT`] if needed.
    pub fn set_max_wait(&mut self, max_wait: Duration) {
        self.max_wait = max_wait.max(MIN_MAX_WAIT);
    }

    fn reset(&mut self) {
        self.pass = None;
        self.queue.clear();
        self.bulk_deferred = false;
        self.queue_deferred = false;
    }

    fn begin_bulk(&mut self, shooters: &ShooterView) {
        let ready: VecDeque<ShooterId> = shooters
            .docked_in_slot_order()
            .into_iter()
            .filter(|shooter| shooter.ready_to_fire())
            .map(|shooter| shooter.id)
            .collect();
        if !ready.is_empty() {
            self.begin(PassKind::Bulk, ready);
        }
    }

    fn begin(&mut self, kind: PassKind, pending: VecDeque<ShooterId>) {
        self.pass = Some(Pass {
            kind,
            pending,
            waited: Duration::ZERO,
            next_at: self.clock,
        });
    }

    fn drive(&mut self, shooters: &ShooterView, out: &mut Vec<Command>) {
        loop {
            let Some(pass) = self.pass.as_mut() else {
                return;
            };
            if self.clock < pass.next_at {
                return;
            }

            // Bulk passes check the budget before triggering, queue passes after.
            let next = match pass.kind {
                PassKind::Bulk if pass.waited >= self.max_wait => None,
                PassKind::Bulk => next_ready(&mut pass.pending, shooters),
                PassKind::Queue => next_ready(&mut self.queue, shooters),
            };
            let Some(shooter) = next else {
                self.end_pass(shooters);
                continue;
            };

            out.push(Command::StartShooting { shooter });
            let exhausted = pass.kind == PassKind::Queue && pass.waited >= self.max_wait;
            pass.waited = pass.waited.saturating_add(self.interval);
            pass.next_at = pass.next_at.saturating_add(self.interval);
            if exhausted {
                self.end_pass(shooters);
            }
        }
    }

    fn end_pass(&mut self, shooters: &ShooterView) {
        self.pass = None;
        if self.bulk_deferred {
            self.bulk_deferred = false;
            self.begin_bulk(shooters);
        } else if self.queue_deferred {
            self.queue_deferred = false;
            if !self.queue.is_empty() {
                self.begin(PassKind::Queue, VecDeque::new());
            }
        }
    }
}

impl Default for FireScheduler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn next_ready(pending: &mut VecDeque<ShooterId>, shooters: &ShooterView) -> Option<ShooterId> {
    while let Some(shooter) = pending.pop_front() {
        if shooters
            .get(shooter)
            .map_or(false, |snapshot| snapshot.ready_to_fire())
        {
            return Some(shooter);
        }
    }
    None
}
