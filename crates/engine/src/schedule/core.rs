use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use metronome_core::Timestamp;
use tracing::{debug, info};

use crate::interval::IntervalSource;
use crate::metrics::ScheduleMetrics;
use crate::task::Task;
use crate::timer::{EventTimer, Fireable};

/// The authoritative next-fire state of one schedule.
///
/// At most one target is ever live; every timer entry armed for an earlier
/// target is stale by definition and absorbed at fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Target {
    /// Created but never armed.
    Unarmed,
    /// Armed to fire at `at`; `generation` identifies the one live entry.
    Armed { at: Timestamp, generation: u64 },
    /// Explicitly unscheduled. Outstanding entries arrive and do nothing.
    Disarmed,
}

/// Timer-facing token booked for one armed target.
///
/// The timer references, never owns, the schedule; a token whose schedule has
/// been dropped is consumed without effect. The token always reports ready,
/// and refusal is encoded in the fire handling instead, so stale entries get
/// consumed rather than staying parked at their slot.
pub(super) struct FireEntry {
    schedule: Weak<Schedule>,
    generation: u64,
}

impl Fireable for FireEntry {
    fn is_ready(&self) -> bool {
        true
    }

    fn fire(&self) {
        if let Some(schedule) = self.schedule.upgrade() {
            schedule.on_fire(self.generation);
        }
    }
}

/// Recurring-fire state for one task against one timer.
///
/// The schedule owns the task and consults its [`IntervalSource`] on every
/// fire; arming books entries with the collaborator timer and nothing is ever
/// cancelled, since superseded entries are absorbed by the staleness check.
/// All operations are synchronous state transitions; instances are
/// independent and safe to dispatch from a worker pool.
pub struct Schedule {
    pub(super) name: String,
    pub(super) task: Arc<dyn Task>,
    pub(super) interval: Arc<dyn IntervalSource>,
    pub(super) timer: Arc<dyn EventTimer>,
    pub(super) target: Mutex<Target>,
    /// Arm counter; the latest value marks the only live timer entry.
    pub(super) generations: AtomicU64,
    pub(super) metrics: RwLock<ScheduleMetrics>,
    weak_self: Weak<Schedule>,
}

impl Schedule {
    /// Create a schedule bound to exactly one task/interval/timer triple.
    /// Nothing is armed until [`schedule`](Schedule::schedule) is called.
    pub fn new(
        name: impl Into<String>,
        task: Arc<dyn Task>,
        interval: Arc<dyn IntervalSource>,
        timer: Arc<dyn EventTimer>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            name: name.into(),
            task,
            interval,
            timer,
            target: Mutex::new(Target::Unarmed),
            generations: AtomicU64::new(0),
            metrics: RwLock::new(ScheduleMetrics::default()),
            weak_self: weak_self.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the diagnostic counters.
    pub fn metrics(&self) -> ScheduleMetrics {
        self.metrics.read().unwrap().clone()
    }

    /// Times the task has been invoked.
    pub fn run_count(&self) -> u64 {
        self.metrics.read().unwrap().runs
    }

    /// Arm the first fire for the current time, with zero delay: the task
    /// runs on the timer's next processing step, never synchronously inside
    /// this call. Also revives an unscheduled schedule.
    pub fn schedule(&self) {
        let now = self.timer.now();
        let mut target = self.target.lock().unwrap();
        self.retarget(&mut target, now);
        info!(schedule = %self.name, at = %now, "scheduled");
    }

    /// Move to the terminal disarmed state. Outstanding timer entries are not
    /// cancelled; they arrive, find the schedule disarmed, and are absorbed.
    pub fn unschedule(&self) {
        *self.target.lock().unwrap() = Target::Disarmed;
        info!(schedule = %self.name, "unscheduled");
    }

    /// Retarget to `now + interval`, re-reading the interval source so a
    /// live interval change takes effect immediately. Callable at any time,
    /// including from inside the task's own `execute`; entries armed for
    /// earlier targets become stale. A never-armed schedule is armed; an
    /// unscheduled one stays unscheduled.
    pub fn adjust_schedule(&self) {
        let next = self.timer.now() + self.interval.interval();
        let mut target = self.target.lock().unwrap();
        if matches!(*target, Target::Disarmed) {
            debug!(schedule = %self.name, "adjust ignored, schedule is unscheduled");
            return;
        }
        self.retarget(&mut target, next);
        debug!(schedule = %self.name, at = %next, "schedule adjusted");
    }

    /// Set the authoritative target and book the matching timer entry.
    ///
    /// Both happen under the caller's target lock so that no second target
    /// can become live in between. The timer contract guarantees `schedule`
    /// never fires entries synchronously, so holding the lock across the
    /// booking cannot re-enter.
    pub(super) fn retarget(&self, target: &mut Target, at: Timestamp) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        *target = Target::Armed { at, generation };
        let delay = at.saturating_since(self.timer.now());
        self.timer.schedule(
            Arc::new(FireEntry {
                schedule: self.weak_self.clone(),
                generation,
            }),
            delay,
        );
    }
}
