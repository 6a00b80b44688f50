use std::time::Duration;

use tracing::{debug, warn};

use crate::task::TaskError;

use super::core::{Schedule, Target};

impl Schedule {
    /// Timer callback for the entry armed with `generation`.
    ///
    /// Check order: terminal state, staleness, suspension, then execute and
    /// rearm. A stale fire is consumed with no other effect; the entry for
    /// the live target is already booked, having been armed by whichever
    /// retarget superseded this one.
    pub(super) fn on_fire(&self, generation: u64) {
        let now = self.timer.now();
        {
            let target = self.target.lock().unwrap();
            match *target {
                Target::Unarmed | Target::Disarmed => return,
                Target::Armed {
                    generation: live, ..
                } if live != generation => {
                    drop(target);
                    debug!(schedule = %self.name, %now, "stale fire absorbed");
                    if let Ok(mut m) = self.metrics.write() {
                        m.record_stale();
                    }
                    return;
                }
                Target::Armed { at, .. } => {
                    debug_assert_eq!(at, now, "live entry delivered off its target time");
                }
            }
        }

        let pause = self.interval.scheduled_suspension(now);
        if pause > Duration::ZERO {
            let until = now + pause;
            debug!(schedule = %self.name, %until, "fire inside suspension window, deferred");
            if let Ok(mut m) = self.metrics.write() {
                m.record_suspension();
            }
            let mut target = self.target.lock().unwrap();
            self.retarget(&mut target, until);
            return;
        }

        // The task runs with no lock held so it can re-enter adjust_schedule
        // on this very schedule.
        let result = self.task.execute();
        if let Ok(mut m) = self.metrics.write() {
            m.record_run();
        }

        // Interval is re-read after execution so a change made by the task
        // takes effect on the natural next step even without an adjust call.
        let next = self.timer.now() + self.interval.interval();
        {
            let mut target = self.target.lock().unwrap();
            match *target {
                Target::Armed {
                    generation: live, ..
                } if live == generation => {
                    self.retarget(&mut target, next);
                }
                // Anything else: a reentrant adjust or unschedule already
                // claimed the transition; the rearm is not ours to do.
                _ => {}
            }
        }

        // Failures are reported only after the rearm above, so a failing
        // task never halts the cadence.
        match result {
            Ok(()) => {
                debug!(schedule = %self.name, task = self.task.name(), "task ran");
            }
            Err(TaskError::Skipped(reason)) => {
                debug!(schedule = %self.name, task = self.task.name(), %reason, "task skipped");
            }
            Err(err) => {
                if let Ok(mut m) = self.metrics.write() {
                    m.record_failure();
                }
                warn!(schedule = %self.name, task = self.task.name(), error = %err, "task failed");
            }
        }
    }
}
