use chrono::{DateTime, Utc};
use serde::Serialize;

/// Diagnostic counters for one schedule, exposed as a snapshot.
///
/// `runs` counts invocations of the wrapped task; stale fires and suspension
/// deferrals never touch it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleMetrics {
    /// Times the task has been invoked.
    pub runs: u64,
    /// Invocations that returned an error (skips excluded).
    pub failures: u64,
    /// Superseded timer entries absorbed without effect.
    pub stale_fires: u64,
    /// Fires deferred to the end of a suspension window.
    pub suspensions: u64,
    /// Wall-clock time of the most recent invocation.
    pub last_run: Option<DateTime<Utc>>,
}

impl ScheduleMetrics {
    pub(crate) fn record_run(&mut self) {
        self.runs += 1;
        self.last_run = Some(Utc::now());
    }

    pub(crate) fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub(crate) fn record_stale(&mut self) {
        self.stale_fires += 1;
    }

    pub(crate) fn record_suspension(&mut self) {
        self.suspensions += 1;
    }
}
