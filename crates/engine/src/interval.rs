use std::sync::Mutex;
use std::time::Duration;

use metronome_core::Timestamp;

/// Supplies the recurrence interval and declared suspension windows for one
/// schedule.
///
/// Both values may change between calls (live reconfiguration); the engine
/// re-reads them on every fire.
pub trait IntervalSource: Send + Sync {
    /// The nominal recurrence period.
    fn interval(&self) -> Duration;

    /// Remaining time inside the suspension window containing `now`, or zero
    /// if `now` falls outside every declared window.
    fn scheduled_suspension(&self, now: Timestamp) -> Duration;
}

/// A constant interval with no suspension windows.
impl IntervalSource for Duration {
    fn interval(&self) -> Duration {
        *self
    }

    fn scheduled_suspension(&self, _now: Timestamp) -> Duration {
        Duration::ZERO
    }
}

/// A closed time range `[start, end]` during which a schedule must not fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspensionWindow {
    start: Timestamp,
    end: Timestamp,
}

impl SuspensionWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        debug_assert!(start <= end, "suspension window ends before it starts");
        Self { start, end }
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time <= self.end
    }

    /// Time left inside the window at `time`; zero at the closed upper bound
    /// or outside the window.
    pub fn remaining(&self, time: Timestamp) -> Duration {
        if self.contains(time) {
            self.end.saturating_since(time)
        } else {
            Duration::ZERO
        }
    }
}

/// An [`IntervalSource`] with a settable interval and a list of declared
/// suspension windows. Both can be changed while schedules are live.
pub struct FixedInterval {
    interval: Mutex<Duration>,
    suspensions: Mutex<Vec<SuspensionWindow>>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: Mutex::new(interval),
            suspensions: Mutex::new(Vec::new()),
        }
    }

    /// Replace the recurrence interval. Takes effect on the next fire, or
    /// immediately if the schedule is adjusted.
    pub fn set_interval(&self, interval: Duration) {
        *self.interval.lock().unwrap() = interval;
    }

    /// Declare a suspension window. Windows are expected to be disjoint.
    pub fn add_suspension(&self, window: SuspensionWindow) {
        self.suspensions.lock().unwrap().push(window);
    }
}

impl IntervalSource for FixedInterval {
    fn interval(&self) -> Duration {
        *self.interval.lock().unwrap()
    }

    fn scheduled_suspension(&self, now: Timestamp) -> Duration {
        self.suspensions
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.contains(now))
            .map(|w| w.remaining(now))
            .unwrap_or(Duration::ZERO)
    }
}
