use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use metronome_core::Timestamp;
use tracing::trace;

/// An entry a timer can deliver: a readiness predicate plus the fire entry
/// point.
///
/// When a due entry reports not ready it is retained at its slot rather than
/// consumed, so it can be delivered on a later processing step. Engine
/// entries always report ready and encode refusal inside the fire handling
/// instead, so stale entries are consumed rather than parked forever.
pub trait Fireable: Send + Sync {
    /// Whether the entry is willing to fire when its slot comes up.
    fn is_ready(&self) -> bool {
        true
    }

    /// Deliver the fire.
    fn fire(&self);
}

/// Collaborator timer capability: arm entries at future logical times.
///
/// Arming never cancels or deduplicates earlier entries for the same target;
/// every call books an independent entry. A delay of zero means "fire on the
/// next processing step", never synchronously inside `schedule`. Entries for
/// one consumer are delivered one at a time, in non-decreasing time order,
/// and re-entrant `schedule` calls made from inside a firing callback must be
/// accepted.
pub trait EventTimer: Send + Sync {
    /// Arm `entry` to fire at `now() + delay`.
    fn schedule(&self, entry: Arc<dyn Fireable>, delay: Duration);

    /// Current logical time, monotonically non-decreasing.
    fn now(&self) -> Timestamp;
}

/// A timer that discards everything. Useful as a stand-in collaborator where
/// firing is not wanted.
#[derive(Debug, Default)]
pub struct NullTimer;

impl EventTimer for NullTimer {
    fn schedule(&self, _entry: Arc<dyn Fireable>, _delay: Duration) {}

    fn now(&self) -> Timestamp {
        Timestamp::ZERO
    }
}

#[derive(Default)]
struct TimerState {
    now: Timestamp,
    /// Booked entries by target time; ties fire in insertion order.
    entries: BTreeMap<Timestamp, VecDeque<Arc<dyn Fireable>>>,
}

/// Discrete-event timer over the logical timeline.
///
/// Entries are processed explicitly via [`step`](StepTimer::step) or
/// [`advance`](StepTimer::advance); each delivery moves `now` to the entry's
/// slot. The internal lock is released before an entry fires, so a callback
/// may re-enter [`EventTimer::schedule`]. Driving is expected from a single
/// thread at a time.
#[derive(Default)]
pub struct StepTimer {
    state: Mutex<TimerState>,
}

impl StepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the earliest booked slot and deliver its first entry if it
    /// reports ready. Returns the slot time, or `None` when nothing is
    /// booked. An entry that declines stays booked while `now` still moves
    /// to its slot.
    pub fn step(&self) -> Option<Timestamp> {
        self.deliver_next().map(|(at, _)| at)
    }

    /// Process every entry due within the next `span` of logical time, then
    /// settle `now` at the end of the span. Stops early if a due entry
    /// declines to fire.
    pub fn advance(&self, span: Duration) -> Timestamp {
        let end = self.now() + span;
        while let Some(next) = self.next_time() {
            if next > end {
                break;
            }
            let (_, delivered) = self
                .deliver_next()
                .expect("next_time reported a booked slot");
            if !delivered {
                break;
            }
        }
        let mut state = self.state.lock().unwrap();
        if state.now < end {
            state.now = end;
        }
        state.now
    }

    /// Earliest booked slot, if any.
    pub fn next_time(&self) -> Option<Timestamp> {
        self.state.lock().unwrap().entries.keys().next().copied()
    }

    /// Number of distinct booked slot times.
    pub fn entry_count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn has_entry_at(&self, at: Timestamp) -> bool {
        self.state.lock().unwrap().entries.contains_key(&at)
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().entries.is_empty()
    }

    fn deliver_next(&self) -> Option<(Timestamp, bool)> {
        let (at, entry) = {
            let mut state = self.state.lock().unwrap();
            let (&at, slot) = state.entries.iter().next()?;
            let entry = Arc::clone(slot.front().expect("booked slot is never empty"));
            debug_assert!(at >= state.now, "timer entries must fire in time order");
            state.now = at;
            (at, entry)
        };

        if !entry.is_ready() {
            trace!(%at, "entry not ready, retained");
            return Some((at, false));
        }

        {
            let mut state = self.state.lock().unwrap();
            let emptied = match state.entries.get_mut(&at) {
                Some(slot) => {
                    slot.pop_front();
                    slot.is_empty()
                }
                None => false,
            };
            if emptied {
                state.entries.remove(&at);
            }
        }
        trace!(%at, "delivering entry");
        entry.fire();
        Some((at, true))
    }
}

impl EventTimer for StepTimer {
    fn schedule(&self, entry: Arc<dyn Fireable>, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        let at = state.now + delay;
        state.entries.entry(at).or_default().push_back(entry);
    }

    fn now(&self) -> Timestamp {
        self.state.lock().unwrap().now
    }
}
