//! Recurring-task scheduling engine driven by an abstract discrete-event timer.
//!
//! A [`Schedule`] re-fires a wrapped [`Task`] at a self-adjusting cadence
//! supplied by an [`IntervalSource`], defers fires that land inside declared
//! suspension windows, and absorbs timer entries superseded by a more recent
//! reschedule. The timer itself is a collaborator behind the [`EventTimer`]
//! trait; [`StepTimer`] is the discrete-event implementation used for
//! deterministic driving.

pub mod config;
pub mod interval;
pub mod metrics;
pub mod schedule;
pub mod task;
pub mod timer;

pub use config::{ScheduleConfig, SuspensionConfig};
pub use interval::{FixedInterval, IntervalSource, SuspensionWindow};
pub use metrics::ScheduleMetrics;
pub use schedule::Schedule;
pub use task::{Task, TaskError};
pub use timer::{EventTimer, Fireable, NullTimer, StepTimer};
