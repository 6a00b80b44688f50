//! The schedule engine: per-task state machine deciding, on every timer
//! fire, whether to execute, defer, or absorb.
//!
//! Split into focused submodules:
//! - `core`: schedule state, arming operations, and the timer-entry token
//! - `fire`: fire handling (staleness, suspension, execute, conditional rearm)

mod core;
mod fire;

pub use self::core::Schedule;
