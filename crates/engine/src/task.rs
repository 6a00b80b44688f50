use thiserror::Error;

/// Error type for task execution.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task failed: {0}")]
    Failed(String),
    #[error("Task skipped: {0}")]
    Skipped(String),
}

/// A unit of work that a [`Schedule`](crate::Schedule) re-fires periodically.
///
/// `execute` may call [`Schedule::adjust_schedule`](crate::Schedule::adjust_schedule)
/// on the owning schedule, synchronously, from inside its own invocation; the
/// engine detects the reentrant retarget and skips its own rearm.
pub trait Task: Send + Sync {
    /// Human-readable name for logging and metrics.
    fn name(&self) -> &str;

    /// Execute one occurrence of the task.
    fn execute(&self) -> Result<(), TaskError>;
}
