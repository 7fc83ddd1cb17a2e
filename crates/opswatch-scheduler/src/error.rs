//! Scheduler error types.

use thiserror::Error;

/// Scheduler error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// A task with this name is already registered.
    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    /// No task with this name exists.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// The task is already running; re-entrant triggers are rejected.
    #[error("Task is already running: {0}")]
    TaskBusy(String),
}
