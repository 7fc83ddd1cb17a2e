//! # Opswatch Scheduler
//!
//! Named, registerable units of work ("tasks") with optional recurrence,
//! an in-memory run history, and a single timing loop that triggers due tasks.
//!
//! Guarantees:
//! - At most one execution of a given task name is in flight at a time.
//!   Re-entrant triggers fail fast with [`SchedulerError::TaskBusy`] rather
//!   than queuing.
//! - Action failures (including panics) become failed [`JobRun`]s; they never
//!   take down the scheduler or the process.
//! - Runs for the same task are strictly ordered; runs across tasks are not.

mod engine;
mod error;
mod history;
mod registry;
mod task;

pub use engine::Scheduler;
pub use error::SchedulerError;
pub use history::RunHistory;
pub use registry::TaskRegistry;
pub use task::{JobRun, RunOutcome, TaskAction, TaskState};
