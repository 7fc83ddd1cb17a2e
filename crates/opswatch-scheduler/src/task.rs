//! Task and job run types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// The work a task performs. Closures capture their collaborators (typically
/// a gateway handle); the returned message is recorded on the job run.
pub type TaskAction = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// Outcome of one task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Success,
    Failure,
}

/// Immutable record of one task execution.
#[derive(Debug, Clone, Serialize)]
pub struct JobRun {
    /// Name of the task that ran.
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    /// Success summary or failure reason.
    pub message: String,
}

impl JobRun {
    pub fn succeeded(&self) -> bool {
        self.outcome == RunOutcome::Success
    }
}

/// Point-in-time snapshot of a registered task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskState {
    pub name: String,
    /// Recurrence in seconds; absent means manual-only.
    pub recurrence_secs: Option<u64>,
    pub last_run: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
    pub running: bool,
    pub run_count: u64,
}
