//! Task registry.
//!
//! Holds the set of named, schedulable operations and their recurrence.
//! Tasks are registered at process start and live only in memory; the
//! registry is rebuilt from source configuration on every boot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::SchedulerError;
use crate::task::{RunOutcome, TaskAction, TaskState};

struct TaskEntry {
    name: String,
    recurrence: Option<Duration>,
    action: TaskAction,
    last_run: Option<DateTime<Utc>>,
    last_outcome: Option<RunOutcome>,
    running: bool,
    run_count: u64,
}

impl TaskEntry {
    fn state(&self) -> TaskState {
        TaskState {
            name: self.name.clone(),
            recurrence_secs: self.recurrence.map(|d| d.as_secs()),
            last_run: self.last_run,
            last_outcome: self.last_outcome,
            running: self.running,
            run_count: self.run_count,
        }
    }
}

/// Registry of named tasks, in registration order.
///
/// All mutation happens under one lock, which is what makes the per-task
/// single-flight claim atomic against both cadence checks and manual
/// triggers. The lock is never held across an await point.
pub struct TaskRegistry {
    tasks: Mutex<Vec<TaskEntry>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Register a task. `recurrence: None` means manual-only.
    pub fn register(
        &self,
        name: impl Into<String>,
        recurrence: Option<Duration>,
        action: TaskAction,
    ) -> Result<(), SchedulerError> {
        let name = name.into();
        let mut tasks = self.tasks.lock();
        if tasks.iter().any(|t| t.name == name) {
            return Err(SchedulerError::DuplicateTask(name));
        }
        tasks.push(TaskEntry {
            name,
            recurrence,
            action,
            last_run: None,
            last_outcome: None,
            running: false,
            run_count: 0,
        });
        Ok(())
    }

    /// Snapshot of one task.
    pub fn get(&self, name: &str) -> Result<TaskState, SchedulerError> {
        let tasks = self.tasks.lock();
        tasks
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.state())
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))
    }

    /// Snapshot of all tasks, in registration order.
    pub fn list(&self) -> Vec<TaskState> {
        self.tasks.lock().iter().map(|t| t.state()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Atomically claim a task for execution: rejects unknown names and tasks
    /// already in flight, otherwise sets the running flag and hands back the
    /// action.
    pub(crate) fn try_claim(&self, name: &str) -> Result<TaskAction, SchedulerError> {
        let mut tasks = self.tasks.lock();
        let entry = tasks
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))?;
        if entry.running {
            return Err(SchedulerError::TaskBusy(name.to_string()));
        }
        entry.running = true;
        Ok(entry.action.clone())
    }

    /// Clear the running flag and record the outcome of a claimed run.
    pub(crate) fn finish(&self, name: &str, started_at: DateTime<Utc>, outcome: RunOutcome) {
        let mut tasks = self.tasks.lock();
        if let Some(entry) = tasks.iter_mut().find(|t| t.name == name) {
            entry.running = false;
            entry.last_run = Some(started_at);
            entry.last_outcome = Some(outcome);
            entry.run_count += 1;
        }
    }

    /// Names of recurring tasks due at `now`. A task that has never run is
    /// due immediately.
    pub(crate) fn due_tasks(&self, now: DateTime<Utc>) -> Vec<String> {
        let tasks = self.tasks.lock();
        tasks
            .iter()
            .filter(|t| !t.running)
            .filter(|t| match (t.recurrence, t.last_run) {
                (Some(_), None) => true,
                (Some(recurrence), Some(last)) => {
                    now.signed_duration_since(last).to_std().unwrap_or_default() >= recurrence
                }
                (None, _) => false,
            })
            .map(|t| t.name.clone())
            .collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
