//! Scheduler engine: manual triggers and the timing loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::history::RunHistory;
use crate::registry::TaskRegistry;
use crate::task::{JobRun, RunOutcome};

/// The scheduler: one logical clock over the registry, plus manual triggers.
pub struct Scheduler {
    registry: Arc<TaskRegistry>,
    history: Arc<RunHistory>,
    tick_interval: Duration,
}

impl Scheduler {
    /// Create a scheduler over a registry, retaining up to `history_limit`
    /// job runs.
    pub fn new(registry: Arc<TaskRegistry>, history_limit: usize) -> Self {
        Self {
            registry,
            history: Arc::new(RunHistory::new(history_limit)),
            tick_interval: Duration::from_secs(30),
        }
    }

    /// Set the cadence-check interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &Arc<RunHistory> {
        &self.history
    }

    /// Trigger a task by name, bypassing the cadence check.
    ///
    /// Fails fast with [`SchedulerError::TaskBusy`] while the task is in
    /// flight and [`SchedulerError::UnknownTask`] for unregistered names (no
    /// job run is recorded in either case). Action errors and panics are
    /// captured as failed runs, not propagated.
    pub async fn run(&self, name: &str) -> Result<JobRun, SchedulerError> {
        let action = self.registry.try_claim(name)?;
        let registry = self.registry.clone();
        let history = self.history.clone();
        let task = name.to_string();
        let started_at = Utc::now();

        // The whole execute/finish/record lifecycle lives on its own tokio
        // task: dropping this future (a client disconnecting mid-run) must
        // not leave the running flag set.
        let handle = tokio::spawn(async move {
            debug!("Task '{task}' started");

            // The action in turn runs on a nested task so a panic surfaces
            // as a JoinError instead of skipping the bookkeeping below.
            let result = tokio::spawn(action()).await;
            let (outcome, message) = match result {
                Ok(Ok(message)) => (RunOutcome::Success, message),
                Ok(Err(e)) => (RunOutcome::Failure, e.to_string()),
                Err(e) => (RunOutcome::Failure, format!("task panicked: {e}")),
            };

            registry.finish(&task, started_at, outcome);

            let run = JobRun {
                task,
                started_at,
                finished_at: Utc::now(),
                outcome,
                message,
            };
            match outcome {
                RunOutcome::Success => info!("Task '{}' completed: {}", run.task, run.message),
                RunOutcome::Failure => warn!("Task '{}' failed: {}", run.task, run.message),
            }
            history.record(run.clone());
            run
        });

        match handle.await {
            Ok(run) => Ok(run),
            // Only reachable when the runtime is tearing down mid-run.
            Err(e) => Ok(JobRun {
                task: name.to_string(),
                started_at,
                finished_at: Utc::now(),
                outcome: RunOutcome::Failure,
                message: format!("run aborted: {e}"),
            }),
        }
    }

    /// Run the timing loop until the cancellation channel fires.
    ///
    /// Each tick collects due tasks and fires them on their own tokio tasks
    /// so a slow run never delays the next cadence check.
    pub async fn run_loop(self: Arc<Self>, cancel: tokio::sync::watch::Receiver<bool>) {
        info!(
            "Scheduler started ({} task(s), tick every {:?})",
            self.registry.len(),
            self.tick_interval
        );

        let mut interval = time::interval(self.tick_interval);
        let mut cancel = cancel;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    for name in self.registry.due_tasks(Utc::now()) {
                        debug!("Task '{name}' is due");
                        let scheduler = self.clone();
                        tokio::spawn(async move {
                            match scheduler.run(&name).await {
                                Ok(_) => {}
                                // Lost the claim race to a manual trigger;
                                // expected contention, not an error.
                                Err(SchedulerError::TaskBusy(_)) => {}
                                Err(e) => warn!("Scheduled trigger for '{name}' failed: {e}"),
                            }
                        });
                    }
                }
                _ = cancel.changed() => {
                    info!("Scheduler shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
