//! Bounded in-memory run history.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::task::JobRun;

/// Keeps the most recent job runs, oldest evicted first. Nothing here
/// survives a restart.
pub struct RunHistory {
    limit: usize,
    runs: Mutex<VecDeque<JobRun>>,
}

impl RunHistory {
    /// Create a history bounded to `limit` runs.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            runs: Mutex::new(VecDeque::new()),
        }
    }

    /// Record a completed run.
    pub fn record(&self, run: JobRun) {
        let mut runs = self.runs.lock();
        if runs.len() == self.limit {
            runs.pop_front();
        }
        runs.push_back(run);
    }

    /// Most recent runs, newest first.
    pub fn recent(&self, limit: usize) -> Vec<JobRun> {
        let runs = self.runs.lock();
        runs.iter().rev().take(limit).cloned().collect()
    }

    /// All retained runs for one task, newest first.
    pub fn for_task(&self, task: &str) -> Vec<JobRun> {
        let runs = self.runs.lock();
        runs.iter()
            .rev()
            .filter(|r| r.task == task)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.lock().is_empty()
    }
}
