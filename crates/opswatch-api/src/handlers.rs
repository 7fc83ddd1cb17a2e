//! Route handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use opswatch_scheduler::{JobRun, RunOutcome, TaskState};

use crate::error::ApiError;
use crate::state::AppState;

/// Process-wide summary returned by `/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub requests_served: u64,
    pub tasks_registered: usize,
    pub tasks_running: usize,
    pub runs_recorded: usize,
    pub recent_failures: usize,
}

/// Registry snapshot returned by `/jobs`.
#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub count: usize,
    pub tasks: Vec<TaskState>,
    pub recent_runs: Vec<JobRun>,
}

/// Result of a manual trigger.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run: JobRun,
}

/// Service metadata.
///
/// GET /
pub async fn service_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "opswatch",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "/health": "Liveness check",
            "/dashboard": "Web dashboard",
            "/status": "Process and scheduler summary (API key)",
            "/jobs": "Task registry snapshot (API key)",
            "/run/{task_name}": "Manually trigger a task (API key)",
        }
    }))
}

/// Liveness only. Deliberately touches nothing beyond the process itself so
/// it stays green while the backend is down.
///
/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Process and scheduler summary.
///
/// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let tasks = state.scheduler.registry().list();
    let recent = state.scheduler.history().recent(50);

    Json(StatusResponse {
        service: "opswatch".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        requests_served: state.request_count(),
        tasks_registered: tasks.len(),
        tasks_running: tasks.iter().filter(|t| t.running).count(),
        runs_recorded: state.scheduler.history().len(),
        recent_failures: recent
            .iter()
            .filter(|r| r.outcome == RunOutcome::Failure)
            .count(),
    })
}

/// Task registry snapshot with recent runs.
///
/// GET /jobs
pub async fn jobs(State(state): State<Arc<AppState>>) -> Json<JobsResponse> {
    let tasks = state.scheduler.registry().list();
    Json(JobsResponse {
        count: tasks.len(),
        tasks,
        recent_runs: state.scheduler.history().recent(20),
    })
}

/// Manually trigger a task. Bypasses the cadence check but not the
/// single-flight invariant.
///
/// POST /run/{task_name}
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    Path(task_name): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    info!("Manual trigger for task '{task_name}'");
    let run = state.scheduler.run(&task_name).await?;
    Ok(Json(RunResponse { run }))
}
