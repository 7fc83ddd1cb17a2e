//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::debug;

use opswatch_scheduler::SchedulerError;

/// Request-scoped API errors. None of these crash the process; each maps to
/// a response status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or mismatched API key.
    #[error("Access denied: missing or invalid API key")]
    Unauthorized,

    /// Request origin is not in the allowed set.
    #[error("Origin not allowed: {0}")]
    OriginRejected(String),

    /// Manual trigger for a name nobody registered.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// Manual trigger while the task is in flight.
    #[error("Task is already running: {0}")]
    TaskBusy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::UnknownTask(name) => ApiError::UnknownTask(name),
            SchedulerError::TaskBusy(name) => ApiError::TaskBusy(name),
            // Registration errors are fatal at boot; reaching here is a bug.
            SchedulerError::DuplicateTask(name) => {
                ApiError::Internal(format!("duplicate task registration: {name}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::OriginRejected(_) => StatusCode::FORBIDDEN,
            ApiError::UnknownTask(_) => StatusCode::NOT_FOUND,
            ApiError::TaskBusy(_) => {
                // Expected contention outcome, not an error condition.
                debug!("{self}");
                StatusCode::CONFLICT
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
