//! # Opswatch API
//!
//! The external HTTP surface of the monitoring service.
//!
//! Public routes: service metadata (`/`), liveness (`/health`), and the
//! read-only dashboard (`/dashboard`). Protected routes (`/status`, `/jobs`,
//! `POST /run/{task_name}`) require the shared-secret `x-api-key` header and,
//! when configured, an allowed `Origin`.

mod auth;
mod dashboard;
mod error;
mod handlers;
mod routes;
mod server;
mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use server::ApiServer;
pub use state::AppState;
