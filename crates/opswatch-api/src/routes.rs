//! HTTP route definitions.
//!
//! ```text
//! GET  /                 - service metadata (public)
//! GET  /health           - liveness only (public)
//! GET  /dashboard        - read-only HTML view (public)
//! GET  /status           - process + scheduler summary (API key)
//! GET  /jobs             - task registry snapshot (API key)
//! POST /run/{task_name}  - manual trigger (API key; 404 unknown, 409 busy)
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::dashboard;
use crate::handlers;
use crate::state::AppState;

/// Build the router over a shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/status", get(handlers::status))
        .route("/jobs", get(handlers::jobs))
        .route("/run/{task_name}", post(handlers::run_task))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public = Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health))
        .route("/dashboard", get(dashboard::dashboard));

    protected
        .merge(public)
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_requests(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.increment_requests();
    next.run(req).await
}

/// Browser CORS layer. With a configured origin set only those origins are
/// allowed; otherwise everything is (permissive default, flagged at boot).
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
