//! Shared-secret and origin enforcement for protected routes.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware applied to protected routes only.
///
/// Origin restriction is checked first: with a non-empty allowed set, a
/// cross-origin request from a non-member is rejected even when the key is
/// correct. When no API key is configured the routes are open (a boot-time
/// warning covers that case).
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.allowed_origins.is_empty() {
        if let Some(origin) = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
        {
            if !state.allowed_origins.iter().any(|o| o == origin) {
                warn!("Rejected protected request from origin {origin}");
                return Err(ApiError::OriginRejected(origin.to_string()));
            }
        }
    }

    let Some(expected) = &state.api_key else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(next.run(req).await)
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Constant-time byte comparison: XOR-folds over the common prefix and mixes
/// in the length difference so match failures do not leak where they diverge.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().min(b.len()) {
        diff |= (a[i] ^ b[i]) as usize;
    }
    diff == 0
}
