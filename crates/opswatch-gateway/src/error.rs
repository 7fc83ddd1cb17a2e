//! Gateway error types.

use thiserror::Error;

/// Errors from the record store backend.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend error {status}: {body}")]
    Backend { status: u16, body: String },

    /// Backend answered but the payload was not what we expect.
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// Backend is unreachable or deliberately disabled.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
