//! Session Relay Error Types

use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from talking to the auth backend
///
/// These never reach the end user: the relay logs them and degrades to an
/// unauthenticated outcome instead of failing the inbound request.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Network-level failure reaching the backend
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend response could not be interpreted
    #[error("Malformed backend response: {0}")]
    Malformed(String),
}
