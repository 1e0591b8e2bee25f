//! API Client Error Types

use thiserror::Error;

/// Client-specific result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the typed API methods
///
/// 401 handling never lands here: refresh and replay failures resolve to
/// the original response (plus the redirect side effect), not an error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a status the caller does not model
    #[error("Unexpected status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}
