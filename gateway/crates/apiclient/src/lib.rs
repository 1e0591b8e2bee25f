//! API Client
//!
//! Browser-context API client with transparent session refresh: a 401
//! carrying the invalid-credential error code triggers a single shared
//! refresh call, the original request is replayed once from a duplicate
//! captured before its body was consumed, and a terminal refresh failure
//! fires a login-redirect hook while the caller still receives the
//! original 401.
//!
//! Flat module layout:
//! - `client` - the refresh-aware [`ApiClient`] and its typed endpoints
//! - `refresh` - the single-flight [`RefreshGate`]
//! - `form` - form-submission outcomes (validation errors, messages)
//! - `error` - error types

pub mod client;
pub mod error;
pub mod form;
pub mod refresh;

// Re-exports for convenience
pub use client::{ApiClient, LoginRedirect, NoRedirect};
pub use error::{ApiError, ApiResult};
pub use form::FormOutcome;
pub use platform::contract::{
    AuthResponse, FieldErrors, LoginRequest, SignupRequest, User,
};
pub use refresh::RefreshGate;

#[cfg(test)]
mod tests;
