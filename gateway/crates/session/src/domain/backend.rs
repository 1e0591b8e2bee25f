//! Auth Backend Interface
//!
//! The two backend endpoints the relay consumes. Implementation is in the
//! infrastructure layer; tests substitute a scripted in-memory backend.

use axum::http::StatusCode;

use crate::domain::User;
use crate::error::SessionResult;

/// Reply from the identity-check endpoint
#[derive(Debug, Clone)]
pub enum IdentityReply {
    /// 2xx with an identity record
    Authenticated(User),
    /// 401: access credential missing or expired
    Unauthorized,
    /// Any other status; the relay treats this as unauthenticated
    Failed(StatusCode),
}

/// Reply from the refresh endpoint
#[derive(Debug, Clone)]
pub enum RefreshReply {
    /// 200: new credentials issued via `Set-Cookie`
    Renewed {
        /// Every `Set-Cookie` value from the response, in header order
        set_cookies: Vec<String>,
    },
    /// Non-200: refresh credential rejected
    Denied(StatusCode),
}

/// Cookie-authenticated backend calls used by the relay
///
/// Both calls forward the caller's raw `Cookie` header; the credential is
/// never inspected on the way through.
#[trait_variant::make(AuthBackend: Send)]
pub trait LocalAuthBackend {
    /// `GET` the identity-check endpoint
    async fn current_user(&self, cookie_header: &str) -> SessionResult<IdentityReply>;

    /// `POST` the refresh endpoint
    async fn refresh_session(&self, cookie_header: &str) -> SessionResult<RefreshReply>;
}
