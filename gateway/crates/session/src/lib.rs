//! Session Relay
//!
//! Server-side session continuity for the web gateway. Every inbound
//! request's cookies are forwarded to the auth backend, the caller's
//! identity is resolved (refreshing an expired access credential at most
//! once), a routing decision is made, and any new `Set-Cookie` values are
//! relayed back to the original caller.
//!
//! Clean Architecture structure:
//! - `domain/` - Backend interface and reply types
//! - `application/` - The resolve-session use case and configuration
//! - `infra/` - HTTP implementation of the backend interface
//! - `presentation/` - Routing decision and the axum middleware
//!
//! The session credential itself is opaque: it is never parsed, never
//! stored and never logged by this crate.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::SessionConfig;
pub use application::resolve_session::{ResolveSessionUseCase, SessionOutcome};
pub use domain::backend::{AuthBackend, IdentityReply, RefreshReply};
pub use error::{SessionError, SessionResult};
pub use infra::http::HttpAuthBackend;
pub use presentation::middleware::{CurrentUser, RelayState, session_relay};
pub use presentation::routing::decide_route;
