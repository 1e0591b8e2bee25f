//! Resolve Session Use Case
//!
//! Resolves the caller's identity from the forwarded cookie header,
//! refreshing an expired access credential at most once. The three backend
//! calls (identity, refresh, identity retry) are strictly sequential and
//! the retry never loops back into another refresh.

use std::sync::Arc;

use crate::domain::User;
use crate::domain::backend::{AuthBackend, IdentityReply, RefreshReply};
use platform::cookie;

/// Use-case output: identity plus cookies to relay to the caller
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    /// Resolved identity, if any
    pub user: Option<User>,
    /// `Set-Cookie` values captured from the refresh response. Relayed to
    /// the original caller even when the identity retry fails, so cookie
    /// clearing still reaches the browser.
    pub set_cookies: Vec<String>,
}

/// Resolve session use case
pub struct ResolveSessionUseCase<B>
where
    B: AuthBackend + Send + Sync + 'static,
{
    backend: Arc<B>,
}

impl<B> ResolveSessionUseCase<B>
where
    B: AuthBackend + Send + Sync + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Resolve the identity behind `cookie_header`
    ///
    /// Infallible by contract: every backend failure degrades to an
    /// unauthenticated outcome. Only a 401 from the identity check starts
    /// the refresh path; a 5xx or an unreachable backend does not.
    pub async fn execute(&self, cookie_header: &str) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();

        match self.backend.current_user(cookie_header).await {
            Ok(IdentityReply::Authenticated(user)) => {
                outcome.user = Some(user);
                return outcome;
            }
            Ok(IdentityReply::Unauthorized) => {}
            Ok(IdentityReply::Failed(status)) => {
                tracing::warn!(status = %status, "Identity check failed, continuing unauthenticated");
                return outcome;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identity check unreachable, continuing unauthenticated");
                return outcome;
            }
        }

        // Access credential expired or missing; one refresh attempt
        let set_cookies = match self.backend.refresh_session(cookie_header).await {
            Ok(RefreshReply::Renewed { set_cookies }) => set_cookies,
            Ok(RefreshReply::Denied(status)) => {
                tracing::debug!(status = %status, "Session refresh denied");
                return outcome;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh unreachable");
                return outcome;
            }
        };

        let updated_header = cookie::merge_cookie_header(cookie_header, &set_cookies);
        outcome.set_cookies = set_cookies;

        // Single retry with the merged cookie header
        match self.backend.current_user(&updated_header).await {
            Ok(IdentityReply::Authenticated(user)) => outcome.user = Some(user),
            Ok(IdentityReply::Unauthorized) | Ok(IdentityReply::Failed(_)) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Identity retry after refresh failed");
            }
        }

        outcome
    }
}
