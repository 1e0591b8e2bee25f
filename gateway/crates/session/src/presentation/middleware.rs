//! Session Relay Middleware
//!
//! Runs once per inbound request: resolves identity through the backend,
//! decides routing, and relays refreshed cookies back to the caller.
//! Requests are fully independent; there is no state shared across them.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::resolve_session::ResolveSessionUseCase;
use crate::domain::User;
use crate::domain::backend::AuthBackend;
use crate::presentation::routing::decide_route;
use platform::cookie::raw_cookie_header;

/// Middleware state
#[derive(Clone)]
pub struct RelayState<B>
where
    B: AuthBackend + Clone + Send + Sync + 'static,
{
    pub backend: Arc<B>,
    pub config: Arc<SessionConfig>,
}

/// Identity resolved for the current request, stored in request extensions
/// for the duration of the request/response cycle
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Relay middleware: resolve identity, decide routing, forward cookies
pub async fn session_relay<B>(
    State(state): State<RelayState<B>>,
    mut req: Request,
    next: Next,
) -> Response
where
    B: AuthBackend + Clone + Send + Sync + 'static,
{
    let cookie_header = raw_cookie_header(req.headers()).unwrap_or("").to_string();

    let use_case = ResolveSessionUseCase::new(state.backend.clone());
    let outcome = use_case.execute(&cookie_header).await;

    let path = req.uri().path();
    let redirect = decide_route(path, outcome.user.is_some(), &state.config);

    // The redirect is a built response rather than an early return so the
    // Set-Cookie forwarding below still runs on redirects
    let mut response = match redirect {
        Some(location) => see_other(&location),
        None => {
            if let Some(user) = outcome.user {
                req.extensions_mut().insert(CurrentUser(user));
            }
            next.run(req).await
        }
    };

    for set_cookie in &outcome.set_cookies {
        match HeaderValue::from_str(set_cookie) {
            Ok(value) => {
                // append, not insert: refreshed cookies must coexist with
                // each other and with anything the handler set
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => {
                tracing::warn!("Dropping malformed Set-Cookie value from backend");
            }
        }
    }

    response
}

/// Empty-body 303 pointing at `location`
fn see_other(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!("Redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
