//! Refresh-Aware API Client
//!
//! Wraps every outgoing call: a replay duplicate is captured before the
//! body is consumed, a credential-expired 401 triggers one shared refresh,
//! and the duplicate is replayed at most once. A 401 that does not carry
//! the invalid-credential error code passes through untouched.

use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::form::{self, FormOutcome};
use crate::refresh::RefreshGate;
use platform::contract::{
    self, AuthResponse, LoginRequest, SignupRequest, User,
};
use platform::routes;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Navigation side effect fired when the session cannot be recovered.
/// Page routing lives outside this crate; the hook is injected.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// No-op redirect for contexts without navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRedirect;

impl LoginRedirect for NoRedirect {
    fn redirect_to_login(&self) {}
}

/// API client with transparent session refresh
///
/// Cloning is cheap and clones share the cookie jar and the refresh gate,
/// so concurrent callers coordinate through the same single-flight state.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    gate: RefreshGate,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    /// Client with a cookie jar; credentials ride on every call
    pub fn new(base_url: impl Into<String>, redirect: Arc<dyn LoginRedirect>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            gate: RefreshGate::new(),
            redirect,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builder for an arbitrary API request, to be passed to [`execute`]
    ///
    /// [`execute`]: ApiClient::execute
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send `request`, transparently refreshing an expired credential
    ///
    /// A 401 without the invalid-credential error code, a 401 from the
    /// refresh endpoint itself, and a request whose body could not be
    /// duplicated are all handed back untouched.
    pub async fn execute(&self, request: Request) -> ApiResult<Response> {
        // The body is a single-use stream, so the replay duplicate has to
        // be taken before the network layer consumes it. Duplication can
        // fail (streaming bodies); that only disables retry for this
        // request. Entry endpoints never participate in the protocol.
        let snapshot = if is_unprotected(request.url().path()) {
            None
        } else {
            request.try_clone()
        };

        let response = self.http.execute(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // A 401 from the refresh endpoint must not trigger another refresh
        if response.url().path() == routes::AUTH_TOKEN_REFRESH {
            return Ok(response);
        }

        // Reading the body consumes it; record enough to hand the caller
        // an equivalent 401 afterwards
        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to read 401 response body");
                Vec::new()
            }
        };

        if !contract::is_invalid_token_body(&body) {
            // Unrelated 401 (e.g. wrong password, revoked permission):
            // no refresh, no retry
            return Ok(rebuild_response(status, headers, body));
        }

        let Some(replay) = snapshot else {
            return Ok(rebuild_response(status, headers, body));
        };

        if self.refresh_session().await {
            match self.http.execute(replay).await {
                Ok(retried) => Ok(retried),
                Err(error) => {
                    tracing::warn!(error = %error, "Replay after refresh failed");
                    Ok(rebuild_response(status, headers, body))
                }
            }
        } else {
            self.redirect.redirect_to_login();
            Ok(rebuild_response(status, headers, body))
        }
    }

    /// Single-flight refresh; `true` when new credentials were issued
    async fn refresh_session(&self) -> bool {
        let http = self.http.clone();
        let url = self.url(routes::AUTH_TOKEN_REFRESH);

        self.gate
            .run(async move {
                match http.post(url).send().await {
                    Ok(response) => response.status() == StatusCode::OK,
                    Err(error) => {
                        tracing::warn!(error = %error, "Session refresh failed");
                        false
                    }
                }
            })
            .await
    }

    /// `GET` the identity-check endpoint; `None` when no session resolves
    pub async fn current_user(&self) -> ApiResult<Option<User>> {
        let request = self.http.get(self.url(routes::AUTH_ME)).build()?;
        let response = self.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            Ok(Some(response.json().await?))
        } else if status == StatusCode::UNAUTHORIZED {
            Ok(None)
        } else {
            Err(ApiError::UnexpectedStatus(status))
        }
    }

    /// `POST` the login endpoint
    pub async fn login(&self, credentials: &LoginRequest) -> FormOutcome<AuthResponse> {
        self.submit_form(routes::AUTH_LOGIN, credentials, &[StatusCode::OK])
            .await
    }

    /// `POST` the signup endpoint
    pub async fn signup(&self, details: &SignupRequest) -> FormOutcome<User> {
        self.submit_form(
            routes::AUTH_SIGNUP,
            details,
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// `POST` the logout endpoint, revoking the current session
    pub async fn logout(&self) -> ApiResult<()> {
        self.post_expecting_success(routes::AUTH_LOGOUT).await
    }

    /// `POST` the logout-everywhere endpoint, revoking every session
    pub async fn logout_all(&self) -> ApiResult<()> {
        self.post_expecting_success(routes::AUTH_LOGOUT_ALL).await
    }

    async fn submit_form<T, P>(
        &self,
        path: &str,
        payload: &P,
        accepted: &[StatusCode],
    ) -> FormOutcome<T>
    where
        T: serde::de::DeserializeOwned,
        P: serde::Serialize,
    {
        let request = match self.http.post(self.url(path)).json(payload).build() {
            Ok(request) => request,
            Err(_) => return FormOutcome::network_error(),
        };
        form::submit(self.execute(request).await, accepted).await
    }

    async fn post_expecting_success(&self, path: &str) -> ApiResult<()> {
        let request = self.http.post(self.url(path)).build()?;
        let response = self.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus(status))
        }
    }
}

fn is_unprotected(path: &str) -> bool {
    routes::UNPROTECTED.iter().any(|route| path.starts_with(route))
}

/// Equivalent 401 from recorded parts, body already buffered
fn rebuild_response(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Response {
    let mut rebuilt = http::Response::new(body);
    *rebuilt.status_mut() = status;
    *rebuilt.headers_mut() = headers;
    Response::from(rebuilt)
}
