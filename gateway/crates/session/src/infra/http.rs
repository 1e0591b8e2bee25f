//! HTTP Auth Backend
//!
//! `reqwest`-based implementation of [`AuthBackend`]. Forwards the caller's
//! raw `Cookie` header on every call; no cookie jar, no credential storage.

use axum::http::{StatusCode, header};
use std::time::Duration;

use crate::application::config::SessionConfig;
use crate::domain::backend::{AuthBackend, IdentityReply, RefreshReply};
use crate::error::{SessionError, SessionResult};
use platform::contract::User;

/// Refresh and identity calls share the transport-level timeout of any
/// other outbound call; a timeout is an ordinary transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Auth backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    http: reqwest::Client,
    identity_url: String,
    refresh_url: String,
}

impl HttpAuthBackend {
    pub fn new(config: &SessionConfig) -> SessionResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            identity_url: format!("{}{}", config.backend_base_url, config.identity_path),
            refresh_url: format!("{}{}", config.backend_base_url, config.refresh_path),
        })
    }
}

impl AuthBackend for HttpAuthBackend {
    async fn current_user(&self, cookie_header: &str) -> SessionResult<IdentityReply> {
        let response = self
            .http
            .get(&self.identity_url)
            .header(header::COOKIE, cookie_header)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let user: User = response
                .json()
                .await
                .map_err(|e| SessionError::Malformed(e.to_string()))?;
            Ok(IdentityReply::Authenticated(user))
        } else if status == StatusCode::UNAUTHORIZED {
            Ok(IdentityReply::Unauthorized)
        } else {
            Ok(IdentityReply::Failed(status))
        }
    }

    async fn refresh_session(&self, cookie_header: &str) -> SessionResult<RefreshReply> {
        let response = self
            .http
            .post(&self.refresh_url)
            .header(header::COOKIE, cookie_header)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(RefreshReply::Denied(status));
        }

        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        Ok(RefreshReply::Renewed { set_cookies })
    }
}
