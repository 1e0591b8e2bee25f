//! Session Relay Configuration

use platform::routes;

/// Relay configuration
///
/// Backend endpoints default to the shared route constants; page paths
/// default to the gateway's own layout.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend base URL, without trailing slash
    pub backend_base_url: String,
    /// Identity-check endpoint path on the backend
    pub identity_path: String,
    /// Refresh endpoint path on the backend
    pub refresh_path: String,
    /// Page shown to unauthenticated visitors
    pub login_page: String,
    /// Landing page for authenticated visitors
    pub landing_page: String,
    /// Path prefix that requires authentication
    pub protected_prefix: String,
    /// Entry pages authenticated visitors are redirected away from
    pub auth_entry_pages: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_string(),
            identity_path: routes::AUTH_ME.to_string(),
            refresh_path: routes::AUTH_TOKEN_REFRESH.to_string(),
            login_page: "/login".to_string(),
            landing_page: "/dashboard".to_string(),
            protected_prefix: "/dashboard".to_string(),
            auth_entry_pages: vec!["/login".to_string(), "/signup".to_string()],
        }
    }
}

impl SessionConfig {
    /// Config pointing at the given backend
    pub fn with_backend(backend_base_url: impl Into<String>) -> Self {
        let mut base = backend_base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            backend_base_url: base,
            ..Default::default()
        }
    }
}
