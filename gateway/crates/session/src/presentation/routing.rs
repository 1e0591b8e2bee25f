//! Route Decision
//!
//! Where an inbound request should go given the resolved identity.

use crate::application::config::SessionConfig;

/// Decide whether `path` must be redirected
///
/// Fixed priority: the protected area without an identity goes to login,
/// auth entry pages with an identity go to the landing page, the root
/// splits on identity. `None` means continue normal handling.
pub fn decide_route(path: &str, authenticated: bool, config: &SessionConfig) -> Option<String> {
    if path.starts_with(&config.protected_prefix) && !authenticated {
        return Some(config.login_page.clone());
    }

    if authenticated && config.auth_entry_pages.iter().any(|page| page == path) {
        return Some(config.landing_page.clone());
    }

    if path == "/" {
        return Some(if authenticated {
            config.landing_page.clone()
        } else {
            config.login_page.clone()
        });
    }

    None
}
