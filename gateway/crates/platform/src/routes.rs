//! Backend Route Paths
//!
//! Canonical paths on the token-issuing backend, shared by the server
//! relay and the API client so the two sides never drift apart.

/// Identity-check endpoint (`GET`, cookie-authenticated)
pub const AUTH_ME: &str = "/api/auth/me";

/// Refresh endpoint (`POST`, cookie-authenticated, rotates both tokens)
pub const AUTH_TOKEN_REFRESH: &str = "/api/auth/token/refresh";

/// Login endpoint (`POST`, unauthenticated entry)
pub const AUTH_LOGIN: &str = "/api/auth/login";

/// Signup endpoint (`POST`, unauthenticated entry)
pub const AUTH_SIGNUP: &str = "/api/auth/signup";

/// Logout endpoint (`POST`, revokes the current session)
pub const AUTH_LOGOUT: &str = "/api/auth/logout";

/// Logout-everywhere endpoint (`POST`, revokes every session)
pub const AUTH_LOGOUT_ALL: &str = "/api/auth/logout/all";

/// Entry endpoints that never participate in the refresh protocol
pub const UNPROTECTED: &[&str] = &[AUTH_LOGIN, AUTH_SIGNUP];
