//! Cookie Handling Utilities
//!
//! Parsing, merging and serialization of `Cookie` / `Set-Cookie` headers.
//! The gateway relays credentials without interpreting them; cookie values
//! are opaque strings from the first parse to the last serialize.

use axum::http::{HeaderMap, header};

/// Ordered cookie name/value set
///
/// Replacing an existing name keeps its original position; new names are
/// appended. Merging is last-write-wins by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    pairs: Vec<(String, String)>,
}

impl CookieSet {
    /// Parse a raw `Cookie` header value
    ///
    /// Malformed fragments (no `=`) are skipped. Duplicate names collapse
    /// to the last occurrence.
    pub fn parse(cookie_header: &str) -> Self {
        let mut set = Self::default();
        for part in cookie_header.split(';') {
            if let Some((name, value)) = part.trim().split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    set.insert(name, value.trim());
                }
            }
        }
        set
    }

    /// Insert or replace a cookie
    pub fn insert(&mut self, name: &str, value: &str) {
        if let Some(pair) = self.pairs.iter_mut().find(|(existing, _)| existing == name) {
            pair.1 = value.to_string();
        } else {
            self.pairs.push((name.to_string(), value.to_string()));
        }
    }

    /// Look up a cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply `Set-Cookie` values on top of this set, new values winning
    pub fn apply_set_cookies<S: AsRef<str>>(&mut self, set_cookies: &[S]) {
        for set_cookie in set_cookies {
            if let Some((name, value)) = set_cookie_pair(set_cookie.as_ref()) {
                self.insert(name, value);
            }
        }
    }

    /// Serialize back to a `Cookie` header value (`a=1; b=2`)
    pub fn to_cookie_header(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Extract the `name=value` pair from a `Set-Cookie` value
///
/// Attributes after the first `;` (`Path`, `Max-Age`, `HttpOnly`, ...) are
/// ignored; only the pair matters for merging.
pub fn set_cookie_pair(set_cookie: &str) -> Option<(&str, &str)> {
    let pair = set_cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Merge `Set-Cookie` values into an existing `Cookie` header
///
/// Returns the updated header: existing names keep their position, names
/// present in `set_cookies` take the new value, new names are appended.
pub fn merge_cookie_header<S: AsRef<str>>(cookie_header: &str, set_cookies: &[S]) -> String {
    let mut set = CookieSet::parse(cookie_header);
    set.apply_set_cookies(set_cookies);
    set.to_cookie_header()
}

/// Raw `Cookie` header value from request headers
pub fn raw_cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE)?.to_str().ok()
}
