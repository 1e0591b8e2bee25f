//! Backend Wire Contract
//!
//! DTOs and error body shapes spoken by the token-issuing backend. Both
//! the server relay and the API client deserialize these; neither side
//! invents its own variants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel `error_code` marking a missing or expired access credential.
/// Only a 401 carrying this code may trigger the refresh protocol.
pub const INVALID_TOKEN_CODE: &str = "invalid_token";

const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Identity record returned by the identity-check endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Message envelope returned by login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Signup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Structured error detail carried by 4xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Error envelope: `{ "detail": { "error_code": ..., "msg": ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: ApiErrorDetail,
}

/// Whether a 401 body identifies an invalid or expired credential
///
/// Anything that does not parse to the expected shape is a "no": an
/// unrelated 401 (or a malformed body) must never trigger a refresh.
pub fn is_invalid_token_body(body: &[u8]) -> bool {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(error) => error.detail.error_code.as_deref() == Some(INVALID_TOKEN_CODE),
        Err(_) => false,
    }
}

/// User-facing message from an error body, with a generic fallback
pub fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|error| error.detail.msg)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

/// One entry of a 422 validation error list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

/// A `loc` path segment: a field name or a positional index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Field(String),
    Index(i64),
}

/// Validation envelope: `{ "detail": [ { "loc": [...], "msg": ... } ] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub detail: Vec<ValidationErrorDetail>,
}

/// Per-field error messages keyed by field name
pub type FieldErrors = HashMap<String, String>;

/// Map a 422 body to per-field errors
///
/// The field name is the last `loc` segment; entries whose last segment is
/// an index are skipped, and an unparseable body yields no errors.
pub fn parse_validation_errors(body: &[u8]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Ok(parsed) = serde_json::from_slice::<ValidationErrorBody>(body) {
        for detail in parsed.detail {
            if let Some(LocSegment::Field(name)) = detail.loc.last() {
                errors.insert(name.clone(), detail.msg);
            }
        }
    }
    errors
}
