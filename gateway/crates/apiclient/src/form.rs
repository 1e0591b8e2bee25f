//! Form Submission Outcomes
//!
//! Maps responses from form-style endpoints (login, signup) into something
//! a page can render directly: parsed data, per-field validation errors,
//! or a single form-level message. Malformed bodies never panic.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiResult;
use platform::contract::{self, FieldErrors};

const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Outcome of a form-style API call
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<T> {
    /// Accepted; parsed response body
    Accepted(T),
    /// 422 with per-field validation messages
    Invalid(FieldErrors),
    /// Any other failure, with a user-facing message
    Rejected(String),
}

impl<T> FormOutcome<T> {
    pub(crate) fn network_error() -> Self {
        FormOutcome::Rejected(NETWORK_ERROR_MESSAGE.to_string())
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FormOutcome::Accepted(_))
    }
}

/// Classify a form submission result
///
/// `accepted` statuses parse the body as `T`; 422 maps to field errors;
/// everything else surfaces the error body's message.
pub async fn submit<T>(result: ApiResult<Response>, accepted: &[StatusCode]) -> FormOutcome<T>
where
    T: DeserializeOwned,
{
    let response = match result {
        Ok(response) => response,
        Err(_) => return FormOutcome::network_error(),
    };

    let status = response.status();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(_) => return FormOutcome::network_error(),
    };

    if accepted.contains(&status) {
        return match serde_json::from_slice(&body) {
            Ok(data) => FormOutcome::Accepted(data),
            Err(_) => FormOutcome::Rejected(UNEXPECTED_ERROR_MESSAGE.to_string()),
        };
    }

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        let field_errors = contract::parse_validation_errors(&body);
        if !field_errors.is_empty() {
            return FormOutcome::Invalid(field_errors);
        }
    }

    FormOutcome::Rejected(contract::error_message(&body))
}
