//! Classify failures into error kinds with user-facing copy.

use crate::retry::error::{Failure, TransportFailure};
use crate::retry::policy::ErrorKind;
use serde::Serialize;
use serde_json::Value;

const TIMEOUT_MESSAGE: &str = "The request took too long. Please try again.";
const NETWORK_MESSAGE: &str = "Unable to connect. Please check your internet connection.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
const VALIDATION_MESSAGE: &str =
    "The submitted data is invalid. Please check your input and try again.";
const SERVER_MESSAGE: &str = "Something went wrong on our end. Please try again later.";
const UNKNOWN_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error codes that mean the connection was cut short by a timeout or abort.
const TIMEOUT_CODES: [&str; 2] = ["ECONNABORTED", "ETIMEDOUT"];

/// Result of classifying a failure.
///
/// `user_message` is the only field meant for end users; `message` and
/// `original_error` are for logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub user_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub retryable: bool,
    pub original_error: Failure,
}

/// Anything the retry driver can classify.
pub trait Classify {
    fn classify(&self) -> ClassifiedError;
}

impl Classify for Failure {
    fn classify(&self) -> ClassifiedError {
        classify(self)
    }
}

/// Classifies the first [`Failure`] in the cause chain; anything else is `Unknown`.
impl Classify for anyhow::Error {
    fn classify(&self) -> ClassifiedError {
        match self.chain().find_map(|e| e.downcast_ref::<Failure>()) {
            Some(failure) => classify(failure),
            None => {
                let err: &(dyn std::error::Error + 'static) = self.as_ref();
                classify(&Failure::from_error(err))
            }
        }
    }
}

/// Classify a failure. Pure; never fails.
pub fn classify(failure: &Failure) -> ClassifiedError {
    let (kind, user_message, status_code) = match failure {
        Failure::Transport(t) => classify_transport(t),
        Failure::Other(_) => (ErrorKind::Unknown, UNKNOWN_MESSAGE.to_string(), None),
    };
    ClassifiedError {
        kind,
        message: failure.message().to_string(),
        user_message,
        status_code,
        retryable: kind.is_retryable_by_default(),
        original_error: failure.clone(),
    }
}

fn classify_transport(t: &TransportFailure) -> (ErrorKind, String, Option<u16>) {
    let Some(response) = &t.response else {
        if is_timeout(t) {
            return (ErrorKind::Timeout, TIMEOUT_MESSAGE.to_string(), None);
        }
        return (ErrorKind::Network, NETWORK_MESSAGE.to_string(), None);
    };

    let status = response.status;
    let (kind, user_message) = match status {
        401 => (ErrorKind::Auth, SESSION_EXPIRED_MESSAGE.to_string()),
        403 => (ErrorKind::Auth, FORBIDDEN_MESSAGE.to_string()),
        404 => (ErrorKind::NotFound, NOT_FOUND_MESSAGE.to_string()),
        400 | 422 => (
            ErrorKind::Validation,
            response
                .data
                .as_ref()
                .and_then(validation_detail)
                .unwrap_or_else(|| VALIDATION_MESSAGE.to_string()),
        ),
        500..=u16::MAX => (ErrorKind::Server, SERVER_MESSAGE.to_string()),
        _ => return (ErrorKind::Unknown, UNKNOWN_MESSAGE.to_string(), None),
    };
    (kind, user_message, Some(status))
}

fn is_timeout(t: &TransportFailure) -> bool {
    if let Some(code) = &t.code {
        if TIMEOUT_CODES.iter().any(|c| code.eq_ignore_ascii_case(c)) {
            return true;
        }
    }
    let msg = t.message.to_ascii_lowercase();
    msg.contains("timeout") || msg.contains("timed out") || msg.contains("aborted")
}

/// Pulls a human-readable message out of the `detail` field of an error body.
///
/// Accepts a plain string, or a list of `{ "msg": ... }` objects (joined with "; ").
fn validation_detail(data: &Value) -> Option<String> {
    match data.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|m| !m.trim().is_empty())
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}
