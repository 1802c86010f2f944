//! Failure type produced at the API client boundary.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A failed operation, split up front into transport and non-transport cases
/// so classification matches on a closed variant.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Failure {
    /// The HTTP layer failed: either no response arrived, or a non-2xx one did.
    #[error("{0}")]
    Transport(TransportFailure),
    /// Anything else (decode errors, bugs in calling code, join failures).
    #[error("{0}")]
    Other(OtherFailure),
}

/// Failure reported by the HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{method} {url}: {message}")]
pub struct TransportFailure {
    pub url: String,
    pub method: String,
    /// Low-level error code (e.g. `ETIMEDOUT`, `ECONNREFUSED`) when no response arrived.
    pub code: Option<String>,
    pub message: String,
    /// Present when the server answered with a non-2xx status.
    pub response: Option<TransportResponse>,
}

/// Response carried by a [`TransportFailure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Decoded body: JSON when it parsed, otherwise the raw text as a JSON string.
    pub data: Option<Value>,
}

/// Non-transport failure.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct OtherFailure {
    pub message: String,
    pub stack: Option<String>,
}

impl Failure {
    /// Transport failure where the connection never produced a response.
    pub fn no_response(
        method: impl Into<String>,
        url: impl Into<String>,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Failure::Transport(TransportFailure {
            url: url.into(),
            method: method.into(),
            code: code.map(str::to_string),
            message: message.into(),
            response: None,
        })
    }

    /// Transport failure carrying a non-2xx response.
    pub fn http_status(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Failure::Transport(TransportFailure {
            url: url.into(),
            method: method.into(),
            code: None,
            message: format!("Request failed with status code {}", status),
            response: Some(TransportResponse {
                status,
                status_text: status_text.into(),
                data,
            }),
        })
    }

    /// Non-transport failure with just a message.
    pub fn other(message: impl Into<String>) -> Self {
        Failure::Other(OtherFailure {
            message: message.into(),
            stack: None,
        })
    }

    /// Builds an `Other` failure from any error, keeping its cause chain as the stack.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        Failure::Other(OtherFailure {
            message: err.to_string(),
            stack: (!chain.is_empty()).then(|| chain.join("\n")),
        })
    }

    /// The response, if this is a transport failure that received one.
    pub fn response(&self) -> Option<&TransportResponse> {
        match self {
            Failure::Transport(t) => t.response.as_ref(),
            Failure::Other(_) => None,
        }
    }

    /// Internal diagnostic message (never shown to end users).
    pub fn message(&self) -> &str {
        match self {
            Failure::Transport(t) => &t.message,
            Failure::Other(o) => &o.message,
        }
    }
}
