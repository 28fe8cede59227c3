//! Request errors and their user-facing projection.

use serde_json::Value;
use thiserror::Error;

/// Fallback text when a failure carries nothing more specific.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Failure of one HTTP call.
///
/// The split that matters is whether a response reached the client:
/// [`RequestError::Connectivity`] carries none and lets the client try the
/// next candidate address, every other variant stops the fallback.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// No response at all: refused connection, DNS failure or timeout.
    #[error("Network error while contacting {address}: {message}")]
    Connectivity { address: String, message: String },

    /// The server answered with a non-success status.
    #[error("Server responded with status {status}")]
    Server {
        status: u16,
        /// Parsed JSON body, when the body was JSON.
        body: Option<Value>,
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("Invalid response from {address}: {message}")]
    Decode { address: String, message: String },

    /// The request could not be built (bad URL, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    pub fn connectivity(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Builds a server error from a status and the raw response body.
    pub fn server(status: u16, body_text: &str) -> Self {
        Self::Server {
            status,
            body: serde_json::from_str(body_text).ok(),
            message: format!("Request failed with status code {}", status),
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Projects the failure to a single human-readable string.
    ///
    /// Priority: unreachable server (naming the address), `detail` string,
    /// `detail` list joined with `"; "`, `message` field, raw failure text,
    /// then [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Connectivity { address, .. } => format!(
                "Cannot reach the API server at {}. Verify that the backend is running and that its CORS configuration allows this client.",
                address
            ),
            Self::Server { body, message, .. } => body
                .as_ref()
                .and_then(project_body)
                .unwrap_or_else(|| non_empty_or_generic(message)),
            Self::Decode { message, .. } => non_empty_or_generic(message),
            Self::InvalidRequest(message) => non_empty_or_generic(message),
        }
    }
}

/// Extracts a message from a structured error body.
fn project_body(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => {
            return Some(detail.clone());
        }
        Some(Value::Array(entries)) if !entries.is_empty() => {
            let joined = entries
                .iter()
                .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => entry.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Some(joined);
        }
        _ => {}
    }

    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

fn non_empty_or_generic(message: &str) -> String {
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message.to_string()
    }
}
