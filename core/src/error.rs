//! Error types for the Linode API client.
//!
//! # Design
//! One enum covers every failure a call can hit, from construction through
//! decoding. `Remote` gets a dedicated variant because callers routinely
//! distinguish "the API refused the call" from "the call never completed".
//! Nothing here is retried or logged away; every error reaches the caller.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `Client`, `RequestDispatcher` and the operation groups.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is unusable (missing API key, bad URL).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A call was made with an argument the API cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP round-trip failed before a body was received.
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The response body is not a JSON envelope.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The envelope carried a non-empty `ERRORARRAY`.
    #[error("{action} failed: {}", summarize(.errors))]
    Remote {
        action: String,
        errors: Vec<RemoteError>,
    },

    /// `DATA` could not be decoded into the requested type.
    #[error("cannot decode response data: {0}")]
    Decode(String),
}

/// One entry of a response's `ERRORARRAY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub code: Option<i64>,
    pub message: String,
}

impl RemoteError {
    /// Build a descriptor from a raw `ERRORARRAY` element.
    ///
    /// Objects contribute `ERRORCODE` and `ERRORMESSAGE`; a bare string is
    /// taken as the message; anything else is kept as its JSON text.
    pub fn from_json(raw: &JsonValue) -> Self {
        match raw {
            JsonValue::String(message) => Self {
                code: None,
                message: message.clone(),
            },
            JsonValue::Object(fields) => Self {
                code: fields.get("ERRORCODE").and_then(JsonValue::as_i64),
                message: fields
                    .get("ERRORMESSAGE")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| raw.to_string()),
            },
            other => Self {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn summarize(errors: &[RemoteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
