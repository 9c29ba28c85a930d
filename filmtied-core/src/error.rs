//! Error types for the FilmTied client
//!
//! Every failure a call can produce is one variant of [`Error`]. The
//! variants follow the stages of a call:
//!
//! - **Configuration**: the client could not be constructed
//! - **InvalidArgument**: a required argument was empty
//! - **Encoding**: the outgoing envelope could not be serialized
//! - **Transport**: the HTTP round trip failed (DNS, connect, TLS, timeout)
//! - **Decoding**: the response body was not usable JSON
//! - **Remote**: the service answered with an `error` object
//!
//! `Cache` is produced by cache backends only. The client's cache adapter
//! turns it into a miss, so it never reaches the caller of a public
//! operation.
//!
//! # Examples
//!
//! ```rust
//! use filmtied_core::{Error, RemoteErrorData};
//!
//! let error = Error::Remote(RemoteErrorData::new("Item not found"));
//! assert_eq!(error.to_string(), "Item not found");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for FilmTied operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for FilmTied operations
///
/// All errors are terminal for the call in progress and leave the client
/// usable for the next one.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required capability could not be initialized at construction time
    /// (HTTP stack, invalid endpoint URL).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A caller-supplied required parameter was missing or blank.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request envelope could not be serialized.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Network-level failure while dispatching the request. Never retried.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON or decoded to an empty value.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The service returned a structured error object.
    ///
    /// Displays as the service-provided message only.
    #[error("{}", .0.message)]
    Remote(RemoteErrorData),

    /// A cache backend failed. Swallowed by the cache adapter.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Short label used as the `error_type` metric attribute
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Encoding(_) => "encoding",
            Error::Transport(_) => "transport",
            Error::Decoding(_) => "decoding",
            Error::Remote(_) => "remote",
            Error::Cache(_) => "cache",
        }
    }
}

/// The `error` member of a service response
///
/// Only `message` is relied upon. The service does not document its codes,
/// so `code` is kept as an arbitrary JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteErrorData {
    /// Human-readable description supplied by the service
    #[serde(default)]
    pub message: String,

    /// Optional error code, any JSON type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,

    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RemoteErrorData {
    /// Create error data carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            data: None,
        }
    }

    /// Extract error data from an arbitrary `error` member
    ///
    /// Objects are read field by field; a bare string is taken as the
    /// message; anything else is rendered as JSON text.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self {
                message: match map.get("message") {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                code: map.get("code").cloned(),
                data: map.get("data").cloned(),
            },
            serde_json::Value::String(s) => Self::new(s.clone()),
            other => Self::new(other.to_string()),
        }
    }
}

impl std::fmt::Display for RemoteErrorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_error_displays_service_message() {
        let err = Error::Remote(RemoteErrorData::new("nope"));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_remote_error_from_object() {
        let data = RemoteErrorData::from_value(&json!({
            "message": "Invalid token",
            "code": 403,
            "data": {"hint": "check your key"}
        }));
        assert_eq!(data.message, "Invalid token");
        assert_eq!(data.code, Some(json!(403)));
        assert_eq!(data.data, Some(json!({"hint": "check your key"})));
        assert_eq!(data.to_string(), "[403] Invalid token");
    }

    #[test]
    fn test_remote_error_from_object_without_message() {
        let data = RemoteErrorData::from_value(&json!({"code": "E1"}));
        assert_eq!(data.message, "");
        assert_eq!(data.code, Some(json!("E1")));
    }

    #[test]
    fn test_remote_error_from_string() {
        let data = RemoteErrorData::from_value(&json!("plain failure"));
        assert_eq!(data.message, "plain failure");
        assert!(data.code.is_none());
    }

    #[test]
    fn test_remote_error_deserialization() {
        let data: RemoteErrorData =
            serde_json::from_str(r#"{"message":"Missing url","code":-32602}"#).unwrap();
        assert_eq!(data.message, "Missing url");
        assert_eq!(data.code, Some(json!(-32602)));
    }

    #[test]
    fn test_error_display_formatting() {
        assert_eq!(
            Error::InvalidArgument("Missing required param: url".into()).to_string(),
            "Invalid argument: Missing required param: url"
        );
        assert_eq!(
            Error::Transport("connection refused".into()).to_string(),
            "Transport error: connection refused"
        );
        assert_eq!(
            Error::Decoding("Syntax error".into()).to_string(),
            "Decoding error: Syntax error"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Configuration(String::new()).kind(), "configuration");
        assert_eq!(Error::Encoding(String::new()).kind(), "encoding");
        assert_eq!(Error::Remote(RemoteErrorData::new("x")).kind(), "remote");
        assert_eq!(Error::Cache(String::new()).kind(), "cache");
    }
}
