//! JSON-RPC envelope types used on the wire
//!
//! The service speaks a JSON-RPC 2.0 dialect over HTTP POST:
//!
//! - **Request**: `{"jsonrpc":"2.0","method":..,"params":{..},"id":..}`.
//!   Params are always an object and always carry the caller's `token`.
//! - **Response**: an object with a `result` member or an `error` member.
//!   A body with neither is accepted and decodes to an empty string.
//!
//! # Request IDs
//!
//! The id is not used to correlate anything (there is one request per HTTP
//! exchange). With caching enabled it is pinned to `1` so that identical
//! calls serialize to identical bytes; otherwise it is a timestamp.

use crate::error::{Error, RemoteErrorData, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Protocol version tag written into every request
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request ID
///
/// Always numeric on this service: the pinned cache id or a microsecond
/// timestamp. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(pub i64);

impl Id {
    /// The id used for every request when a cache is configured
    pub const CACHED: Id = Id(1);

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id(n)
    }
}

/// JSON-RPC request envelope
///
/// Field order is the serialization order: `jsonrpc`, `method`, `params`,
/// `id`. Params keep insertion order.
///
/// # Examples
///
/// ```rust
/// use filmtied_core::{Id, RpcRequest};
/// use serde_json::{json, Map};
///
/// let mut params = Map::new();
/// params.insert("url".into(), json!("http://www.filmtied.com/The-Godfather"));
/// let request = RpcRequest::new("get", params, Id::CACHED);
/// assert_eq!(request.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Remote method name
    pub method: String,
    /// Named parameters
    pub params: Map<String, Value>,
    /// Request identifier
    pub id: Id,
}

impl RpcRequest {
    /// Create a request envelope
    pub fn new(method: impl Into<String>, params: Map<String, Value>, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A decoded response body
///
/// Built from the generic JSON structure by key presence, so a literal
/// `"result": null` is still a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    /// The body had a `result` member (returned verbatim)
    Result(Value),
    /// The body had an `error` member and no `result`
    Error(RemoteErrorData),
    /// Neither member was present
    Empty,
}

impl RpcResponse {
    /// Classify a parsed body
    ///
    /// `result` wins over `error` when both are present. Non-object bodies
    /// have neither member and classify as [`RpcResponse::Empty`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                if let Some(result) = map.remove("result") {
                    RpcResponse::Result(result)
                } else if let Some(error) = map.get("error") {
                    RpcResponse::Error(RemoteErrorData::from_value(error))
                } else {
                    RpcResponse::Empty
                }
            }
            _ => RpcResponse::Empty,
        }
    }

    /// Convert into the value handed back to callers
    ///
    /// An empty response yields an empty string rather than an error.
    pub fn into_result(self) -> Result<Value> {
        match self {
            RpcResponse::Result(value) => Ok(value),
            RpcResponse::Error(data) => Err(Error::Remote(data)),
            RpcResponse::Empty => Ok(Value::String(String::new())),
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, RpcResponse::Result(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RpcResponse::Error(_))
    }
}
