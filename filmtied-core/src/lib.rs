//! Core types and codec for the FilmTied client
//!
//! The FilmTied service resolves movie and TV series metadata over a small
//! JSON-RPC 2.0 dialect carried by HTTP POST. This crate holds everything
//! that does not depend on how bytes travel:
//!
//! - **Types**: the request envelope, request ids and decoded responses
//! - **Codec**: building request bodies and decoding response bodies
//! - **Error handling**: the error taxonomy shared by every call
//! - **Observability**: `tracing` subscriber and OpenTelemetry bootstrap
//!
//! The HTTP transport, the response cache and the public API live in
//! `filmtied-client`.
//!
//! # Example
//!
//! ```rust
//! use filmtied_core::{codec, Error, Id};
//! use serde_json::json;
//!
//! let body = codec::build_request("search", json!({"query": "Godfather"}), "token", Id::CACHED)
//!     .unwrap()
//!     .unwrap();
//! assert!(body.starts_with(r#"{"jsonrpc":"2.0","method":"search""#));
//!
//! let err = codec::decode(br#"{"error":{"message":"Invalid token"}}"#).unwrap_err();
//! assert!(matches!(err, Error::Remote(_)));
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, RemoteErrorData, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{Id, RpcRequest, RpcResponse, JSONRPC_VERSION};
