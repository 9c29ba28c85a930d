//! Request building and response decoding
//!
//! # Encoding
//!
//! Requests are serialized with [`WireFormatter`], which escapes `/` as
//! `\/` and writes every non-ASCII character as a lowercase `\uXXXX`
//! UTF-16 escape. Other clients of the service encode the same way, and
//! cache keys are an MD5 of the exact request bytes, so a cache tier shared
//! with them only works if the bytes match.
//!
//! # Decoding
//!
//! Response bodies are parsed into a generic [`serde_json::Value`] and
//! classified by key presence (see [`RpcResponse`]). A body that parses to
//! an empty value (`null`, `{}`, `[]`, `""`, `"0"`, `0`, `false`) is
//! rejected with [`Error::Decoding`], the same as a syntax error.
//!
//! # Examples
//!
//! ```rust
//! use filmtied_core::{codec, Id};
//! use serde_json::json;
//!
//! let body = codec::build_request("changeUrl", json!({"url": "http://www.imdb.com/"}), "secret", Id::CACHED)
//!     .unwrap()
//!     .unwrap();
//! assert!(body.contains(r#""url":"http:\/\/www.imdb.com\/""#));
//!
//! let value = codec::decode(br#"{"result": {"title": "X"}}"#).unwrap();
//! assert_eq!(value, json!({"title": "X"}));
//! ```

use crate::error::{Error, Result};
use crate::types::{Id, RpcRequest, RpcResponse};
use serde::Serialize;
use serde_json::error::Category;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;

/// Name of the parameter carrying the authentication token
pub const TOKEN_PARAM: &str = "token";

/// Compact JSON formatter with escaped slashes and ASCII-only output
#[derive(Debug, Clone, Copy, Default)]
pub struct WireFormatter;

impl Formatter for WireFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch != '/' && ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            if ch == '/' {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize any value with [`WireFormatter`]
///
/// # Errors
///
/// Returns `Error::Encoding` with the serializer's diagnostic.
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, WireFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::Encoding(e.to_string()))?;
    String::from_utf8(out).map_err(|e| Error::Encoding(e.to_string()))
}

/// Serialize a request envelope
pub fn encode_request(request: &RpcRequest) -> Result<String> {
    encode(request)
}

/// Build the JSON body for a call
///
/// Injects `token` into `params` (after the caller's params), wraps them in
/// an envelope with the given id and serializes it.
///
/// Returns `Ok(None)` when `method` is empty or `params` is not a JSON
/// object; callers are expected to have validated their input already.
///
/// # Errors
///
/// Returns `Error::Encoding` if serialization fails.
pub fn build_request(method: &str, params: Value, token: &str, id: Id) -> Result<Option<String>> {
    if method.is_empty() {
        return Ok(None);
    }
    let Value::Object(mut params) = params else {
        return Ok(None);
    };

    params.insert(TOKEN_PARAM.to_string(), Value::String(token.to_string()));

    encode_request(&RpcRequest::new(method, params, id)).map(Some)
}

/// Message for a JSON parser failure category
pub fn diagnostic(category: Category) -> &'static str {
    match category {
        Category::Io => "I/O failure while reading input",
        Category::Syntax => "Syntax error",
        Category::Data => "Invalid or malformed JSON",
        Category::Eof => "Unexpected end of input",
    }
}

fn decoding_error(e: serde_json::Error) -> Error {
    Error::Decoding(format!("{} ({})", diagnostic(e.classify()), e))
}

/// Whether a parsed body counts as empty
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Parse a raw response body into an [`RpcResponse`]
///
/// # Errors
///
/// Returns `Error::Decoding` if the body is not JSON or is empty.
pub fn decode_response(raw: &[u8]) -> Result<RpcResponse> {
    let value: Value = serde_json::from_slice(raw).map_err(decoding_error)?;

    if is_empty_value(&value) {
        return Err(Error::Decoding(format!(
            "response body decoded to an empty value: {}",
            String::from_utf8_lossy(raw)
        )));
    }

    Ok(RpcResponse::from_value(value))
}

/// Decode a raw response body into the value returned to callers
///
/// - `result` present: returned verbatim
/// - `error` present: `Error::Remote` with the service's message
/// - neither: an empty string
pub fn decode(raw: &[u8]) -> Result<Value> {
    decode_response(raw)?.into_result()
}
