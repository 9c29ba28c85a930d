//! Client configuration
//!
//! [`ClientConfig`] is fixed once the client is built. It deserializes from
//! the same keys the service documents for its clients (`apiServerAddress`,
//! `connectionTimeOut`, `timeOut`, `cache`, `cacheServerAddress`,
//! `cacheServerPort`, `cacheExpiration`), so it can be loaded from any serde
//! format. Missing keys take their defaults.
//!
//! ```rust
//! use filmtied_client::{CacheKind, ClientConfig};
//!
//! let config: ClientConfig = serde_json::from_str(r#"{
//!     "cache": "memcache",
//!     "cacheServerAddress": "127.0.0.1",
//!     "cacheServerPort": 11211
//! }"#).unwrap();
//!
//! assert_eq!(config.cache, CacheKind::Memcache);
//! assert_eq!(config.api_server_address, "http://api.filmtied.com");
//! assert_eq!(config.cache_expiration, 600);
//! ```

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default service endpoint
pub const DEFAULT_API_SERVER_ADDRESS: &str = "http://api.filmtied.com";

/// Default connect and total timeouts, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default cache entry lifetime, in seconds
pub const DEFAULT_CACHE_EXPIRATION_SECS: u64 = 600;

/// Product name sent in the `User-Agent` header
pub const USER_AGENT_PRODUCT: &str = "FilmTied API Rust Library";

/// Cache backend protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// No caching
    #[default]
    None,
    /// memcached server, legacy call shape (explicit flags word on `set`)
    Memcache,
    /// memcached server, plain call shape
    Memcached,
}

/// Immutable client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL
    pub api_server_address: String,

    /// Seconds allowed to establish the connection, `0` for the HTTP
    /// stack's default
    #[serde(rename = "connectionTimeOut", deserialize_with = "number_or_string")]
    pub connection_timeout: u64,

    /// Seconds allowed for the whole request/response cycle, `0` for no
    /// limit
    #[serde(rename = "timeOut", deserialize_with = "number_or_string")]
    pub timeout: u64,

    /// Cache backend protocol
    pub cache: CacheKind,

    /// Cache server host
    pub cache_server_address: Option<String>,

    /// Cache server port
    #[serde(deserialize_with = "optional_number_or_string")]
    pub cache_server_port: Option<u16>,

    /// Cache entry lifetime in seconds
    #[serde(deserialize_with = "number_or_string")]
    pub cache_expiration: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_server_address: DEFAULT_API_SERVER_ADDRESS.to_string(),
            connection_timeout: DEFAULT_TIMEOUT_SECS,
            timeout: DEFAULT_TIMEOUT_SECS,
            cache: CacheKind::None,
            cache_server_address: None,
            cache_server_port: None,
            cache_expiration: DEFAULT_CACHE_EXPIRATION_SECS,
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// A number, or a string holding one
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric<T> {
    Number(T),
    Text(String),
}

/// Accept `11211` as well as `"11211"`
fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Numeric::<T>::deserialize(deserializer)? {
        Numeric::Number(n) => Ok(n),
        Numeric::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

/// Like [`number_or_string`]; `null` and `""` are absent
fn optional_number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<Numeric<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numeric::Number(n)) => Ok(Some(n)),
        Some(Numeric::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Numeric::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

impl ClientConfig {
    /// Connect timeout; `0` leaves it to the HTTP stack
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.connection_timeout)
    }

    /// Total request timeout; `0` means no limit
    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.timeout)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiration)
    }

    /// `User-Agent` header value: product name plus library version
    pub fn user_agent(&self) -> String {
        format!("{} v.{}", USER_AGENT_PRODUCT, env!("CARGO_PKG_VERSION"))
    }

    /// The cache server to use, if caching is fully configured
    ///
    /// Caching needs a backend kind, an address and a port. Any missing
    /// piece disables it.
    pub fn cache_server(&self) -> Option<(CacheKind, &str, u16)> {
        if self.cache == CacheKind::None {
            return None;
        }
        match (self.cache_server_address.as_deref(), self.cache_server_port) {
            (Some(address), Some(port)) if !address.is_empty() => Some((self.cache, address, port)),
            _ => None,
        }
    }
}
