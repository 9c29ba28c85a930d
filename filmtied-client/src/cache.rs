//! Response caching
//!
//! Caching is keyed on the exact request body: the key is `PnopApi_`
//! followed by the hex MD5 of the serialized envelope. Other clients of the
//! service use the same derivation, so a cache tier can be shared with them.
//! With caching enabled every request carries id `1`, which makes identical
//! calls serialize to identical bytes and therefore hit the same key.
//!
//! # Pieces
//!
//! - [`CacheStore`]: a key-value backend (`get` / `set` with a TTL)
//! - [`MemoryStore`]: in-process backend with per-entry expiry
//! - `MemcacheStore` / `MemcachedStore` (in [`crate::memcached`]): the two
//!   memcached call shapes
//! - [`ResponseCache`]: the adapter the client talks to
//!
//! # Best Effort
//!
//! A cache never fails a call. [`ResponseCache`] logs backend errors at
//! `warn` and carries on as if the entry was absent.

use async_trait::async_trait;
use filmtied_core::Result;
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Prefix of every cache key
pub const CACHE_KEY_PREFIX: &str = "PnopApi_";

/// Cache key for a serialized request body
///
/// # Examples
///
/// ```rust
/// use filmtied_client::cache::fingerprint;
///
/// assert_eq!(fingerprint(""), "PnopApi_d41d8cd98f00b204e9800998ecf8427e");
/// ```
pub fn fingerprint(request_json: &str) -> String {
    let digest = Md5::digest(request_json.as_bytes());
    format!("{}{:x}", CACHE_KEY_PREFIX, digest)
}

/// Key-value backend for cached response bodies
///
/// Implementations report their own failures as `Error::Cache`; the client
/// never sees them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value for `ttl` (zero means no expiry)
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
}

struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process cache backend
///
/// Expired entries are dropped when read.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet read
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(Instant::now()),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        self.entries.lock().await.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }
}

/// Cache adapter used by the client
///
/// Wraps a [`CacheStore`] with the entry lifetime and turns every backend
/// failure into a miss (on read) or a skipped write.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a cached body; empty values count as misses
    pub async fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key).await {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a response body; empty bodies are not cached
    pub async fn store(&self, key: &str, body: &[u8]) {
        if body.is_empty() {
            return;
        }
        if let Err(e) = self.store.set(key, body, self.ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}
