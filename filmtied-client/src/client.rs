//! FilmTied API client
//!
//! This module provides the main `FilmTiedClient` type. Every call runs the
//! same pipeline:
//!
//! 1. **Build**: serialize the JSON-RPC envelope with the API token
//! 2. **Cache lookup** (optional): answer from the cache if the exact body
//!    was seen before
//! 3. **Send**: POST the body to the API server
//! 4. **Cache store** (optional): keep the raw response body
//! 5. **Decode**: return `result`, or fail with the service's `error`
//!
//! # Cloning
//!
//! `FilmTiedClient` is cheaply cloneable using `Arc` internally. All clones
//! share the same transport, cache connection and id sequence.

use crate::{
    cache::{fingerprint, ResponseCache},
    config::ClientConfig,
    request::RequestIds,
    search::{SearchQuery, DEFAULT_IMAGE_SIZE},
    transport::Transport,
    ClientBuilder, ClientMetrics,
};
use filmtied_core::{codec, Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Client for the FilmTied metadata service
#[derive(Clone)]
pub struct FilmTiedClient {
    /// API token appended to every request
    pub(crate) token: Arc<str>,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    /// Response cache, when configured
    pub(crate) cache: Option<ResponseCache>,
    pub(crate) ids: Arc<RequestIds>,
    /// Metrics for observability
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl FilmTiedClient {
    /// Create a client with the default configuration (no cache)
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(token).build()
    }

    /// Start configuring a client
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether responses go through a cache
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Resolve a third-party URL (e.g. an IMDb page) to the service's own
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `url` is blank.
    #[tracing::instrument(skip(self), fields(method = "changeUrl"))]
    pub async fn resolve_by_external_url(&self, url: &str) -> Result<Value> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidArgument("url must not be empty".to_string()));
        }

        let mut params = Map::new();
        params.insert("url".into(), Value::from(url));
        self.call("changeUrl", Value::Object(params)).await
    }

    /// Fetch metadata for a service or external URL at the default image size
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `url` is blank.
    pub async fn get_by_url(&self, url: &str) -> Result<Value> {
        self.get_by_url_with_image_size(url, DEFAULT_IMAGE_SIZE).await
    }

    /// Fetch metadata for a URL; an `image_size` of zero is left to the
    /// service to choose
    ///
    /// The URL is sent as given.
    #[tracing::instrument(skip(self), fields(method = "get"))]
    pub async fn get_by_url_with_image_size(&self, url: &str, image_size: u32) -> Result<Value> {
        if url.trim().is_empty() {
            return Err(Error::InvalidArgument("url must not be empty".to_string()));
        }

        let mut params = Map::new();
        params.insert("url".into(), Value::from(url));
        if image_size > 0 {
            params.insert("imageSize".into(), Value::from(image_size));
        }
        self.call("get", Value::Object(params)).await
    }

    /// Search movies and TV series
    ///
    /// Takes a plain query string or a [`SearchQuery`] for paging and
    /// filtering.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the query is blank.
    #[tracing::instrument(skip(self, query), fields(method = "search"))]
    pub async fn search(&self, query: impl Into<SearchQuery>) -> Result<Value> {
        let query = query.into();
        if query.is_blank() {
            return Err(Error::InvalidArgument("query must not be empty".to_string()));
        }

        tracing::debug!(query = %query.query().trim(), "Searching");
        self.call("search", Value::Object(query.to_params())).await
    }

    /// Call any service method
    ///
    /// `params` must be a JSON object; the token is added to it.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` for an empty method or non-object params
    /// - `Error::Transport` if the service cannot be reached
    /// - `Error::Decoding` if the response is not usable JSON
    /// - `Error::Remote` if the service answers with an error
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let start = Instant::now();
        let result = self.dispatch(method, params).await;
        let duration = start.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                if let Some(ref m) = self.metrics {
                    m.record_request(method, "success", duration);
                }
                tracing::debug!(method = %method, duration, "Call succeeded");
            }
            Err(e) => {
                if let Some(ref m) = self.metrics {
                    m.record_request(method, "error", duration);
                    m.record_error(e.kind());
                }
                match e {
                    Error::Remote(_) => tracing::warn!(method = %method, error = %e, "Service returned an error"),
                    _ => tracing::error!(method = %method, error = %e, "Call failed"),
                }
            }
        }

        result
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
        let body = codec::build_request(method, params, &self.token, self.ids.next_id())?
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "cannot build a request for method {:?}: params must be an object",
                    method
                ))
            })?;

        let raw = self.fetch(method, body).await?;
        codec::decode(&raw)
    }

    async fn fetch(&self, method: &str, body: String) -> Result<Vec<u8>> {
        let Some(cache) = &self.cache else {
            return self.transport.send(body).await;
        };

        let key = fingerprint(&body);
        if let Some(hit) = cache.lookup(&key).await {
            if let Some(ref m) = self.metrics {
                m.record_cache_hit(method);
            }
            tracing::debug!(method = %method, key = %key, "Cache hit");
            return Ok(hit);
        }

        if let Some(ref m) = self.metrics {
            m.record_cache_miss(method);
        }

        let raw = self.transport.send(body).await?;
        cache.store(&key, &raw).await;
        Ok(raw)
    }
}
