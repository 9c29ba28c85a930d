//! Client builder
//!
//! The `ClientBuilder` provides a fluent API for configuring the client
//! before it is created. It allows you to:
//! - Point the client at another endpoint and adjust its timeouts
//! - Enable response caching on a memcached server or a custom store
//! - Replace the HTTP transport
//! - Configure observability (OpenTelemetry)
//!
//! # Examples
//!
//! ```rust,no_run
//! use filmtied_client::{CacheKind, ClientBuilder};
//!
//! # fn example() -> filmtied_core::Result<()> {
//! // With a memcached cache
//! let client = ClientBuilder::new("my-token")
//!     .with_cache(CacheKind::Memcache, "127.0.0.1", 11211)
//!     .cache_expiration(300)
//!     .build()?;
//!
//! // With observability
//! let client2 = ClientBuilder::new("my-token")
//!     .with_default_observability()
//!     .service_name("my-app")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::{
    cache::{CacheStore, ResponseCache},
    config::{CacheKind, ClientConfig},
    memcached::{MemcacheStore, MemcachedStore},
    request::RequestIds,
    transport::{HttpTransport, Transport},
    ClientMetrics, FilmTiedClient,
};
use filmtied_core::{Error, Result};
use std::sync::Arc;

/// Builder for configuring and creating a [`FilmTiedClient`]
pub struct ClientBuilder {
    token: String,
    config: ClientConfig,
    cache_store: Option<Arc<dyn CacheStore>>,
    transport: Option<Arc<dyn Transport>>,
    observability_config: Option<filmtied_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder for the given API token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            config: ClientConfig::default(),
            cache_store: None,
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_server_address(mut self, address: impl Into<String>) -> Self {
        self.config.api_server_address = address.into();
        self
    }

    /// Seconds allowed to establish a connection
    ///
    /// `0` sets no connect timeout of its own and leaves it to the HTTP stack.
    pub fn connection_timeout(mut self, secs: u64) -> Self {
        self.config.connection_timeout = secs;
        self
    }

    /// Seconds allowed for a whole call
    ///
    /// `0` means no limit: a call waits as long as the server takes.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    /// Cache responses on a memcached server
    pub fn with_cache(mut self, kind: CacheKind, address: impl Into<String>, port: u16) -> Self {
        self.config.cache = kind;
        self.config.cache_server_address = Some(address.into());
        self.config.cache_server_port = Some(port);
        self
    }

    /// Cache entry lifetime in seconds
    pub fn cache_expiration(mut self, secs: u64) -> Self {
        self.config.cache_expiration = secs;
        self
    }

    /// Cache responses in a custom store, overriding the configured server
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    /// Send requests through a custom transport instead of HTTP
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: filmtied_core::ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(filmtied_core::ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    fn cache(&self) -> Option<ResponseCache> {
        let ttl = self.config.cache_ttl();

        if let Some(store) = &self.cache_store {
            return Some(ResponseCache::new(store.clone(), ttl));
        }

        let store: Arc<dyn CacheStore> = match self.config.cache_server() {
            Some((CacheKind::Memcache, host, port)) => Arc::new(MemcacheStore::new(host, port)),
            Some((CacheKind::Memcached, host, port)) => Arc::new(MemcachedStore::new(host, port)),
            Some((CacheKind::None, _, _)) | None => {
                if self.config.cache != CacheKind::None {
                    tracing::warn!(
                        cache = ?self.config.cache,
                        "Cache server address or port missing, caching disabled"
                    );
                }
                return None;
            }
        };

        tracing::debug!(cache = ?self.config.cache, ttl_secs = ttl.as_secs(), "Response caching enabled");
        Some(ResponseCache::new(store, ttl))
    }

    /// Build the client
    ///
    /// No network traffic happens here; the cache server is contacted on
    /// the first call. Must run inside a tokio runtime when observability
    /// is enabled.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the token is blank, the API server
    /// address is not a valid URL, or observability cannot be initialized.
    pub fn build(self) -> Result<FilmTiedClient> {
        if self.token.trim().is_empty() {
            return Err(Error::Configuration("API token must not be empty".to_string()));
        }

        // Initialize observability if configured
        let metrics = if let Some(mut config) = self.observability_config.clone() {
            if let Some(name) = &self.service_name {
                config.service_name = name.clone();
            }

            filmtied_core::init_observability(config.clone()).map_err(|e| {
                Error::Configuration(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(ClientMetrics::new(config.service_name.clone())))
        } else {
            None
        };

        let transport: Arc<dyn Transport> = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(HttpTransport::from_config(&self.config)?),
        };

        let cache = self.cache();
        let ids = RequestIds::for_cache(cache.is_some());

        tracing::debug!(
            endpoint = %self.config.api_server_address,
            caching = cache.is_some(),
            "Client created"
        );

        Ok(FilmTiedClient {
            token: Arc::from(self.token),
            config: Arc::new(self.config),
            transport,
            cache,
            ids: Arc::new(ids),
            metrics,
        })
    }
}
