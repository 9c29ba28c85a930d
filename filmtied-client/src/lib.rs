//! Client for the FilmTied media metadata service
//!
//! This crate talks JSON-RPC 2.0 over HTTP to the FilmTied API, which
//! resolves movie and TV series pages to structured metadata.
//!
//! # Core Features
//!
//! - **URL resolution**: map an external page (IMDb and the like) to the
//!   service's canonical URL
//! - **Lookup**: fetch metadata for a URL at a chosen image size
//! - **Search**: paged search with an optional media type filter
//! - **Response caching**: memcached or custom stores, keyed on the exact
//!   request body
//! - **Observability**: OpenTelemetry integration for traces and metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use filmtied_client::{FilmTiedClient, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FilmTiedClient::new("my-token")?;
//!
//!     let movie = client.get_by_url("http://www.filmtied.com/The-Godfather").await?;
//!     println!("Movie: {}", movie);
//!
//!     let results = client
//!         .search(SearchQuery::new("Godfather").limit(3).media_type("tv-series"))
//!         .await?;
//!     println!("Results: {}", results);
//!
//!     Ok(())
//! }
//! ```
//!
//! # With Caching
//!
//! ```rust,no_run
//! use filmtied_client::{CacheKind, ClientBuilder};
//!
//! # fn example() -> filmtied_core::Result<()> {
//! let client = ClientBuilder::new("my-token")
//!     .with_cache(CacheKind::Memcached, "127.0.0.1", 11211)
//!     .cache_expiration(600)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
mod client;
mod client_builder;
mod config;
pub mod memcached;
mod metrics;
mod request;
mod search;
pub mod transport;

pub use cache::{CacheStore, MemoryStore, ResponseCache};
pub use client::FilmTiedClient;
pub use client_builder::ClientBuilder;
pub use config::{
    CacheKind, ClientConfig, DEFAULT_API_SERVER_ADDRESS, DEFAULT_CACHE_EXPIRATION_SECS,
    DEFAULT_TIMEOUT_SECS,
};
pub use memcached::{MemcacheStore, MemcachedConnection, MemcachedStore};
pub use metrics::ClientMetrics;
pub use request::{RequestIds, TimestampIds};
pub use search::{MediaType, SearchQuery, DEFAULT_IMAGE_SIZE};
pub use transport::{HttpTransport, Transport};
