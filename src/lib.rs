//! FilmTied - client for the FilmTied media metadata service
//!
//! This is the main convenience crate that re-exports the FilmTied
//! sub-crates. Use it if you want a single dependency.
//!
//! # Architecture
//!
//! - **filmtied-core**: request envelope, wire codec, error type, observability
//! - **filmtied-client**: HTTP client, response cache, memcached backends
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use filmtied::FilmTiedClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FilmTiedClient::new("my-token")?;
//!
//!     let url = client.resolve_by_external_url("http://www.imdb.com/name/nm0000295/").await?;
//!     println!("Resolved: {}", url);
//!
//!     let results = client.search("Godfather").await?;
//!     println!("Results: {}", results);
//!
//!     Ok(())
//! }
//! ```

// Re-export the sub-crates under `filmtied::`
pub use filmtied_client as client;
pub use filmtied_core as core;

// Convenience re-exports of the most commonly used types
pub use filmtied_client::{CacheKind, ClientBuilder, FilmTiedClient, SearchQuery};
pub use filmtied_core::{Error, Result};
