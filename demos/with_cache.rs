//! Walk through every call with memcached caching enabled
//!
//! Expects a memcached server on 127.0.0.1:11211; without one the calls
//! still work, uncached. Run twice to see the second run served from the
//! cache:
//!
//! ```text
//! FILMTIED_TOKEN=... RUST_LOG=debug cargo run --example with_cache
//! ```

use filmtied::{CacheKind, ClientBuilder, FilmTiedClient, SearchQuery};
use serde_json::Value;

fn show(label: &str, result: filmtied::Result<Value>) {
    match result {
        Ok(value) => println!("{}:\n{}\n", label, serde_json::to_string_pretty(&value).unwrap_or_default()),
        Err(e) => println!("{} failed: {}\n", label, e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let token = std::env::var("FILMTIED_TOKEN").unwrap_or_else(|_| "demo-token".to_string());

    let client: FilmTiedClient = ClientBuilder::new(token)
        .with_cache(CacheKind::Memcache, "127.0.0.1", 11211)
        .build()?;

    show(
        "changeUrl",
        client.resolve_by_external_url("http://www.imdb.com/name/nm0000295/").await,
    );

    show(
        "get",
        client.get_by_url("http://www.filmtied.com/The-Godfather").await,
    );

    show(
        "get (image size 1)",
        client
            .get_by_url_with_image_size("http://www.filmtied.com/The-Godfather", 1)
            .await,
    );

    show(
        "get (external url)",
        client.get_by_url("http://www.imdb.com/title/tt0119008/").await,
    );

    show("search", client.search("Godfather").await);

    show(
        "search (tv-series, 3 per page)",
        client
            .search(SearchQuery::new("Godfather").page(1).limit(3).media_type("tv-series"))
            .await,
    );

    Ok(())
}
