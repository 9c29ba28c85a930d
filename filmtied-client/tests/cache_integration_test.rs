//! Response caching integration tests
//!
//! Runs the client against a mock JSON-RPC server and a mock memcached
//! server and checks which calls reach the service.

mod common;

use common::{mock_error_response, mock_response, MockHttpServer, MockMemcachedServer};
use filmtied_client::cache::fingerprint;
use filmtied_client::{CacheKind, ClientBuilder, FilmTiedClient};
use filmtied_core::Error;
use serde_json::json;

fn cached_client(http: &MockHttpServer, memcached: &MockMemcachedServer, kind: CacheKind) -> FilmTiedClient {
    ClientBuilder::new("test-token")
        .api_server_address(http.url())
        .with_cache(kind, memcached.host(), memcached.port())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_memcache_serves_repeat_calls() {
    let body = mock_response(1, json!({"title": "The Game"}));
    let http = MockHttpServer::new(body.clone()).await;
    let memcached = MockMemcachedServer::new().await;
    let client = cached_client(&http, &memcached, CacheKind::Memcache);

    let first = client.get_by_url("http://www.imdb.com/title/tt0119008/").await.unwrap();
    let second = client.get_by_url("http://www.imdb.com/title/tt0119008/").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(http.hits(), 1);

    let request_body = &http.requests()[0].body;
    assert!(request_body.ends_with(r#","id":1}"#));

    let key = fingerprint(request_body);
    assert!(key.starts_with("PnopApi_"));
    let stored = memcached.get(&key).unwrap();
    assert_eq!(stored.data, body.as_bytes());
    assert_eq!(stored.flags, 0);
    assert_eq!(stored.exptime, 600);

    assert_eq!(
        memcached.commands(),
        [
            format!("get {}", key),
            format!("set {} 0 600 {}", key, body.len()),
            format!("get {}", key),
        ]
    );
}

#[tokio::test]
async fn test_memcached_kind_with_custom_expiration() {
    let http = MockHttpServer::new(mock_response(1, json!([1, 2, 3]))).await;
    let memcached = MockMemcachedServer::new().await;
    let client = ClientBuilder::new("test-token")
        .api_server_address(http.url())
        .with_cache(CacheKind::Memcached, memcached.host(), memcached.port())
        .cache_expiration(60)
        .build()
        .unwrap();

    client.search("Godfather").await.unwrap();
    client.search("Godfather").await.unwrap();

    assert_eq!(http.hits(), 1);
    let keys = memcached.keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(memcached.get(&keys[0]).unwrap().exptime, 60);
}

#[tokio::test]
async fn test_shared_cache_entry_is_used() {
    let http = MockHttpServer::new(mock_response(1, json!("from service"))).await;
    let memcached = MockMemcachedServer::new().await;

    // An entry written by another client for the same request
    let request = r#"{"jsonrpc":"2.0","method":"search","params":{"query":"Godfather","page":1,"limit":15,"imageSize":2,"token":"test-token"},"id":1}"#;
    memcached.insert(&fingerprint(request), mock_response(1, json!("from cache")).as_bytes());

    let client = cached_client(&http, &memcached, CacheKind::Memcache);
    assert_eq!(client.search("Godfather").await.unwrap(), json!("from cache"));
    assert_eq!(http.hits(), 0);
}

#[tokio::test]
async fn test_different_calls_use_different_keys() {
    let http = MockHttpServer::new(mock_response(1, json!({}))).await;
    let memcached = MockMemcachedServer::new().await;
    let client = cached_client(&http, &memcached, CacheKind::Memcache);

    client.get_by_url("http://www.filmtied.com/The-Godfather").await.unwrap();
    client
        .get_by_url_with_image_size("http://www.filmtied.com/The-Godfather", 1)
        .await
        .unwrap();
    client.resolve_by_external_url("http://www.imdb.com/name/nm0000295/").await.unwrap();

    assert_eq!(http.hits(), 3);
    assert_eq!(memcached.keys().len(), 3);
}

#[tokio::test]
async fn test_error_responses_are_cached() {
    let http = MockHttpServer::new(mock_error_response(1, -32000, "Unknown URL")).await;
    let memcached = MockMemcachedServer::new().await;
    let client = cached_client(&http, &memcached, CacheKind::Memcache);

    for _ in 0..2 {
        assert!(matches!(
            client.get_by_url("http://www.filmtied.com/Nope").await,
            Err(Error::Remote(_))
        ));
    }
    assert_eq!(http.hits(), 1);
}

#[tokio::test]
async fn test_unreachable_cache_falls_back_to_service() {
    let http = MockHttpServer::new(mock_response(1, json!(true))).await;

    // Bind then drop a listener to get a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ClientBuilder::new("test-token")
        .api_server_address(http.url())
        .with_cache(CacheKind::Memcached, "127.0.0.1", port)
        .build()
        .unwrap();
    assert!(client.is_caching());

    assert_eq!(client.search("Godfather").await.unwrap(), json!(true));
    assert_eq!(client.search("Godfather").await.unwrap(), json!(true));
    assert_eq!(http.hits(), 2);
}
