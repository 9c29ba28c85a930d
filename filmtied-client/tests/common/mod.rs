//! Common test utilities for filmtied-client integration tests
//!
//! This module provides mock HTTP and memcached servers for testing the
//! client end to end without the real service or a cache server.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by [`MockHttpServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Mock JSON-RPC HTTP server
///
/// Answers every request with the same canned body (status 200 unless
/// configured otherwise) and records what it received.
pub struct MockHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    hits: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl MockHttpServer {
    /// Start a server answering `200 OK` with `body`
    pub async fn new(body: impl Into<String>) -> Self {
        Self::start(200, body.into(), Duration::ZERO).await
    }

    /// Start a server answering with the given status code
    pub async fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self::start(status, body.into(), Duration::ZERO).await
    }

    /// Start a server that waits `delay` before answering
    pub async fn with_delay(delay: Duration, body: impl Into<String>) -> Self {
        Self::start(200, body.into(), delay).await
    }

    async fn start(status: u16, body: String, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));

        let task = {
            let requests = requests.clone();
            let hits = hits.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let requests = requests.clone();
                    let hits = hits.clone();
                    let body = body.clone();
                    tokio::spawn(async move {
                        answer(stream, status, &body, delay, &requests, &hits).await;
                    });
                }
            })
        };

        Self {
            addr,
            requests,
            hits,
            task,
        }
    }

    /// Endpoint URL for `ClientBuilder::api_server_address`
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests answered so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer(
    stream: TcpStream,
    status: u16,
    body: &str,
    delay: Duration,
    requests: &Mutex<Vec<RecordedRequest>>,
    hits: &AtomicUsize,
) -> Option<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.ok()? == 0 {
        return None;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut request_body = vec![0u8; length];
    reader.read_exact(&mut request_body).await.ok()?;

    // Recorded before answering, so a test sees it once the call returns
    requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8(request_body).ok()?,
    });

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let mut stream = reader.into_inner();
    hits.fetch_add(1, Ordering::SeqCst);
    stream.write_all(response.as_bytes()).await.ok()?;
    stream.flush().await.ok()
}

/// A value held by [`MockMemcachedServer`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub flags: u32,
    pub exptime: u64,
    pub data: Vec<u8>,
}

/// Mock memcached server speaking the text protocol `get` and `set`
pub struct MockMemcachedServer {
    addr: SocketAddr,
    store: Arc<Mutex<HashMap<String, StoredValue>>>,
    commands: Arc<Mutex<Vec<String>>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockMemcachedServer {
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(Mutex::new(HashMap::new()));
        let commands = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let store = store.clone();
            let commands = commands.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve_memcached(stream, store.clone(), commands.clone()));
                }
            })
        };

        Self {
            addr,
            store,
            commands,
            task,
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Command lines received, data blocks excluded
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn get(&self, key: &str) -> Option<StoredValue> {
        self.store.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.lock().unwrap().keys().cloned().collect()
    }

    /// Preload a value, as another client sharing the cache would
    pub fn insert(&self, key: &str, data: &[u8]) {
        self.store.lock().unwrap().insert(
            key.to_string(),
            StoredValue {
                flags: 0,
                exptime: 0,
                data: data.to_vec(),
            },
        );
    }
}

impl Drop for MockMemcachedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_memcached(
    stream: TcpStream,
    store: Arc<Mutex<HashMap<String, StoredValue>>>,
    commands: Arc<Mutex<Vec<String>>>,
) {
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let line = line.trim_end().to_string();
        commands.lock().unwrap().push(line.clone());

        let parts: Vec<&str> = line.split_whitespace().collect();
        let reply = match parts.as_slice() {
            ["get", key] => {
                let value = store.lock().unwrap().get(*key).cloned();
                let mut reply = Vec::new();
                if let Some(value) = value {
                    reply.extend_from_slice(
                        format!("VALUE {} {} {}\r\n", key, value.flags, value.data.len()).as_bytes(),
                    );
                    reply.extend_from_slice(&value.data);
                    reply.extend_from_slice(b"\r\n");
                }
                reply.extend_from_slice(b"END\r\n");
                reply
            }
            ["set", key, flags, exptime, bytes] => {
                let length: usize = bytes.parse().unwrap_or(0);
                let mut data = vec![0u8; length + 2];
                if reader.read_exact(&mut data).await.is_err() {
                    return;
                }
                data.truncate(length);
                store.lock().unwrap().insert(
                    key.to_string(),
                    StoredValue {
                        flags: flags.parse().unwrap_or(0),
                        exptime: exptime.parse().unwrap_or(0),
                        data,
                    },
                );
                b"STORED\r\n".to_vec()
            }
            _ => b"ERROR\r\n".to_vec(),
        };

        if reader.get_mut().write_all(&reply).await.is_err() {
            return;
        }
    }
}

/// Helper to create a JSON-RPC result body
pub fn mock_response(id: i64, result: serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id
    })
    .to_string()
}

/// Helper to create a JSON-RPC error body
pub fn mock_error_response(id: i64, code: i32, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": code,
            "message": message
        },
        "id": id
    })
    .to_string()
}
