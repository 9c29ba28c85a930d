//! memcached cache backends
//!
//! Two call shapes are supported, matching the two memcached client
//! flavours the service's users run:
//!
//! - [`MemcacheStore`]: legacy shape, `set(key, value, flags, ttl)` with an
//!   explicit flags word (compression off, so `0`)
//! - [`MemcachedStore`]: plain shape, `set(key, value, ttl)`
//!
//! Both sit on a [`MemcachedConnection`] speaking the memcached text
//! protocol:
//!
//! ```text
//! get <key>\r\n
//!   -> VALUE <key> <flags> <bytes>\r\n<data>\r\nEND\r\n   (hit)
//!   -> END\r\n                                             (miss)
//! set <key> <flags> <exptime> <bytes>\r\n<data>\r\n
//!   -> STORED\r\n
//! ```
//!
//! The connection is opened on first use and held behind a mutex, so one
//! client (and its clones) issues commands strictly one at a time. Any I/O
//! or protocol failure drops the connection; the next command reconnects.

use crate::cache::CacheStore;
use async_trait::async_trait;
use filmtied_core::{Error, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Default limit for connecting plus one command exchange
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(1);

/// memcached's default item size limit; larger data blocks are refused
const MAX_ITEM_SIZE: usize = 1024 * 1024;

/// Flags word the legacy shape sends for an uncompressed value
pub const MEMCACHE_UNCOMPRESSED: u32 = 0;

type Stream = BufStream<TcpStream>;

fn io_error(e: std::io::Error) -> Error {
    Error::Cache(e.to_string())
}

/// One lazily-opened connection to a memcached server
pub struct MemcachedConnection {
    address: String,
    io_timeout: Duration,
    stream: Mutex<Option<Stream>>,
}

impl MemcachedConnection {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            io_timeout: DEFAULT_IO_TIMEOUT,
            stream: Mutex::new(None),
        }
    }

    /// Limit for connecting plus one command exchange
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// `get <key>`
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slot = self.stream.lock().await;
        let result = match tokio::time::timeout(
            self.io_timeout,
            exchange_get(&mut slot, &self.address, key),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(self.timed_out()),
        };
        if result.is_err() {
            *slot = None;
        }
        result
    }

    /// `set <key> 0 <exptime> <bytes>`
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.set_with_flags(key, value, 0, ttl).await
    }

    /// `set <key> <flags> <exptime> <bytes>`
    pub async fn set_with_flags(
        &self,
        key: &str,
        value: &[u8],
        flags: u32,
        ttl: Duration,
    ) -> Result<()> {
        let mut slot = self.stream.lock().await;
        let result = match tokio::time::timeout(
            self.io_timeout,
            exchange_set(&mut slot, &self.address, key, value, flags, ttl.as_secs()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(self.timed_out()),
        };
        if result.is_err() {
            *slot = None;
        }
        result
    }

    fn timed_out(&self) -> Error {
        Error::Cache(format!(
            "memcached at {} did not answer within {:?}",
            self.address, self.io_timeout
        ))
    }
}

async fn connected<'a>(slot: &'a mut Option<Stream>, address: &str) -> Result<&'a mut Stream> {
    if slot.is_none() {
        let tcp = TcpStream::connect(address)
            .await
            .map_err(|e| Error::Cache(format!("failed to connect to memcached at {}: {}", address, e)))?;
        tcp.set_nodelay(true).map_err(io_error)?;
        *slot = Some(BufStream::new(tcp));
    }
    slot.as_mut()
        .ok_or_else(|| Error::Cache(format!("no connection to memcached at {}", address)))
}

/// Read one `\r\n`-terminated line, without the terminator
async fn read_line(stream: &mut Stream) -> Result<String> {
    let mut line = String::new();
    let n = stream.read_line(&mut line).await.map_err(io_error)?;
    if n == 0 {
        return Err(Error::Cache("memcached closed the connection".to_string()));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn unexpected_reply(line: &str) -> Error {
    Error::Cache(format!("unexpected memcached reply: {:?}", line))
}

async fn exchange_get(
    slot: &mut Option<Stream>,
    address: &str,
    key: &str,
) -> Result<Option<Vec<u8>>> {
    let stream = connected(slot, address).await?;

    stream
        .write_all(format!("get {}\r\n", key).as_bytes())
        .await
        .map_err(io_error)?;
    stream.flush().await.map_err(io_error)?;

    let header = read_line(stream).await?;
    if header == "END" {
        return Ok(None);
    }

    // VALUE <key> <flags> <bytes> [<cas unique>]
    let mut parts = header.split_ascii_whitespace();
    let length = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("VALUE"), Some(_key), Some(_flags), Some(bytes)) => bytes
            .parse::<usize>()
            .map_err(|_| unexpected_reply(&header))?,
        _ => return Err(unexpected_reply(&header)),
    };

    if length > MAX_ITEM_SIZE {
        return Err(Error::Cache(format!(
            "memcached item of {} bytes exceeds the {} byte limit",
            length, MAX_ITEM_SIZE
        )));
    }
    let block = length
        .checked_add(2)
        .ok_or_else(|| unexpected_reply(&header))?;

    let mut data = vec![0u8; block];
    stream.read_exact(&mut data).await.map_err(io_error)?;
    if !data.ends_with(b"\r\n") {
        return Err(Error::Cache("malformed memcached data block".to_string()));
    }
    data.truncate(length);

    let trailer = read_line(stream).await?;
    if trailer != "END" {
        return Err(unexpected_reply(&trailer));
    }

    Ok(Some(data))
}

async fn exchange_set(
    slot: &mut Option<Stream>,
    address: &str,
    key: &str,
    value: &[u8],
    flags: u32,
    exptime: u64,
) -> Result<()> {
    let stream = connected(slot, address).await?;

    let header = format!("set {} {} {} {}\r\n", key, flags, exptime, value.len());
    stream.write_all(header.as_bytes()).await.map_err(io_error)?;
    stream.write_all(value).await.map_err(io_error)?;
    stream.write_all(b"\r\n").await.map_err(io_error)?;
    stream.flush().await.map_err(io_error)?;

    let reply = read_line(stream).await?;
    match reply.as_str() {
        "STORED" => Ok(()),
        _ => Err(unexpected_reply(&reply)),
    }
}

/// memcached backend using the legacy call shape
pub struct MemcacheStore {
    connection: MemcachedConnection,
}

impl MemcacheStore {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_connection(MemcachedConnection::new(host, port))
    }

    pub fn with_connection(connection: MemcachedConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &MemcachedConnection {
        &self.connection
    }
}

#[async_trait]
impl CacheStore for MemcacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.connection.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.connection
            .set_with_flags(key, value, MEMCACHE_UNCOMPRESSED, ttl)
            .await
    }
}

/// memcached backend using the plain call shape
pub struct MemcachedStore {
    connection: MemcachedConnection,
}

impl MemcachedStore {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_connection(MemcachedConnection::new(host, port))
    }

    pub fn with_connection(connection: MemcachedConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &MemcachedConnection {
        &self.connection
    }
}

#[async_trait]
impl CacheStore for MemcachedStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.connection.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.connection.set(key, value, ttl).await
    }
}
