//! HTTP transport
//!
//! The [`Transport`] trait is the seam between the client and the network:
//! it takes a serialized request body and hands back the raw response
//! bytes. [`HttpTransport`] is the production implementation; tests and
//! hosts with special needs can plug in their own through
//! `ClientBuilder::with_transport`.
//!
//! The HTTP status code is not interpreted. Whatever body the server sends
//! goes to the decoder, which decides between result and error.

use crate::config::ClientConfig;
use async_trait::async_trait;
use filmtied_core::{Error, Result};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::error::Error as _;
use std::time::Duration;

/// Sends one serialized request and returns the raw response body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch `body` and return the response body bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on any network-level failure. No retries.
    async fn send(&self, body: String) -> Result<Vec<u8>>;
}

/// JSON-RPC over HTTP POST using `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint`
    ///
    /// A `None` timeout is not applied: no total limit, and the HTTP stack's
    /// own connect behavior.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the endpoint is not an absolute URL
    /// or the HTTP client cannot be initialized.
    pub fn new(
        endpoint: &str,
        connect_timeout: Option<Duration>,
        timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| {
            Error::Configuration(format!("invalid api server address {:?}: {}", endpoint, e))
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to initialize HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Create a transport from the endpoint, timeouts and user agent in `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            &config.api_server_address,
            config.connect_timeout(),
            config.request_timeout(),
            &config.user_agent(),
        )
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

/// Render a reqwest error with its whole source chain
///
/// reqwest's own `Display` stops at "error sending request", the useful
/// part (DNS, refused, timed out) is in the sources.
fn transport_error(err: reqwest::Error) -> Error {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Transport(message)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: String) -> Result<Vec<u8>> {
        let length = body.len();

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            request_bytes = length,
            response_bytes = bytes.len(),
            "Response received"
        );

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        let result = HttpTransport::new(
            "not a url",
            Some(Duration::from_secs(1)),
            Some(Duration::from_secs(1)),
            "test",
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_from_default_config() {
        let transport = HttpTransport::from_config(&ClientConfig::default()).unwrap();
        assert_eq!(transport.endpoint().as_str(), "http://api.filmtied.com/");
    }

    #[test]
    fn test_zero_timeouts_build() {
        let config = ClientConfig {
            connection_timeout: 0,
            timeout: 0,
            ..Default::default()
        };
        assert!(HttpTransport::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop a listener to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(
            &format!("http://127.0.0.1:{}", port),
            Some(Duration::from_secs(1)),
            Some(Duration::from_secs(1)),
            "test",
        )
        .unwrap();

        match transport.send("{}".to_string()).await {
            Err(Error::Transport(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
