//! HTTP transport seam used by the dispatcher.
//!
//! The dispatcher only needs "POST these bytes, give me the status and body".
//! Keeping that behind [`Transport`] lets tests script responses without a
//! socket, while [`HttpTransport`] does the real work with `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tracing::{trace, warn};

/// Future returned by [`Transport::post`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>>;

/// Status line and body of one HTTP exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns `true` for statuses worth another attempt: 429 and every 5xx
    /// except 501.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.status, 429 | 500 | 502..=599)
    }
}

/// Failure of a single attempt below the HTTP status level.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Connect(String),
    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Minimal interface for posting JSON to the platform.
pub trait Transport: Send + Sync {
    /// Posts `body` as `application/json` to `url`.
    fn post<'a>(&'a self, url: &'a str, body: &'a [u8]) -> TransportFuture<'a>;
}

/// Timeout applied to each attempt when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT).unwrap_or_else(|err| {
            warn!(error = %err, "HTTP client build failed; attempts will have no timeout");
            Self::from_client(reqwest::Client::new())
        })
    }
}

impl HttpTransport {
    /// Builds a transport whose attempts each give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error when the client cannot be built, for
    /// example when the TLS backend fails to initialise.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, for callers that tune TLS or proxies.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post<'a>(&'a self, url: &'a str, body: &'a [u8]) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_vec())
                .send()
                .await
                .map_err(|err| TransportError::Connect(err.to_string()))?;
            let status = response.status().as_u16();
            let bytes = response
                .bytes()
                .await
                .map_err(|err| TransportError::Body(err.to_string()))?;
            trace!(url, status, len = bytes.len(), "platform API responded");
            Ok(RawResponse {
                status,
                body: bytes.to_vec(),
            })
        })
    }
}
