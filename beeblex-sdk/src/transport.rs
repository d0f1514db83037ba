//! HTTP transport abstraction.
//!
//! The engine only needs `POST(url, body) -> (status, body)`. Timeouts,
//! TLS and connection pooling belong to the implementation.

use crate::error::BeeblexResult;
use async_trait::async_trait;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends request bodies to the license server.
///
/// Implementations report failures that produced no HTTP response
/// (DNS, refused connections, timeouts) as [`BeeblexError::Transport`].
/// Any response, whatever its status, is returned as `Ok`.
///
/// [`BeeblexError::Transport`]: crate::BeeblexError::Transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs a JSON body to `url`.
    async fn post(&self, url: &str, body: Vec<u8>) -> BeeblexResult<HttpResponse>;
}

#[cfg(feature = "http")]
pub use self::http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::{HttpResponse, Transport};
    use crate::error::{BeeblexError, BeeblexResult};
    use async_trait::async_trait;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Client;
    use std::time::Duration;
    use tracing::debug;

    /// [`Transport`] backed by reqwest.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
    }

    impl HttpTransport {
        /// Creates a transport with the given per-request timeout.
        pub fn new(timeout: Duration) -> BeeblexResult<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .user_agent(concat!("beeblex-sdk/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| BeeblexError::Config(format!("failed to build HTTP client: {e}")))?;
            Ok(Self { client })
        }

        /// Wraps an existing client.
        #[must_use]
        pub fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn post(&self, url: &str, body: Vec<u8>) -> BeeblexResult<HttpResponse> {
            debug!(url = %url, bytes = body.len(), "POST");

            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| BeeblexError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| BeeblexError::Transport(format!("failed to read body: {e}")))?;

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        }
    }
}
