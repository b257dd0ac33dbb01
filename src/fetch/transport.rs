//! HTTP transport abstraction
//!
//! The fetch layer only needs one operation from the network: request a URL,
//! get back a status code and a body. Hiding that behind a trait keeps
//! reqwest at the edge of the crate and lets tests substitute a scripted
//! transport.

use async_trait::async_trait;
use reqwest::Client;

use super::error::FetchError;

/// A raw HTTP reply: status code plus undecoded body
#[derive(Debug, Clone)]
pub struct HttpReply {
    /// HTTP status code of the reply
    pub status: u16,
    /// Response body as received
    pub body: String,
}

impl HttpReply {
    /// Whether the status code indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal request-by-URL operation consumed by the fetch layer
///
/// Implementations fail only when no reply could be obtained at all;
/// non-success statuses are reported through [`HttpReply::status`] so the
/// caller decides how to classify them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues an idempotent GET for `url`
    async fn fetch(&self, url: &str) -> Result<HttpReply, FetchError>;
}

/// Transport backed by a reqwest [`Client`]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with a default HTTP client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a transport reusing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<HttpReply, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}
