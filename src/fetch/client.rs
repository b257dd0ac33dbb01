//! JSON fetch client
//!
//! Wraps a [`Transport`] and turns raw replies into decoded JSON values,
//! classifying each failure as a network, status, or decode error.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::FetchError;
use super::transport::{HttpTransport, Transport};

/// Client that fetches a URL and decodes the response body as JSON
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient").finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Creates a client backed by a real HTTP transport
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    /// Creates a client backed by a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches `url` and decodes the response body as JSON
    ///
    /// # Returns
    /// * `Ok(Value)` - the decoded payload, on a 2xx reply with a JSON body
    /// * `Err(FetchError)` - if the request fails, the status is
    ///   non-success, or the body does not parse as JSON
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let reply = self.transport.fetch(url).await?;
        if !reply.is_success() {
            return Err(FetchError::Status(reply.status));
        }
        let value = serde_json::from_str(&reply.body)?;
        Ok(value)
    }
}
