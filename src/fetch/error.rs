//! Error types for the fetch layer
//!
//! Errors here are cloneable value objects rather than wrappers around the
//! transport's native error types, because a failed request's outcome is
//! broadcast to every subscriber observing that URL.

use thiserror::Error;

/// Ways a fetch for a resource can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be completed at all
    #[error("request failed: {0}")]
    Network(String),

    /// The server replied, but with a non-success status
    #[error("server responded with status {0}")]
    Status(u16),

    /// The response body was not valid JSON
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
