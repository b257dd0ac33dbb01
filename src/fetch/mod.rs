//! Fetch layer: HTTP transport, JSON client, and cache-aware coordination
//!
//! This module turns "give me the JSON at this URL" into cache-first
//! observations: fresh entries are served without touching the network,
//! concurrent observers of one URL share a single in-flight request, and
//! failures are delivered inside the observed state instead of being raised.

mod client;
mod error;
mod fetcher;
mod subscription;
mod transport;

pub use client::FetchClient;
pub use error::FetchError;
pub use fetcher::FetchCache;
pub use subscription::{RequestState, Subscription};
pub use transport::{HttpReply, HttpTransport, Transport};
