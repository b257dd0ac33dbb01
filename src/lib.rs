//! Caching JSON fetch library
//!
//! Fetches remote JSON resources by URL, deduplicates concurrent requests for
//! the same resource, and expires cached entries after a fixed time-to-live.
//! The whole cache can be exported as an opaque snapshot string and restored
//! in another runtime, so data fetched during a pre-render pass is available
//! to an interactive session without re-fetching.
//!
//! The typical flow on the priming side:
//!
//! ```no_run
//! # async fn demo() -> Result<(), fetchcache::FetchError> {
//! use fetchcache::FetchCache;
//!
//! let fetcher = FetchCache::new();
//! fetcher.preload("https://example.com/api/people").await?;
//! let snapshot = fetcher.export();
//! // embed `snapshot` in the handed-off document
//! # Ok(())
//! # }
//! ```
//!
//! And on the receiving side:
//!
//! ```no_run
//! # async fn demo(snapshot: &str) {
//! use fetchcache::FetchCache;
//!
//! let fetcher = FetchCache::new();
//! fetcher.restore(snapshot);
//! let sub = fetcher.observe("https://example.com/api/people");
//! let state = sub.current(); // already resolved, served from the snapshot
//! # }
//! ```

pub mod cache;
pub mod fetch;

pub use cache::{CacheEntry, CacheStore, CACHE_TTL};
pub use fetch::{
    FetchCache, FetchClient, FetchError, HttpReply, HttpTransport, RequestState, Subscription,
    Transport,
};
