//! Fetch coordination: cache-first lookups with in-flight request sharing
//!
//! `FetchCache` ties the cache store and the JSON client together. Observing a
//! URL serves a fresh cache hit synchronously, attaches to an in-flight fetch
//! when one exists, and otherwise starts a single background fetch whose
//! outcome every subscriber shares. A preload variant fetches unconditionally
//! and reports failures to the caller, for runs that prime the cache before
//! any consumer subscribes.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tokio::sync::watch;

use crate::cache::CacheStore;

use super::client::FetchClient;
use super::error::FetchError;
use super::subscription::{RequestState, Subscription};
use super::transport::Transport;

/// One in-flight fetch, joinable by later observers of the same URL
struct Inflight {
    /// Identifies this particular fetch, so a finished task never removes a
    /// successor registered under the same URL.
    ticket: u64,
    rx: watch::Receiver<RequestState>,
}

/// The process-wide instance behind [`FetchCache::shared`]
static SHARED: Lazy<FetchCache> = Lazy::new(FetchCache::new);

/// Cache-backed JSON fetcher with per-URL request deduplication
///
/// Cloning yields another handle onto the same store and in-flight registry.
/// Call sites that cannot wire a handle through use [`FetchCache::shared`];
/// tests build isolated instances with [`FetchCache::with_parts`].
#[derive(Clone)]
pub struct FetchCache {
    store: CacheStore,
    client: FetchClient,
    inflight: Arc<Mutex<HashMap<String, Inflight>>>,
    next_ticket: Arc<AtomicU64>,
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchCache")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl FetchCache {
    /// Creates an instance with an empty store and a real HTTP transport
    pub fn new() -> Self {
        Self::with_parts(CacheStore::new(), FetchClient::new())
    }

    /// Builds an instance over an explicit store and client
    pub fn with_parts(store: CacheStore, client: FetchClient) -> Self {
        Self {
            store,
            client,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an instance with an empty store over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::with_parts(CacheStore::new(), FetchClient::with_transport(transport))
    }

    /// The process-wide instance shared by call sites that do not pass an
    /// explicit handle around
    pub fn shared() -> &'static FetchCache {
        &SHARED
    }

    /// Access to the underlying store
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Observes `url`, returning a subscription onto its request state
    ///
    /// A fresh cached entry settles the subscription immediately without
    /// touching the network. A URL already being fetched attaches to that
    /// fetch rather than starting a second request. Otherwise a single
    /// background fetch starts; on success its value is written to the cache
    /// and broadcast, on failure the error is broadcast and nothing is
    /// cached. Failures are only ever delivered inside the state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe(&self, url: &str) -> Subscription {
        if let Some(entry) = self.store.get_fresh(url) {
            tracing::debug!(url, "serving fresh cache entry");
            return Subscription::settled(RequestState::ready(entry.value));
        }

        // Record the write generation before the fetch is registered, so a
        // reset or restore from here on invalidates the eventual write.
        let generation = self.store.generation();

        let mut inflight = self.inflight.lock().unwrap();
        if let Some(pending) = inflight.get(url) {
            tracing::debug!(url, "joining in-flight fetch");
            return Subscription::new(pending.rx.clone());
        }

        let (tx, rx) = watch::channel(RequestState::loading());
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        inflight.insert(
            url.to_string(),
            Inflight {
                ticket,
                rx: rx.clone(),
            },
        );
        drop(inflight);

        tracing::debug!(url, "starting fetch");
        let this = self.clone();
        let target = url.to_string();
        tokio::spawn(async move {
            let state = match this.client.fetch_json(&target).await {
                Ok(value) => {
                    this.store.put_if_current(&target, value.clone(), generation);
                    RequestState::ready(value)
                }
                Err(err) => {
                    tracing::debug!(url = %target, error = %err, "fetch failed");
                    RequestState::failed(err)
                }
            };
            this.finish(&target, ticket);
            // Subscribers may have gone away; delivery is best-effort.
            let _ = tx.send(state);
        });

        Subscription::new(rx)
    }

    /// Fetches `url` unconditionally and caches the decoded value
    ///
    /// Meant for a run that happens before any consumer subscribes, priming
    /// the cache ahead of a handoff. Unlike [`FetchCache::observe`] it
    /// ignores freshness and reports failures to the caller, so a priming
    /// pipeline can stop before handing off incomplete data. Nothing is
    /// written on failure.
    pub async fn preload(&self, url: &str) -> Result<(), FetchError> {
        let generation = self.store.generation();
        let value = self.client.fetch_json(url).await?;
        self.store.put_if_current(url, value, generation);
        Ok(())
    }

    /// Serializes the current cache contents; see [`CacheStore::export`]
    pub fn export(&self) -> String {
        self.store.export()
    }

    /// Replaces the cache contents from a snapshot; see [`CacheStore::restore`]
    ///
    /// Fetches already in flight are detached: their eventual results cannot
    /// overwrite the restored entries, and the next observer of their URL
    /// starts clean.
    pub fn restore(&self, snapshot: &str) {
        self.store.restore(snapshot);
        self.detach_inflight();
    }

    /// Clears every cached entry and detaches in-flight fetches
    pub fn reset(&self) {
        self.store.reset();
        self.detach_inflight();
    }

    /// Removes this fetch's in-flight entry once it has concluded
    fn finish(&self, url: &str, ticket: u64) {
        let mut inflight = self.inflight.lock().unwrap();
        if inflight.get(url).is_some_and(|pending| pending.ticket == ticket) {
            inflight.remove(url);
        }
    }

    fn detach_inflight(&self) {
        self.inflight.lock().unwrap().clear();
    }
}
