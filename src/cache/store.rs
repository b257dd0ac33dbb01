//! In-memory cache store for fetched JSON payloads
//!
//! Provides a `CacheStore` that maps resource URLs to decoded JSON values with
//! fetch timestamps, supporting TTL-based freshness checks, wholesale reset,
//! and snapshot export/restore for handing cache contents between runtimes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How long a cached entry stays fresh: 5 minutes.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// One cached resource: the decoded JSON payload plus the instant it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The decoded JSON payload
    pub value: Value,
    /// When the value was written to the store
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time
    pub fn new(value: Value) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is still fresh at the time of the call
    ///
    /// Age is measured from `fetched_at`, so an entry written long ago is
    /// stale no matter how recently it was last read. A future-dated stamp
    /// counts as fresh.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now()
            .signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < ttl
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    /// Bumped on every wholesale replacement (reset, restore). A fetch that
    /// started under an older generation must not write its result back.
    generation: u64,
}

/// Shared in-memory mapping from resource URL to cached entry
///
/// Cloning a `CacheStore` yields another handle onto the same underlying map,
/// so the fetch layer and the transfer operations all see one set of entries.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<Mutex<State>>,
    ttl: Duration,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    /// Creates an empty store with the default 5-minute TTL
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Creates an empty store with a custom TTL
    ///
    /// Useful for testing expiry behavior without waiting out the default
    /// five-minute window.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::default())),
            ttl,
        }
    }

    /// The TTL entries in this store are held to
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap()
    }

    /// Looks up the entry for `key`, whether fresh or stale
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    /// Looks up the entry for `key` only if it is still fresh
    pub fn get_fresh(&self, key: &str) -> Option<CacheEntry> {
        self.get(key).filter(|entry| entry.is_fresh(self.ttl))
    }

    /// Inserts or replaces the entry for `key`, stamped with the current time
    pub fn put(&self, key: &str, value: Value) {
        self.lock()
            .entries
            .insert(key.to_string(), CacheEntry::new(value));
    }

    /// Inserts the entry for `key` unless the store was reset or restored
    /// after `generation` was observed
    ///
    /// Returns whether the write was honored. A fetch that resolves after the
    /// store was wiped must not resurrect its entry.
    pub fn put_if_current(&self, key: &str, value: Value, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(key, "discarding write from a superseded fetch");
            return false;
        }
        state.entries.insert(key.to_string(), CacheEntry::new(value));
        true
    }

    /// The current write generation; see [`CacheStore::put_if_current`]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Discards every entry
    pub fn reset(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.generation += 1;
    }

    /// Serializes every entry into a JSON snapshot string
    ///
    /// The snapshot maps each key to its `{value, fetched_at}` entry and is
    /// the input format of [`CacheStore::restore`]. An empty store produces
    /// the snapshot of an empty mapping, so the result is always safe to
    /// embed in a handed-off document.
    pub fn export(&self) -> String {
        let state = self.lock();
        match serde_json::to_string(&state.entries) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize cache snapshot");
                "{}".to_string()
            }
        }
    }

    /// Replaces the store's contents with the entries parsed from `snapshot`
    ///
    /// A malformed snapshot is logged and ignored, leaving the current
    /// entries untouched: the payload arrives from another runtime and must
    /// never take down the receiving one. An empty string means "no snapshot"
    /// and is skipped silently.
    pub fn restore(&self, snapshot: &str) {
        if snapshot.is_empty() {
            return;
        }
        match serde_json::from_str::<HashMap<String, CacheEntry>>(snapshot) {
            Ok(entries) => {
                let mut state = self.lock();
                state.entries = entries;
                state.generation += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed cache snapshot");
            }
        }
    }
}
