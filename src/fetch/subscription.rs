//! Per-consumer view of an observed fetch
//!
//! A [`Subscription`] tracks one URL for one consumer. The consumer can poll
//! [`Subscription::current`] once per render pass or await
//! [`Subscription::resolved`] for the terminal state; either way the state
//! always reaches a terminal value, errors included.

use std::fmt;

use serde_json::Value;
use tokio::sync::watch;

use super::error::FetchError;

/// What a consumer observes for a URL at a given moment
///
/// While the fetch is running, `data` and `error` are both `None`. Once
/// `is_loading` turns false, exactly one of them is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState {
    /// Whether the fetch is still in progress
    pub is_loading: bool,
    /// The decoded payload, once available
    pub data: Option<Value>,
    /// The failure, if the fetch did not produce data
    pub error: Option<FetchError>,
}

impl RequestState {
    /// State while the fetch is still running
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            data: None,
            error: None,
        }
    }

    /// Terminal state carrying the decoded payload
    pub fn ready(value: Value) -> Self {
        Self {
            is_loading: false,
            data: Some(value),
            error: None,
        }
    }

    /// Terminal state carrying the failure
    pub fn failed(error: FetchError) -> Self {
        Self {
            is_loading: false,
            data: None,
            error: Some(error),
        }
    }
}

/// A consumer's handle onto one observed URL
///
/// Cheap to poll. Subscriptions handed out for the same in-flight URL all
/// resolve from the same underlying fetch.
pub struct Subscription {
    rx: watch::Receiver<RequestState>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("current", &self.current())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<RequestState>) -> Self {
        Self { rx }
    }

    /// Creates a subscription that is already in a terminal state
    pub(crate) fn settled(state: RequestState) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx }
    }

    /// The observed state as of right now
    pub fn current(&self) -> RequestState {
        self.rx.borrow().clone()
    }

    /// Waits until the fetch reaches a terminal state and returns it
    ///
    /// Returns immediately when the state is already terminal. If the
    /// producing side has gone away, the last observed state is returned
    /// as-is.
    pub async fn resolved(&mut self) -> RequestState {
        loop {
            let state = self.current();
            if !state.is_loading {
                return state;
            }
            if self.rx.changed().await.is_err() {
                return self.current();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loading_state_has_no_data_or_error() {
        let state = RequestState::loading();
        assert!(state.is_loading);
        assert!(state.data.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_terminal_states_carry_exactly_one_outcome() {
        let ready = RequestState::ready(json!({"ok": true}));
        assert!(!ready.is_loading);
        assert!(ready.data.is_some());
        assert!(ready.error.is_none());

        let failed = RequestState::failed(FetchError::Status(404));
        assert!(!failed.is_loading);
        assert!(failed.data.is_none());
        assert!(failed.error.is_some());
    }

    #[tokio::test]
    async fn test_settled_subscription_resolves_immediately() {
        let mut sub = Subscription::settled(RequestState::ready(json!(1)));

        assert_eq!(sub.current().data, Some(json!(1)));
        assert_eq!(sub.resolved().await.data, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_resolved_waits_for_the_terminal_state() {
        let (tx, rx) = watch::channel(RequestState::loading());
        let mut sub = Subscription::new(rx);

        assert!(sub.current().is_loading);

        tokio::spawn(async move {
            tx.send(RequestState::ready(json!([1, 2]))).ok();
        });

        let state = sub.resolved().await;
        assert_eq!(state.data, Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_resolved_returns_last_state_when_producer_is_gone() {
        let (tx, rx) = watch::channel(RequestState::loading());
        let mut sub = Subscription::new(rx);
        drop(tx);

        // Never reached a terminal state; the last observed one comes back.
        let state = sub.resolved().await;
        assert!(state.is_loading);
    }
}
