//! Push channel port - best-effort realtime updates supplementing polling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of push messages the backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushKind {
    LocationUpdate,
    StatusUpdate,
    NewRequest,
    RequestCancelled,
}

/// A message delivered on a topic. Topics are backend-defined strings and
/// opaque at this boundary; the payload shape belongs to the layer that knows
/// the topic catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "type")]
    pub kind: PushKind,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl PushMessage {
    /// A message stamped with the current time.
    pub fn now(kind: PushKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Handler for incoming messages on a topic.
pub type PushHandler = Arc<dyn Fn(PushMessage) + Send + Sync>;

/// Handle for an active subscription. Unsubscribes when dropped or when
/// [`Subscription::unsubscribe`] is called explicitly.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that does nothing - handed out when the channel cannot
    /// take subscriptions, so callers never have to branch.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// End the subscription now instead of at drop time.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Push channel trait - abstraction over realtime transports.
///
/// Strictly best-effort: all state must remain reachable via polling alone,
/// so nothing here returns an error to its caller.
pub trait PushChannel: Send + Sync {
    /// Whether the underlying transport is currently up.
    fn is_connected(&self) -> bool;

    /// Register a handler for a topic. When the channel is not connected this
    /// is a no-op that returns an inert subscription - it never fails.
    fn subscribe(&self, topic: &str, handler: PushHandler) -> Subscription;

    /// Send a message on a topic. Dropped with a warning when not connected;
    /// no queuing.
    fn publish(&self, topic: &str, message: PushMessage);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting() -> (Subscription, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (subscription, calls)
    }

    #[test]
    fn test_unsubscribe_cancels_exactly_once() {
        let (subscription, calls) = counting();
        subscription.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let (subscription, calls) = counting();
        drop(subscription);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_subscription_is_inert() {
        let subscription = Subscription::noop();
        assert!(!subscription.is_active());
        subscription.unsubscribe();
    }
}
