//! In-memory push channel.
//!
//! Works within a single process only: topic fan-out over tokio broadcast
//! channels. This is the fallback when no realtime endpoint is reachable, and
//! the workhorse for tests - correctness never depends on the channel, so an
//! in-process stand-in is always safe.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use roadtech_core::ports::{PushChannel, PushHandler, PushMessage, Subscription};

/// In-process push channel.
pub struct InMemoryPushChannel {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<PushMessage>>>>,
    buffer_size: usize,
}

impl InMemoryPushChannel {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }
}

impl Default for InMemoryPushChannel {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PushChannel for InMemoryPushChannel {
    fn is_connected(&self) -> bool {
        // In-process delivery has no transport to lose.
        true
    }

    fn subscribe(&self, topic: &str, handler: PushHandler) -> Subscription {
        let Ok(mut topics) = self.topics.write() else {
            return Subscription::noop();
        };

        let sender = topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);

        let mut receiver = sender.subscribe();
        let topic_name = topic.to_string();

        let task = tokio::spawn(async move {
            tracing::debug!(topic = %topic_name, "Subscribed to topic");

            loop {
                match receiver.recv().await {
                    Ok(message) => handler(message),
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            topic = %topic_name,
                            lagged = count,
                            "Subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!(topic = %topic_name, "Topic closed");
                        break;
                    }
                }
            }
        });

        Subscription::new(move || task.abort())
    }

    fn publish(&self, topic: &str, message: PushMessage) {
        let Ok(topics) = self.topics.read() else {
            return;
        };

        if let Some(sender) = topics.get(topic) {
            // Ignore send errors (no live subscribers).
            let _ = sender.send(message);
            tracing::debug!(topic = %topic, "Message published");
        } else {
            tracing::debug!(topic = %topic, "No subscribers for topic");
        }
    }
}
