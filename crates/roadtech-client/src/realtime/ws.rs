//! WebSocket push channel.
//!
//! A background task owns the socket: callers hand it outgoing frames over an
//! mpsc queue and never hold a lock across network I/O. The task presents the
//! current access token as a connection credential, re-reading it from the
//! token store on every reconnect attempt so a fresh login is picked up, and
//! retries dropped connections on a fixed delay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use uuid::Uuid;

use roadtech_core::ports::{PushChannel, PushHandler, PushMessage, Subscription, TokenStore};

/// Realtime transport errors. Logged, marked on the connection state, never
/// surfaced to `publish`/`subscribe` callers.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// WebSocket channel configuration.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Endpoint, e.g. `ws://localhost:8080/api/ws`.
    pub url: String,
    /// Delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// A topic-addressed message as it travels the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFrame {
    topic: String,
    #[serde(flatten)]
    message: PushMessage,
}

struct ChannelShared {
    config: WsConfig,
    tokens: Arc<dyn TokenStore>,
    connected: AtomicBool,
    outbound: RwLock<Option<mpsc::Sender<WireFrame>>>,
    topics: RwLock<HashMap<String, HashMap<Uuid, PushHandler>>>,
}

impl ChannelShared {
    /// Connection loop: connect, pump frames, mark down, back off, repeat.
    async fn run(self: Arc<Self>) {
        loop {
            let Some(token) = self.tokens.access_token().await else {
                tracing::warn!("No access token available; realtime channel not connecting");
                break;
            };

            match self.connect_once(&token).await {
                Ok(()) => tracing::info!("Realtime connection closed"),
                Err(error) => tracing::warn!(%error, "Realtime connection failed"),
            }

            self.mark_down();

            tokio::time::sleep(self.config.reconnect_delay).await;
            tracing::debug!("Attempting realtime reconnect");
        }
    }

    async fn connect_once(&self, token: &str) -> Result<(), RealtimeError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|error| RealtimeError::Connect(error.to_string()))?;
        let credential = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|error| RealtimeError::Connect(error.to_string()))?;
        request.headers_mut().insert("Authorization", credential);

        let (stream, _) = connect_async(request)
            .await
            .map_err(|error| RealtimeError::Connect(error.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let (tx, mut rx) = mpsc::channel::<WireFrame>(32);
        if let Ok(mut outbound) = self.outbound.write() {
            *outbound = Some(tx);
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("Realtime channel connected");

        loop {
            tokio::select! {
                outgoing = rx.recv() => {
                    let Some(frame) = outgoing else { break };
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(error) => {
                            tracing::warn!(%error, "Dropping unserializable frame");
                            continue;
                        }
                    };
                    if let Err(error) = sink.send(Message::Text(text)).await {
                        return Err(RealtimeError::Protocol(error.to_string()));
                    }
                }
                incoming = source.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => self.dispatch(&text),
                        Some(Ok(Message::Close(_))) => break,
                        // Pings and binary frames are transport noise.
                        Some(Ok(_)) => {}
                        Some(Err(error)) => return Err(RealtimeError::Protocol(error.to_string())),
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }

    fn dispatch(&self, raw: &str) {
        let frame: WireFrame = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(%error, "Dropping malformed realtime frame");
                return;
            }
        };

        // Handlers run outside the lock; one may subscribe or unsubscribe.
        let handlers: Vec<PushHandler> = {
            let Ok(topics) = self.topics.read() else { return };
            match topics.get(&frame.topic) {
                Some(subscribers) => subscribers.values().cloned().collect(),
                None => {
                    tracing::debug!(topic = %frame.topic, "No subscribers for topic");
                    return;
                }
            }
        };

        for handler in handlers {
            handler(frame.message.clone());
        }
    }

    fn mark_down(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Ok(mut outbound) = self.outbound.write() {
            *outbound = None;
        }
    }
}

/// Push channel over a WebSocket connection.
pub struct WsChannel {
    shared: Arc<ChannelShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WsChannel {
    pub fn new(config: WsConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            shared: Arc::new(ChannelShared {
                config,
                tokens,
                connected: AtomicBool::new(false),
                outbound: RwLock::new(None),
                topics: RwLock::new(HashMap::new()),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Start the connection loop. Requires an authenticated session - the
    /// loop stops if no access token is stored. Calling again while running
    /// is a no-op.
    pub fn connect(&self) {
        let Ok(mut worker) = self.worker.lock() else {
            return;
        };
        if worker.is_some() {
            tracing::debug!("Realtime channel already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        *worker = Some(tokio::spawn(shared.run()));
    }

    /// Tear down the connection loop and release the transport. A new login
    /// gets a fresh channel (and with it, the new token).
    pub fn disconnect(&self) {
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                handle.abort();
            }
        }
        self.shared.mark_down();
        tracing::info!("Realtime channel shut down");
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl PushChannel for WsChannel {
    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self, topic: &str, handler: PushHandler) -> Subscription {
        if !self.is_connected() {
            tracing::warn!(topic = %topic, "Realtime channel not connected; subscribe is a no-op");
            return Subscription::noop();
        }

        let id = Uuid::new_v4();
        if let Ok(mut topics) = self.shared.topics.write() {
            topics
                .entry(topic.to_string())
                .or_default()
                .insert(id, handler);
        }
        tracing::debug!(topic = %topic, "Subscribed to topic");

        let shared = Arc::clone(&self.shared);
        let topic = topic.to_string();
        Subscription::new(move || {
            if let Ok(mut topics) = shared.topics.write() {
                if let Some(subscribers) = topics.get_mut(&topic) {
                    subscribers.remove(&id);
                    if subscribers.is_empty() {
                        topics.remove(&topic);
                    }
                }
            }
        })
    }

    fn publish(&self, topic: &str, message: PushMessage) {
        let outbound = self
            .shared
            .outbound
            .read()
            .ok()
            .and_then(|guard| guard.clone());

        let Some(outbound) = outbound else {
            tracing::warn!(topic = %topic, "Realtime channel not connected; dropping message");
            return;
        };

        let frame = WireFrame {
            topic: topic.to_string(),
            message,
        };
        if let Err(error) = outbound.try_send(frame) {
            tracing::warn!(%error, "Realtime send queue full; dropping message");
        }
    }
}
