//! Push channel adapters: WebSocket against the backend, in-process broadcast
//! for tests and socket-less deployments.

mod memory;
mod ws;

pub use memory::InMemoryPushChannel;
pub use ws::{RealtimeError, WsChannel, WsConfig};
