//! The HTTP client core: bearer attachment and the single-flight
//! refresh-and-replay protocol for authentication failures.

mod client;
mod refresh;

pub use client::ApiClient;
pub use refresh::{GateTicket, RefreshGate, RefreshOutcome};
