//! # RoadTech Client
//!
//! Concrete implementations of the ports defined in `roadtech-core`, plus the
//! services built on them: the refreshing API client, the session controller,
//! live location tracking and the realtime push channel.

pub mod api;
pub mod http;
pub mod realtime;
pub mod session;
pub mod token;
pub mod tracking;
pub mod transport;

// Re-exports - services
pub use http::ApiClient;
pub use session::{Session, SessionController};
pub use tracking::{LocationTracker, TrackerOptions, TrackingError};

// Re-exports - adapters
pub use realtime::{InMemoryPushChannel, WsChannel, WsConfig};
pub use token::{FileTokenStore, InMemoryTokenStore};
pub use tracking::SimulatedGeolocator;
pub use transport::{MemoryTransport, ReqwestTransport};
