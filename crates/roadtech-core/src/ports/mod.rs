//! Ports - trait definitions for the platform facilities the SDK runs on.
//! These are the "interfaces" that infrastructure must implement.

mod geolocation;
mod push;
mod token_store;
mod transport;

pub use geolocation::{GeolocationError, Geolocator, PositionWatch};
pub use push::{PushChannel, PushHandler, PushKind, PushMessage, Subscription};
pub use token_store::{TokenPair, TokenStore, TokenStoreError};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
