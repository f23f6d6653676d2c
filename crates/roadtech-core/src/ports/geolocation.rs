//! Geolocation port - a producer of position samples with two cadences.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::LocationSample;

/// Geolocation failures, mirroring the platform error codes.
///
/// These are reported through callbacks, never thrown through the tracking
/// loop; the caller decides whether tracking continues.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out waiting for a position fix")]
    Timeout,
}

/// A continuous movement-triggered watch. Dropping the watch cancels it.
pub struct PositionWatch {
    rx: mpsc::Receiver<Result<LocationSample, GeolocationError>>,
}

impl PositionWatch {
    pub fn new(rx: mpsc::Receiver<Result<LocationSample, GeolocationError>>) -> Self {
        Self { rx }
    }

    /// The next position change, or `None` once the producer has gone away.
    pub async fn next(&mut self) -> Option<Result<LocationSample, GeolocationError>> {
        self.rx.recv().await
    }
}

/// Device geolocation capability.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Whether a position source is present at all. Tracking refuses to start
    /// without one.
    fn is_available(&self) -> bool;

    /// One-shot position fix.
    async fn current_position(&self) -> Result<LocationSample, GeolocationError>;

    /// Start a movement-triggered watch.
    fn watch(&self) -> PositionWatch;
}
