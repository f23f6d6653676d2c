//! Route-playback geolocator.
//!
//! Stands in for device GPS in tests and headless deployments: position fixes
//! walk a configured route, and the movement watch emits the next waypoint on
//! a fixed cadence.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use roadtech_core::domain::{Location, LocationSample};
use roadtech_core::ports::{GeolocationError, Geolocator, PositionWatch};

struct Inner {
    route: Vec<Location>,
    cursor: AtomicUsize,
    movement_interval: Duration,
}

impl Inner {
    fn advance(&self) -> Option<LocationSample> {
        if self.route.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.route.len();
        let point = self.route[index];
        Some(LocationSample::now(point.latitude, point.longitude))
    }
}

/// Geolocator that loops over a fixed route.
#[derive(Clone)]
pub struct SimulatedGeolocator {
    inner: Arc<Inner>,
}

impl SimulatedGeolocator {
    pub fn new(route: Vec<Location>, movement_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                route,
                cursor: AtomicUsize::new(0),
                movement_interval,
            }),
        }
    }
}

#[async_trait]
impl Geolocator for SimulatedGeolocator {
    fn is_available(&self) -> bool {
        !self.inner.route.is_empty()
    }

    async fn current_position(&self) -> Result<LocationSample, GeolocationError> {
        self.inner
            .advance()
            .ok_or_else(|| GeolocationError::Unavailable("no route configured".to_string()))
    }

    fn watch(&self) -> PositionWatch {
        let (tx, rx) = mpsc::channel(16);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(inner.movement_interval).await;
                let Some(sample) = inner.advance() else {
                    break;
                };
                // The watch was dropped; stop producing.
                if tx.send(Ok(sample)).await.is_err() {
                    break;
                }
            }
        });

        PositionWatch::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Vec<Location> {
        vec![
            Location {
                latitude: 52.52,
                longitude: 13.405,
            },
            Location {
                latitude: 52.53,
                longitude: 13.41,
            },
        ]
    }

    #[tokio::test]
    async fn test_fixes_walk_the_route_and_wrap() {
        let geo = SimulatedGeolocator::new(route(), Duration::from_secs(60));

        let first = geo.current_position().await.unwrap();
        let second = geo.current_position().await.unwrap();
        let third = geo.current_position().await.unwrap();

        assert_eq!(first.latitude, 52.52);
        assert_eq!(second.latitude, 52.53);
        assert_eq!(third.latitude, 52.52);
    }

    #[tokio::test]
    async fn test_empty_route_is_unavailable() {
        let geo = SimulatedGeolocator::new(Vec::new(), Duration::from_secs(60));

        assert!(!geo.is_available());
        assert!(geo.current_position().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_emits_on_movement_cadence() {
        let geo = SimulatedGeolocator::new(route(), Duration::from_secs(5));
        let mut watch = geo.watch();

        tokio::time::advance(Duration::from_secs(5)).await;
        let sample = watch.next().await.unwrap().unwrap();
        assert_eq!(sample.latitude, 52.52);
    }
}
