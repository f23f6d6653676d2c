//! The location tracking service.
//!
//! While tracking is on, two sources feed one upload path: a fixed-period
//! timer re-sampling the position, and a movement-triggered watch. Uploads
//! are fire and forget - a failed upload is logged and tracking carries on.
//! Geolocation failures go to the caller's error callback, which decides
//! whether to stop.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use roadtech_core::domain::LocationSample;
use roadtech_core::ports::{GeolocationError, Geolocator};

use crate::api::MechanicApi;

/// Callback receiving geolocation errors.
pub type ErrorCallback = Arc<dyn Fn(GeolocationError) + Send + Sync>;

/// Tracking start options.
#[derive(Clone)]
pub struct TrackerOptions {
    /// Cadence of the periodic re-sample.
    pub interval: Duration,
    pub on_error: Option<ErrorCallback>,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            on_error: None,
        }
    }
}

impl TrackerOptions {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn on_error(mut self, callback: impl Fn(GeolocationError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

/// Tracking errors.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("No geolocation capability available")]
    Unavailable,
}

struct ActiveTracking {
    interval_task: JoinHandle<()>,
    watch_task: JoinHandle<()>,
}

/// Shared upload path for both sampling sources.
struct UploadSink {
    mechanic: MechanicApi,
    last_known: Arc<RwLock<Option<LocationSample>>>,
}

impl UploadSink {
    async fn send(&self, sample: LocationSample) {
        if let Ok(mut last_known) = self.last_known.write() {
            *last_known = Some(sample);
        }

        if let Err(error) = self.mechanic.update_location(&sample.location()).await {
            tracing::warn!(%error, "Failed to send location update");
        }
    }
}

fn report(on_error: &Option<ErrorCallback>, error: GeolocationError) {
    tracing::warn!(%error, "Geolocation error");
    if let Some(callback) = on_error {
        callback(error);
    }
}

/// Samples device position and reports it upstream while enabled.
pub struct LocationTracker {
    geolocator: Arc<dyn Geolocator>,
    mechanic: MechanicApi,
    active: Mutex<Option<ActiveTracking>>,
    last_known: Arc<RwLock<Option<LocationSample>>>,
}

impl LocationTracker {
    pub fn new(mechanic: MechanicApi, geolocator: Arc<dyn Geolocator>) -> Self {
        Self {
            geolocator,
            mechanic,
            active: Mutex::new(None),
            last_known: Arc::new(RwLock::new(None)),
        }
    }

    /// Begin tracking: one immediate fix, then the periodic timer and the
    /// movement watch. Starting while already started is a no-op, so exactly
    /// one timer and one watch exist per tracking session.
    pub async fn start(&self, options: TrackerOptions) -> Result<(), TrackingError> {
        if !self.geolocator.is_available() {
            return Err(TrackingError::Unavailable);
        }

        let mut active = self.active.lock().await;
        if active.is_some() {
            tracing::debug!("Location tracking already running");
            return Ok(());
        }

        let sink = Arc::new(UploadSink {
            mechanic: self.mechanic.clone(),
            last_known: Arc::clone(&self.last_known),
        });
        let interval = options.interval;
        let on_error = options.on_error;

        // Immediate fix before the timers take over.
        match self.geolocator.current_position().await {
            Ok(sample) => sink.send(sample).await,
            Err(error) => report(&on_error, error),
        }

        let interval_task = tokio::spawn({
            let geolocator = Arc::clone(&self.geolocator);
            let sink = Arc::clone(&sink);
            let on_error = on_error.clone();
            async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick completes immediately; the initial fix above
                // already covered it.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    match geolocator.current_position().await {
                        Ok(sample) => sink.send(sample).await,
                        Err(error) => report(&on_error, error),
                    }
                }
            }
        });

        let watch_task = tokio::spawn({
            let mut watch = self.geolocator.watch();
            async move {
                while let Some(event) = watch.next().await {
                    match event {
                        Ok(sample) => sink.send(sample).await,
                        Err(error) => report(&on_error, error),
                    }
                }
            }
        });

        *active = Some(ActiveTracking {
            interval_task,
            watch_task,
        });
        tracing::info!(interval_ms = interval.as_millis() as u64, "Location tracking started");
        Ok(())
    }

    /// Cancel the timer and the watch. Safe to call when not started.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(tracking) = active.take() {
            tracking.interval_task.abort();
            tracking.watch_task.abort();
            tracing::info!("Location tracking stopped");
        }
    }

    pub async fn is_tracking(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// The most recent sample, for display.
    pub fn last_known(&self) -> Option<LocationSample> {
        self.last_known.read().ok().and_then(|guard| *guard)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc;
    use tokio::task::yield_now;

    use roadtech_core::domain::Location;
    use roadtech_core::ports::{Method, PositionWatch, TokenPair};

    use crate::http::ApiClient;
    use crate::token::InMemoryTokenStore;
    use crate::tracking::SimulatedGeolocator;
    use crate::transport::MemoryTransport;

    use super::*;

    const LOCATION_PATH: &str = "/mechanic/location";

    fn upload_transport() -> Arc<MemoryTransport> {
        let transport = Arc::new(MemoryTransport::new());
        transport.on(Method::Put, LOCATION_PATH, |_| Ok(MemoryTransport::empty(200)));
        transport
    }

    fn tracker_with(
        transport: Arc<MemoryTransport>,
        geolocator: Arc<dyn Geolocator>,
    ) -> LocationTracker {
        let client = Arc::new(ApiClient::new(
            transport,
            Arc::new(InMemoryTokenStore::with_tokens(TokenPair::new("t1", "r1"))),
        ));
        LocationTracker::new(MechanicApi::new(client), geolocator)
    }

    fn slow_watch_geolocator() -> Arc<SimulatedGeolocator> {
        // The watch cadence is far beyond what any test advances, so only the
        // periodic timer fires.
        Arc::new(SimulatedGeolocator::new(
            vec![Location {
                latitude: 52.52,
                longitude: 13.405,
            }],
            Duration::from_secs(100_000),
        ))
    }

    async fn settle() {
        for _ in 0..4 {
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_uploads_immediately_and_on_interval() {
        let transport = upload_transport();
        let tracker = tracker_with(Arc::clone(&transport), slow_watch_geolocator());

        tracker
            .start(TrackerOptions::with_interval(Duration::from_secs(30)))
            .await
            .unwrap();
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 2);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 4);

        // The upload body is the bare coordinate pair.
        let sent = transport.last_request(LOCATION_PATH).unwrap();
        assert_eq!(sent.body.unwrap(), json!({"latitude": 52.52, "longitude": 13.405}));

        tracker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_does_not_double_the_rate() {
        let transport = upload_transport();
        let tracker = tracker_with(Arc::clone(&transport), slow_watch_geolocator());
        let options = TrackerOptions::with_interval(Duration::from_secs(30));

        tracker.start(options.clone()).await.unwrap();
        tracker.start(options).await.unwrap();
        settle().await;

        // One immediate fix, not two.
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        // One timer, not two.
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 2);

        tracker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_both_sources_and_is_idempotent() {
        let transport = upload_transport();
        let tracker = tracker_with(Arc::clone(&transport), slow_watch_geolocator());

        tracker
            .start(TrackerOptions::with_interval(Duration::from_secs(30)))
            .await
            .unwrap();
        settle().await;
        assert!(tracker.is_tracking().await);

        tracker.stop().await;
        tracker.stop().await;
        assert!(!tracker.is_tracking().await);

        let before = transport.calls(Method::Put, LOCATION_PATH);
        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_movement_watch_feeds_the_same_upload_path() {
        let transport = upload_transport();
        // Movement fires at 5s; the periodic timer would only fire at 3600s.
        let geolocator = Arc::new(SimulatedGeolocator::new(
            vec![
                Location {
                    latitude: 52.52,
                    longitude: 13.405,
                },
                Location {
                    latitude: 52.53,
                    longitude: 13.41,
                },
            ],
            Duration::from_secs(5),
        ));
        let tracker = tracker_with(Arc::clone(&transport), geolocator);

        tracker
            .start(TrackerOptions::with_interval(Duration::from_secs(3600)))
            .await
            .unwrap();
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 2);
        // The watch advanced the route; last known moved with it.
        assert_eq!(tracker.last_known().unwrap().latitude, 52.53);

        tracker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_uploads_do_not_stop_tracking() {
        let transport = Arc::new(MemoryTransport::new());
        transport.on(Method::Put, LOCATION_PATH, |_| Ok(MemoryTransport::empty(500)));
        let tracker = tracker_with(Arc::clone(&transport), slow_watch_geolocator());

        tracker
            .start(TrackerOptions::with_interval(Duration::from_secs(30)))
            .await
            .unwrap();
        settle().await;

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        // Every attempt failed, and every attempt was still made.
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 3);
        assert!(tracker.is_tracking().await);

        tracker.stop().await;
    }

    #[tokio::test]
    async fn test_start_requires_geolocation_capability() {
        let transport = upload_transport();
        let geolocator = Arc::new(SimulatedGeolocator::new(Vec::new(), Duration::from_secs(5)));
        let tracker = tracker_with(transport, geolocator);

        let result = tracker.start(TrackerOptions::default()).await;
        assert!(matches!(result, Err(TrackingError::Unavailable)));
        assert!(!tracker.is_tracking().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_geolocation_errors_reach_the_callback() {
        /// Always denies, so every sample attempt reports.
        struct DeniedGeolocator;

        #[async_trait]
        impl Geolocator for DeniedGeolocator {
            fn is_available(&self) -> bool {
                true
            }

            async fn current_position(&self) -> Result<LocationSample, GeolocationError> {
                Err(GeolocationError::PermissionDenied)
            }

            fn watch(&self) -> PositionWatch {
                // A watch that never produces.
                let (_tx, rx) = mpsc::channel(1);
                PositionWatch::new(rx)
            }
        }

        let transport = upload_transport();
        let tracker = tracker_with(Arc::clone(&transport), Arc::new(DeniedGeolocator));

        let seen: Arc<StdMutex<Vec<GeolocationError>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = TrackerOptions::with_interval(Duration::from_secs(30)).on_error(move |error| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(error);
            }
        });

        tracker.start(options).await.unwrap();
        settle().await;

        // The immediate fix already reported; nothing was uploaded.
        assert!(matches!(
            seen.lock().unwrap().first(),
            Some(GeolocationError::PermissionDenied)
        ));
        assert_eq!(transport.calls(Method::Put, LOCATION_PATH), 0);
        // The caller decides whether to stop; tracking itself continues.
        assert!(tracker.is_tracking().await);

        tracker.stop().await;
    }
}
