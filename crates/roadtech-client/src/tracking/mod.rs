//! Live location tracking for mechanics on duty.

mod simulated;
mod tracker;

pub use simulated::SimulatedGeolocator;
pub use tracker::{ErrorCallback, LocationTracker, TrackerOptions, TrackingError};
