//! Injected capability seams for position, places and directions providers
//!
//! The session never performs IO itself; the application hands it the
//! outcomes of calls made through these traits. Implementations return boxed
//! futures so the traits stay object-safe and runtime-agnostic.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::Result;
use crate::coord::Coordinate;
use crate::place::Place;

/// Options for a one-shot position acquisition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcquireOptions {
    /// Prefer the most precise fix the source can produce
    pub high_accuracy: bool,
    /// Maximum acceptable age of a cached fix
    pub maximum_age: Duration,
    /// How long the caller will wait before treating the acquisition as
    /// failed
    pub timeout: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Why a position acquisition failed
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("Location access denied. Please enable location access and retry.")]
    Denied,

    #[error("Position lookup is not supported on this platform")]
    Unsupported,

    #[error("Timed out waiting for a position fix")]
    Timeout,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// One-shot provider of the user's position
pub trait PositionSource: Send + Sync + 'static {
    /// Resolve the user's current position
    ///
    /// A single attempt; there is no retry. Sources that cannot honor every
    /// option treat the options as advisory.
    fn acquire(
        &self,
        options: AcquireOptions,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<Coordinate, PositionError>> + Send + '_>>;
}

/// Provider of nearby places around an origin
pub trait PlaceSource: Send + Sync + 'static {
    fn nearby(
        &self,
        origin: Coordinate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Place>>> + Send + '_>>;
}

/// A driving-route request from the user position to a selected place
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

/// A computed route: the polyline plus summary figures
#[derive(Clone, Debug, PartialEq)]
pub struct RouteGeometry {
    /// Route polyline in (x=lon, y=lat) order
    pub geometry: geo::LineString<f64>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Provider of driving directions between two positions
pub trait DirectionsSource: Send + Sync + 'static {
    fn route(
        &self,
        request: RouteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RouteGeometry>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_acquire_options() {
        let options = AcquireOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.maximum_age, Duration::ZERO);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_position_error_messages_are_user_facing() {
        assert!(PositionError::Denied.to_string().contains("enable location"));
        assert!(
            PositionError::Unavailable("no fix".to_string())
                .to_string()
                .contains("no fix")
        );
    }
}
