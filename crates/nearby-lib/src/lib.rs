//! Nearby Locator Core - Session State for Distance-Ranked Place Search
//!
//! This library implements the headless pipeline of the nearby services
//! locator: an acquired position flows into a [`LocatorSession`], a trailing
//! [`Debounce`] gate collapses bursts of fetch requests, fetched places are
//! annotated with haversine distances and stably sorted into a [`ResultSet`],
//! and selecting a result derives a single driving-route request. All IO goes
//! through injected capability traits and all state transitions are explicit
//! methods guarded by sequence numbers, so the whole pipeline runs headless
//! under test.
//!
//! # Architecture
//!
//! - **[`Coordinate`]**: validated WGS84 position
//! - **[`Debounce`]**: explicit trailing-edge gate with a 500 ms default window
//! - **[`ResultSet`]**: places annotated and stably ordered by distance
//! - **[`LocatorSession`]**: state container with sequence-guarded transitions
//! - **[`PositionSource`] / [`PlaceSource`] / [`DirectionsSource`]**: injected
//!   capability seams for the platform position fix, the places proxy and the
//!   directions service

mod coord;
mod debounce;
pub mod distance;
mod place;
mod session;
mod sources;

// Public API exports
pub use coord::Coordinate;
pub use debounce::{DEFAULT_DEBOUNCE_WINDOW, Debounce};
pub use place::{Place, RankedPlace, ResultSet, parse_places};
pub use session::{FetchJob, LocatorSession, RouteJob};
pub use sources::{
    AcquireOptions, DirectionsSource, PlaceSource, PositionError, PositionSource, RouteGeometry,
    RouteRequest,
};

/// Error types for the locator core
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Places payload parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected places payload: {0}")]
    UnexpectedPayload(String),

    #[error("{0}")]
    Places(String),

    #[error("Directions request failed: {0}")]
    Directions(String),
}

pub type Result<T> = std::result::Result<T, LocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the core entry points are accessible
        let _: fn(Vec<Place>, Coordinate) -> ResultSet = ResultSet::rank;
        let _: fn(&str) -> Result<Vec<Place>> = parse_places;
        let _: fn(Coordinate, Coordinate) -> f64 = distance::distance_km;
        let _: fn() -> LocatorSession = LocatorSession::default;
    }
}
