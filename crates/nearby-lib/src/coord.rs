//! Validated WGS84 coordinate type shared across the locator

use crate::{LocatorError, Result};
use geo::Point;

/// Valid latitude magnitude in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Valid longitude magnitude in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS84 position in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without validating it
    ///
    /// Use [`Coordinate::validated`] before feeding it into the session.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validate that both components are finite and within WGS84 bounds
    pub fn validated(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(LocatorError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Check that both components are finite and within WGS84 bounds
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= MAX_LATITUDE
            && self.longitude.abs() <= MAX_LONGITUDE
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}
