//! Great-circle distance on the WGS84 sphere

use crate::coord::Coordinate;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two positions in kilometers
///
/// Degree inputs are converted to radians internally. The result is finite
/// and non-negative for finite inputs; non-finite inputs propagate NaN and
/// callers are expected to guard.
#[inline]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUMBAI: Coordinate = Coordinate::new(19.0760, 72.8777);
    const PUNE: Coordinate = Coordinate::new(18.5204, 73.8567);

    #[test]
    fn test_zero_distance_at_identity() {
        assert!(distance_km(MUMBAI, MUMBAI).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let forward = distance_km(MUMBAI, PUNE);
        let backward = distance_km(PUNE, MUMBAI);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_known_city_pair() {
        // Mumbai to Pune is roughly 120 km as the crow flies
        let km = distance_km(MUMBAI, PUNE);
        assert!(km > 115.0 && km < 125.0, "got {km}");
    }

    #[test]
    fn test_antipodal_points() {
        let km = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((km - half_circumference).abs() < 1e-6, "got {km}");
    }

    #[test]
    fn test_nan_propagates() {
        let km = distance_km(Coordinate::new(f64::NAN, 0.0), MUMBAI);
        assert!(km.is_nan());
    }
}
