//! Place records parsed from the relayed search payload, plus distance ranking

use crate::coord::Coordinate;
use crate::distance;
use crate::{LocatorError, Result};
use std::cmp::Ordering;

/// Valid rating range reported by the places service
const MAX_RATING: f64 = 5.0;

/// A nearby place parsed from the relayed places payload
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    /// Stable identifier assigned by the places service, when present
    pub place_id: Option<String>,
    pub name: String,
    pub position: Coordinate,
    /// Short human-readable address line
    pub vicinity: Option<String>,
    /// Average user rating in `[0, 5]`, when present and in range
    pub rating: Option<f64>,
}

/// Raw wire shape of one nearby-search result entry
#[derive(serde::Deserialize)]
struct RawPlace {
    place_id: Option<String>,
    name: Option<String>,
    vicinity: Option<String>,
    rating: Option<f64>,
    geometry: Option<RawGeometry>,
}

#[derive(serde::Deserialize)]
struct RawGeometry {
    location: Option<RawLocation>,
}

#[derive(serde::Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl Place {
    /// Convert one raw payload entry, skipping entries that cannot name a
    /// place or position it numerically
    fn from_value(value: serde_json::Value) -> Option<Self> {
        let raw: RawPlace = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Skipping malformed place entry: {err}");
                return None;
            }
        };

        let Some(name) = raw.name else {
            tracing::warn!("Skipping place entry without a name");
            return None;
        };
        let Some(location) = raw.geometry.and_then(|geometry| geometry.location) else {
            tracing::warn!("Skipping place entry without coordinates: {name}");
            return None;
        };

        // Out-of-range positions are kept so they can rank last instead of
        // silently disappearing from the list.
        let position = Coordinate::new(location.lat, location.lng);

        let rating = raw.rating.filter(|rating| {
            let in_range = (0.0..=MAX_RATING).contains(rating);
            if !in_range {
                tracing::warn!("Dropping out-of-range rating {rating} for {name}");
            }
            in_range
        });

        Some(Place {
            place_id: raw.place_id,
            name,
            position,
            vicinity: raw.vicinity,
            rating,
        })
    }
}

/// Parse the relayed places payload into [`Place`] records
///
/// Accepts either a bare JSON array of entries or an object wrapping the
/// array in a `results` field (the upstream nearby-search shape), so callers
/// can consume the proxy relay and the upstream response interchangeably.
/// Entries without a name or a numeric `geometry.location` are skipped with
/// a warning rather than failing the whole payload.
pub fn parse_places(body: &str) -> Result<Vec<Place>> {
    let payload: serde_json::Value = serde_json::from_str(body)?;

    let entries = match payload {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(mut object) => match object.remove("results") {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => {
                return Err(LocatorError::UnexpectedPayload(
                    "expected an array of places or a results object".to_string(),
                ));
            }
        },
        _ => {
            return Err(LocatorError::UnexpectedPayload(
                "expected an array of places".to_string(),
            ));
        }
    };

    Ok(entries.into_iter().filter_map(Place::from_value).collect())
}

/// A [`Place`] annotated with its distance from the ranking origin
///
/// `distance_km` is `None` when the position is out of range or the computed
/// distance is not finite; unranked entries order after all ranked ones.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedPlace {
    pub place: Place,
    pub distance_km: Option<f64>,
}

/// Places ordered by ascending distance from a fixed origin
///
/// Constructed wholesale by [`ResultSet::rank`] and never mutated in place.
/// The sort is stable, so entries at equal distance keep their payload order.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSet {
    origin: Coordinate,
    entries: Vec<RankedPlace>,
}

impl ResultSet {
    /// Annotate every place with its distance from `origin` and sort the
    /// entries by ascending distance
    pub fn rank(places: Vec<Place>, origin: Coordinate) -> Self {
        // Ranking runs on the UI thread right after a fetch completes, so
        // keep it visible in traces.
        #[cfg(feature = "profiling")]
        profiling::scope!("result_set::rank");

        let mut entries: Vec<RankedPlace> = places
            .into_iter()
            .map(|place| {
                let distance_km = annotate(origin, &place);
                RankedPlace { place, distance_km }
            })
            .collect();
        entries.sort_by(compare_by_distance);

        Self { origin, entries }
    }

    /// The origin the distances were annotated against
    #[inline]
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&RankedPlace> {
        self.entries.get(index)
    }

    #[inline]
    pub fn entries(&self) -> &[RankedPlace] {
        &self.entries
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RankedPlace> {
        self.entries.iter()
    }
}

fn annotate(origin: Coordinate, place: &Place) -> Option<f64> {
    if !place.position.is_valid() {
        return None;
    }
    let km = distance::distance_km(origin, place.position);
    km.is_finite().then_some(km)
}

fn compare_by_distance(a: &RankedPlace, b: &RankedPlace) -> Ordering {
    match (a.distance_km, b.distance_km) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(19.0760, 72.8777);

    fn create_test_place(name: &str, lat: f64, lng: f64) -> Place {
        Place {
            place_id: None,
            name: name.to_string(),
            position: Coordinate::new(lat, lng),
            vicinity: None,
            rating: None,
        }
    }

    #[test]
    fn test_parse_bare_array() {
        let body = r#"[
            {
                "place_id": "ChIJd7qFeEzO5zsR8zFyTz3yGxw",
                "name": "St. Mary's School",
                "vicinity": "Nesbit Road, Mazgaon",
                "rating": 4.4,
                "geometry": { "location": { "lat": 18.9690, "lng": 72.8397 } }
            },
            {
                "name": "University of Mumbai",
                "geometry": { "location": { "lat": 18.9302, "lng": 72.8328 } }
            }
        ]"#;

        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "St. Mary's School");
        assert_eq!(places[0].vicinity.as_deref(), Some("Nesbit Road, Mazgaon"));
        assert_eq!(places[0].rating, Some(4.4));
        assert_eq!(places[0].position, Coordinate::new(18.9690, 72.8397));
        assert_eq!(places[1].place_id, None);
        assert_eq!(places[1].rating, None);
    }

    #[test]
    fn test_parse_results_wrapper() {
        let body = r#"{
            "status": "OK",
            "results": [
                { "name": "Government Polytechnic", "geometry": { "location": { "lat": 19.02, "lng": 72.85 } } }
            ]
        }"#;

        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Government Polytechnic");
    }

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let body = r#"[
            { "name": "No position at all" },
            { "geometry": { "location": { "lat": 19.0, "lng": 72.0 } } },
            { "name": "Kept", "geometry": { "location": { "lat": 19.0, "lng": 72.0 } } }
        ]"#;

        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Kept");
    }

    #[test]
    fn test_parse_drops_out_of_range_rating() {
        let body = r#"[
            { "name": "A", "rating": 9.8, "geometry": { "location": { "lat": 19.0, "lng": 72.0 } } }
        ]"#;

        let places = parse_places(body).unwrap();
        assert_eq!(places[0].rating, None);
    }

    #[test]
    fn test_parse_rejects_unexpected_payload() {
        assert!(parse_places("\"not places\"").is_err());
        assert!(parse_places(r#"{"error": "Failed to fetch locations"}"#).is_err());
        assert!(parse_places("not json at all").is_err());
    }

    #[test]
    fn test_rank_orders_ascending() {
        // Pure northward offsets: 0.0108 deg of latitude is about 1.2 km,
        // 0.0306 deg about 3.4 km.
        let places = vec![
            create_test_place("Far", 19.1066, 72.8777),
            create_test_place("Near", 19.0868, 72.8777),
        ];

        let ranked = ResultSet::rank(places, ORIGIN);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.get(0).unwrap().place.name, "Near");
        assert_eq!(ranked.get(1).unwrap().place.name, "Far");

        let near = ranked.get(0).unwrap().distance_km.unwrap();
        let far = ranked.get(1).unwrap().distance_km.unwrap();
        assert!((near - 1.2).abs() < 0.05, "got {near}");
        assert!((far - 3.4).abs() < 0.05, "got {far}");
    }

    #[test]
    fn test_rank_puts_unrankable_last() {
        let places = vec![
            create_test_place("Nowhere", 999.0, 72.8777),
            create_test_place("Near", 19.0868, 72.8777),
        ];

        let ranked = ResultSet::rank(places, ORIGIN);
        assert_eq!(ranked.get(0).unwrap().place.name, "Near");
        assert_eq!(ranked.get(1).unwrap().place.name, "Nowhere");
        assert_eq!(ranked.get(1).unwrap().distance_km, None);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let places = vec![
            create_test_place("First", 19.0868, 72.8777),
            create_test_place("Second", 19.0868, 72.8777),
            create_test_place("Third", 19.0868, 72.8777),
        ];

        let ranked = ResultSet::rank(places, ORIGIN);
        let names: Vec<&str> = ranked
            .iter()
            .map(|entry| entry.place.name.as_str())
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn test_rank_replaces_wholesale() {
        let first = ResultSet::rank(vec![create_test_place("A", 19.0868, 72.8777)], ORIGIN);
        let second = ResultSet::rank(vec![create_test_place("B", 19.1066, 72.8777)], ORIGIN);

        // Each ranking is an independent set; nothing is merged.
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first.get(0).unwrap().place.name, "A");
        assert_eq!(second.get(0).unwrap().place.name, "B");
        assert_eq!(first.origin(), second.origin());
    }
}
