//! Capability adapters wired to real services
//!
//! Position comes from IP geolocation (or a fixed CLI coordinate), places
//! from the location proxy, and driving routes from an OSRM-compatible
//! endpoint. Each adapter keeps the session-facing error contract: fetch
//! failures surface the proxy's user-facing message, route failures carry
//! detail for the log only.

use nearby_lib::{
    AcquireOptions, Coordinate, DirectionsSource, LocatorError, Place, PlaceSource, PositionError,
    PositionSource, RouteGeometry, RouteRequest, parse_places,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Per-request bound for proxy and directions calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The message shown for any places fetch failure, matching the proxy's own
/// error body
const FETCH_FAILED: &str = "Failed to fetch locations";

/// Position source backed by IP geolocation (the IpApi service)
///
/// An IP fix is city-level at best, so the high-accuracy and maximum-age
/// options are advisory here. The caller bounds the lookup with the timeout
/// from the same options.
pub struct IpPosition;

impl PositionSource for IpPosition {
    fn acquire(
        &self,
        _options: AcquireOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, PositionError>> + Send + '_>> {
        Box::pin(acquire_ip_position())
    }
}

async fn acquire_ip_position() -> Result<Coordinate, PositionError> {
    let located = ipgeolocate::Locator::get("", ipgeolocate::Service::IpApi)
        .await
        .map_err(|err| PositionError::Unavailable(err.to_string()))?;

    // The service reports coordinates as strings
    match (
        located.latitude.parse::<f64>(),
        located.longitude.parse::<f64>(),
    ) {
        (Ok(latitude), Ok(longitude)) => {
            tracing::info!(
                "IP geolocation fix near {}, {}",
                located.city,
                located.region
            );
            Ok(Coordinate::new(latitude, longitude))
        }
        _ => Err(PositionError::Unavailable(format!(
            "unparseable coordinates ({}, {})",
            located.latitude, located.longitude
        ))),
    }
}

/// Position source that resolves immediately to a CLI-supplied coordinate
pub struct FixedPosition(pub Coordinate);

impl PositionSource for FixedPosition {
    fn acquire(
        &self,
        _options: AcquireOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, PositionError>> + Send + '_>> {
        let position = self.0;
        Box::pin(async move { Ok(position) })
    }
}

/// Places source that queries the location proxy
pub struct ProxyPlaces {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyPlaces {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl PlaceSource for ProxyPlaces {
    fn nearby(
        &self,
        origin: Coordinate,
    ) -> Pin<Box<dyn Future<Output = nearby_lib::Result<Vec<Place>>> + Send + '_>> {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, nearby_proxy::PLACES_PATH))
            .query(&[("lat", origin.latitude), ("lng", origin.longitude)])
            .timeout(REQUEST_TIMEOUT);
        Box::pin(fetch_places(request))
    }
}

async fn fetch_places(request: reqwest::RequestBuilder) -> nearby_lib::Result<Vec<Place>> {
    let response = request.send().await.map_err(|err| {
        tracing::warn!("Proxy request failed: {err}");
        LocatorError::Places(FETCH_FAILED.to_string())
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        tracing::warn!("Proxy response read failed: {err}");
        LocatorError::Places(FETCH_FAILED.to_string())
    })?;

    if !status.is_success() {
        tracing::warn!("Proxy returned status {status}: {body}");
        return Err(LocatorError::Places(proxy_error_message(&body)));
    }

    parse_places(&body).map_err(|err| {
        tracing::warn!("Places payload parse failed: {err}");
        LocatorError::Places(FETCH_FAILED.to_string())
    })
}

/// Prefer the proxy's structured error body, which carries the user-facing
/// message
fn proxy_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(String::from))
        .unwrap_or_else(|| FETCH_FAILED.to_string())
}

/// Directions source backed by an OSRM-compatible routing service
pub struct OsrmDirections {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmDirections {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl DirectionsSource for OsrmDirections {
    fn route(
        &self,
        request: RouteRequest,
    ) -> Pin<Box<dyn Future<Output = nearby_lib::Result<RouteGeometry>> + Send + '_>> {
        let http_request = self
            .client
            .get(route_url(&self.base_url, request))
            .timeout(REQUEST_TIMEOUT);
        Box::pin(fetch_route(http_request))
    }
}

/// OSRM route URL for the fixed driving profile; coordinates go lon,lat
fn route_url(base_url: &str, request: RouteRequest) -> String {
    format!(
        "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
        base_url,
        request.origin.longitude,
        request.origin.latitude,
        request.destination.longitude,
        request.destination.latitude,
    )
}

#[derive(serde::Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(serde::Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

/// GeoJSON LineString geometry as returned with `geometries=geojson`
#[derive(serde::Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

async fn fetch_route(request: reqwest::RequestBuilder) -> nearby_lib::Result<RouteGeometry> {
    let response = request
        .send()
        .await
        .map_err(|err| LocatorError::Directions(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LocatorError::Directions(format!("status {status}")));
    }

    let payload: OsrmResponse = response
        .json()
        .await
        .map_err(|err| LocatorError::Directions(err.to_string()))?;

    route_from_payload(payload)
}

fn route_from_payload(payload: OsrmResponse) -> nearby_lib::Result<RouteGeometry> {
    if payload.code != "Ok" {
        return Err(LocatorError::Directions(payload.code));
    }
    let Some(route) = payload.routes.into_iter().next() else {
        return Err(LocatorError::Directions("no route found".to_string()));
    };

    let coords = route
        .geometry
        .coordinates
        .iter()
        .map(|&[x, y]| geo::Coord { x, y })
        .collect();

    Ok(RouteGeometry {
        geometry: geo::LineString::new(coords),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}
