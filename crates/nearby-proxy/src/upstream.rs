//! Upstream nearby-search client
//!
//! The proxy fronts a places nearby-search HTTP API. The search parameters
//! other than the origin are fixed: a 5 km radius and the public-service
//! category filter. The API credential never leaves this side of the proxy.

use std::time::Duration;

/// Fixed search radius around the requested origin, in meters
pub const SEARCH_RADIUS_METERS: u32 = 5000;

/// Fixed category filter for the nearby search
pub const CATEGORY_FILTER: &str = "school|university|college|local_government_office";

/// Default upstream host serving the nearby-search API
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors talking to the upstream search service
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Upstream payload was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The nearby-search capability the request handler is written against
///
/// Coordinates are relayed as the strings received from the client; the
/// upstream rejects garbage and the proxy maps any upstream failure to its
/// single 500 response.
pub trait NearbySearch: Send + Sync + 'static {
    fn nearby(&self, lat: &str, lng: &str) -> Result<String, UpstreamError>;
}

/// Blocking HTTP client for the places nearby-search API
pub struct PlacesApi {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl PlacesApi {
    /// Create a client against the default upstream host
    pub fn new(api_key: String) -> Result<Self, UpstreamError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a specific upstream host
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build the upstream request URL for an origin
    fn request_url(&self, lat: &str, lng: &str) -> String {
        format!(
            "{}/maps/api/place/nearbysearch/json?location={lat},{lng}&radius={SEARCH_RADIUS_METERS}&type={CATEGORY_FILTER}&key={}",
            self.base_url, self.api_key
        )
    }
}

impl NearbySearch for PlacesApi {
    fn nearby(&self, lat: &str, lng: &str) -> Result<String, UpstreamError> {
        tracing::debug!("Nearby search around ({lat}, {lng})");

        let response = self.client.get(self.request_url(lat, lng)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.text()?;
        extract_results(&body)
    }
}

/// Reduce the upstream response to the payload the client consumes
///
/// An object payload is unwrapped to its `results` value when one is present
/// and non-null; anything else is relayed whole. The output is re-serialized
/// JSON, so a malformed upstream body fails here rather than at the client.
fn extract_results(body: &str) -> Result<String, UpstreamError> {
    let payload: serde_json::Value = serde_json::from_str(body)?;

    let relayed = match payload {
        serde_json::Value::Object(mut object) => match object.remove("results") {
            Some(results) if !results.is_null() => results,
            Some(null_results) => {
                // Mirror null-coalescing: a null results value falls back to
                // relaying the whole payload, results key included.
                object.insert("results".to_string(), null_results);
                serde_json::Value::Object(object)
            }
            None => serde_json::Value::Object(object),
        },
        other => other,
    };

    Ok(serde_json::to_string(&relayed)?)
}
