//! Location Proxy - Credentialed Relay for the Nearby-Search API
//!
//! The locator client never talks to the places service directly: this proxy
//! holds the API credential and exposes a single uncredentialed endpoint,
//! `GET /api/places?lat=<v>&lng=<v>`, that relays the upstream nearby search
//! at a fixed radius and category filter. It runs standalone (see `main.rs`)
//! or embedded in the application process via [`ProxyServer::spawn`].
//!
//! # Architecture
//!
//! - **[`NearbySearch`]**: the upstream capability the handler is written
//!   against; [`PlacesApi`] is the production implementation
//! - **[`handle_request`]**: the pure endpoint contract, unit-tested with a
//!   stub upstream
//! - **[`ProxyServer`]**: background-thread HTTP/1.1 responder with a
//!   non-blocking accept loop and channel shutdown

mod server;
mod upstream;

// Public API exports
pub use server::{HttpResponse, PLACES_PATH, ProxyServer, handle_request};
pub use upstream::{
    CATEGORY_FILTER, DEFAULT_BASE_URL, NearbySearch, PlacesApi, SEARCH_RADIUS_METERS,
    UpstreamError,
};

/// Error types for the proxy crate
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("No places API credential: pass --api-key or set PLACES_API_KEY")]
    MissingCredential,

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
