//! Application state management
//!
//! This module wraps the headless locator session together with UI settings,
//! the outcome slots spawned tasks deposit into, and the embedded proxy
//! handle.

use crate::app::settings::Settings;
use nearby_lib::{Coordinate, LocatorSession, Place, PositionError, RouteGeometry};
use nearby_proxy::{PlacesApi, ProxyServer};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Slot written once by a spawned task and drained by the frame loop
pub type OutcomeSlot<T> = Arc<Mutex<Option<T>>>;

/// Main application state
pub struct AppState {
    /// Core pipeline state, mutated only on the UI thread
    pub session: LocatorSession,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Position acquisition outcome, deposited by the acquire task
    pub position_outcome: OutcomeSlot<Result<Coordinate, PositionError>>,

    /// Places fetch outcome, keyed by the job sequence number
    pub fetch_outcome: OutcomeSlot<(u64, nearby_lib::Result<Vec<Place>>)>,

    /// Route outcome, keyed by the job sequence number
    pub route_outcome: OutcomeSlot<(u64, nearby_lib::Result<RouteGeometry>)>,

    /// Marker index clicked on the map, written by the places plugin
    pub marker_clicks: Arc<Mutex<Option<usize>>>,

    /// Result index clicked in the sidebar list this frame
    pub pending_selection: Option<usize>,

    /// Whether the refresh button asked for a new fetch this frame
    pub refresh_requested: bool,

    /// Whether the one-shot position acquisition has been spawned
    pub acquisition_started: bool,

    /// Whether the map still has to zoom in on the first position fix
    pub pending_center: bool,

    /// Embedded location proxy, kept alive for the app lifetime
    pub embedded_proxy: Option<ProxyServer>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    pub fn from_cli_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "opentopomap" | "otm" => Self::OpenTopoMap,
            _ => Self::OpenStreetMap,
        }
    }
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        let ui_settings = UiSettings {
            tiles_provider: TilesProvider::from_cli_name(&settings.tiles),
            sidebar_open: true,
        };

        Self {
            session: LocatorSession::new(Duration::from_millis(settings.debounce_ms)),
            ui_settings,
            position_outcome: Arc::new(Mutex::new(None)),
            fetch_outcome: Arc::new(Mutex::new(None)),
            route_outcome: Arc::new(Mutex::new(None)),
            marker_clicks: Arc::new(Mutex::new(None)),
            pending_selection: None,
            refresh_requested: false,
            acquisition_started: false,
            pending_center: true,
            embedded_proxy: None,
        }
    }

    /// Resolve the places endpoint to fetch through
    ///
    /// An external proxy URL wins when configured; otherwise an embedded proxy
    /// is started with the resolved credential. Returns `None`, with the
    /// reason placed in the user-visible error slot, when neither is possible.
    pub fn resolve_proxy(&mut self, settings: &Settings) -> Option<String> {
        if let Some(url) = &settings.proxy_url {
            tracing::info!("Using external location proxy at {url}");
            return Some(url.trim_end_matches('/').to_string());
        }

        let Some(api_key) = settings.resolved_api_key() else {
            self.session
                .report_error("No places API credential: pass --api-key or set PLACES_API_KEY");
            return None;
        };

        let upstream = match PlacesApi::new(api_key) {
            Ok(upstream) => upstream,
            Err(err) => {
                tracing::error!("Failed to build the upstream places client: {err}");
                self.session.report_error("Failed to fetch locations");
                return None;
            }
        };

        match ProxyServer::spawn(&settings.proxy_listen, Arc::new(upstream)) {
            Ok(proxy) => {
                let base_url = proxy.base_url();
                self.embedded_proxy = Some(proxy);
                Some(base_url)
            }
            Err(err) => {
                tracing::error!("Failed to start the embedded location proxy: {err}");
                self.session
                    .report_error(format!("Failed to start the location proxy: {err}"));
                None
            }
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
        }
    }
}
