//! Application module
//!
//! This module provides the main application structure with a clean UI:
//! - Full-screen map view with place markers and the driving-route overlay
//! - Toggleable sidebar with the ranked results list
//! - Responsive layout (sidebar from bottom on portrait displays)
//!
//! The frame loop is the only place locator state is mutated: spawned tasks
//! deposit their outcomes into slots that `update` drains, then the debounce
//! gate is polled and any released job is spawned.

mod plugin;
pub(crate) mod settings;
mod sources;
mod state;
mod ui_panels;

use crate::app::plugin::{PlacesPlugin, RoutePlugin};
use crate::app::settings::Settings;
use crate::app::sources::{FixedPosition, IpPosition, OsrmDirections, ProxyPlaces};
use crate::app::state::{AppState, TilesProvider};
use eframe::egui;
use nearby_lib::{
    AcquireOptions, Coordinate, DirectionsSource, PlaceSource, PositionError, PositionSource,
};
use std::sync::Arc;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Zoom applied once the first position fix arrives
const INITIAL_ZOOM: f64 = 15.0;

/// Main application structure
pub struct NearbyLocatorApp {
    /// Application state (session, UI settings, outcome slots)
    state: AppState,

    /// Position capability (IP geolocation or a fixed CLI coordinate)
    position_source: Arc<dyn PositionSource>,

    /// Places capability (through the location proxy), when one resolved
    place_source: Option<Arc<dyn PlaceSource>>,

    /// Directions capability (OSRM driving profile)
    directions_source: Arc<dyn DirectionsSource>,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,
}

impl NearbyLocatorApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut state = AppState::new(&cli_args);

        let position_source: Arc<dyn PositionSource> = match cli_args.fixed_position() {
            Some((latitude, longitude)) => {
                tracing::info!("Using fixed position ({latitude}, {longitude})");
                Arc::new(FixedPosition(Coordinate::new(latitude, longitude)))
            }
            None => Arc::new(IpPosition),
        };

        let place_source = state
            .resolve_proxy(&cli_args)
            .map(|base_url| Arc::new(ProxyPlaces::new(&base_url)) as Arc<dyn PlaceSource>);

        let directions_source: Arc<dyn DirectionsSource> =
            Arc::new(OsrmDirections::new(&cli_args.directions_url));

        // Create tiles providers
        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        // Create map memory with default settings
        let map_memory = MapMemory::default();

        Self {
            state,
            position_source,
            place_source,
            directions_source,
            tiles_osm,
            tiles_otm,
            map_memory,
        }
    }

    /// Kick off the one-shot position acquisition on the first frame
    fn start_acquisition(&mut self, ctx: &egui::Context) {
        if self.state.acquisition_started {
            return;
        }
        self.state.acquisition_started = true;

        let source = self.position_source.clone();
        let slot = self.state.position_outcome.clone();
        let ctx = ctx.clone();
        let options = AcquireOptions::default();
        tokio::spawn(async move {
            // The timeout bound applies to every source, not just IP lookup
            let outcome = match tokio::time::timeout(options.timeout, source.acquire(options)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(PositionError::Timeout),
            };
            *slot.lock().unwrap() = Some(outcome);
            ctx.request_repaint();
        });
    }

    /// Apply outcomes deposited by spawned tasks since the last frame
    fn drain_outcomes(&mut self, now: instant::Instant) {
        let position = self.state.position_outcome.lock().unwrap().take();
        if let Some(outcome) = position {
            match outcome {
                Ok(position) => {
                    tracing::info!("Position fix at {position}");
                    self.state
                        .session
                        .request_fetch(position.latitude, position.longitude, now);
                }
                Err(err) => {
                    tracing::warn!("Position acquisition failed: {err}");
                    self.state.session.report_error(err.to_string());
                }
            }
        }

        let fetch = self.state.fetch_outcome.lock().unwrap().take();
        if let Some((seq, outcome)) = fetch {
            self.state.session.complete_fetch(seq, outcome);
        }

        let route = self.state.route_outcome.lock().unwrap().take();
        if let Some((seq, outcome)) = route {
            self.state.session.complete_route(seq, outcome);
        }
    }

    /// Re-run the nearby search around the current origin
    fn apply_refresh(&mut self, now: instant::Instant) {
        if !self.state.refresh_requested {
            return;
        }
        self.state.refresh_requested = false;

        if let Some(origin) = self.state.session.origin() {
            self.state
                .session
                .request_fetch(origin.latitude, origin.longitude, now);
        }
    }

    /// Apply a selection made through the list or a map marker
    fn apply_selection(&mut self, ctx: &egui::Context) {
        let marker_click = self.state.marker_clicks.lock().unwrap().take();
        if let Some(index) = marker_click {
            self.state.pending_selection = Some(index);
        }

        let Some(index) = self.state.pending_selection.take() else {
            return;
        };
        let Some(job) = self.state.session.select(index) else {
            return;
        };

        tracing::debug!("Requesting route to result {index} (seq {})", job.seq);
        let source = self.directions_source.clone();
        let slot = self.state.route_outcome.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let outcome = source.route(job.request).await;
            *slot.lock().unwrap() = Some((job.seq, outcome));
            ctx.request_repaint();
        });
    }

    /// Release the debounce gate and launch the fetch it yields, if any
    fn poll_fetch(&mut self, now: instant::Instant, ctx: &egui::Context) {
        let Some(source) = &self.place_source else {
            return;
        };
        let Some(job) = self.state.session.poll_fetch(now) else {
            return;
        };

        tracing::debug!("Fetching places around {} (seq {})", job.origin, job.seq);
        let source = source.clone();
        let slot = self.state.fetch_outcome.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let outcome = source.nearby(job.origin).await;
            *slot.lock().unwrap() = Some((job.seq, outcome));
            ctx.request_repaint();
        });
    }

    /// Zoom in once the first position fix arrives
    ///
    /// The camera itself follows the fix through the map's position argument,
    /// so no explicit centering is needed here.
    fn center_on_first_fix(&mut self) {
        if !self.state.pending_center {
            return;
        }
        if let Some(origin) = self.state.session.origin() {
            self.state.pending_center = false;
            let _ = self.map_memory.set_zoom(INITIAL_ZOOM);
            tracing::debug!("Map centered on {origin}");
        }
    }
}

#[profiling::all_functions]
impl eframe::App for NearbyLocatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = instant::Instant::now();

        self.start_acquisition(ctx);
        self.drain_outcomes(now);
        self.apply_refresh(now);
        self.apply_selection(ctx);
        self.poll_fetch(now, ctx);
        self.center_on_first_fix();

        // Render the sidebar (responsive: side or bottom based on orientation)
        ui_panels::render_sidebar(ctx, &mut self.state);

        // Capture values we need before the closure
        let origin = self.state.session.origin();
        let selected = self.state.session.selected();
        let route = self.state.session.route().cloned();
        let markers: Vec<Coordinate> = self
            .state
            .session
            .results()
            .map(|results| results.iter().map(|entry| entry.place.position).collect())
            .unwrap_or_default();
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = self.state.ui_settings.tiles_provider.attribution();
        let marker_clicks = self.state.marker_clicks.clone();

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let places_plugin = PlacesPlugin::new(origin, markers, selected, marker_clicks);

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let my_position = match origin {
                    Some(origin) => walkers::lat_lon(origin.latitude, origin.longitude),
                    None => walkers::lat_lon(0.0, 0.0),
                };

                let mut map =
                    Map::new(Some(tiles), &mut self.map_memory, my_position).with_plugin(places_plugin);
                if let Some(route) = route {
                    map = map.with_plugin(RoutePlugin::new(route, 4.0));
                }

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                if origin.is_none() {
                    ui_panels::acquiring_overlay(ui);
                }

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // The debounce gate is time-driven and the indicators animate, so keep
        // frames coming while anything is outstanding; spawned tasks request
        // their own repaint when they deposit an outcome.
        if self.state.session.fetch_pending() || self.state.session.is_loading() || origin.is_none()
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
