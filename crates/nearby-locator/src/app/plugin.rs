//! Walkers plugins for place markers and the route overlay
//!
//! The markers plugin draws the user position and one marker per ranked
//! place, and reports marker clicks back through a shared slot that the frame
//! loop drains. The route plugin draws the active driving route as a
//! polyline.

use egui::{Color32, Stroke};
use nearby_lib::{Coordinate, RouteGeometry};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Marker radius in pixels
const MARKER_RADIUS: f32 = 7.0;

/// Extra pixels around a marker that still count as a hit
const CLICK_SLOP: f32 = 4.0;

/// Plugin for rendering place markers and the user position on the map
pub struct PlacesPlugin {
    origin: Option<Coordinate>,
    markers: Vec<Coordinate>,
    selected: Option<usize>,
    /// Clicked marker index, drained by the frame loop
    clicked: Arc<Mutex<Option<usize>>>,
}

impl PlacesPlugin {
    pub fn new(
        origin: Option<Coordinate>,
        markers: Vec<Coordinate>,
        selected: Option<usize>,
        clicked: Arc<Mutex<Option<usize>>>,
    ) -> Self {
        Self {
            origin,
            markers,
            selected,
            clicked,
        }
    }
}

impl Plugin for PlacesPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("PlacesPlugin::run");

        let painter = ui.painter();

        // User position: a filled dot with a white ring
        if let Some(origin) = self.origin {
            let center = to_screen(projector, origin);
            painter.circle_filled(center, 6.0, Color32::from_rgb(30, 110, 230));
            painter.circle_stroke(center, 6.0, Stroke::new(2.0, Color32::WHITE));
        }

        let mut screen_markers = Vec::with_capacity(self.markers.len());
        for (index, position) in self.markers.iter().enumerate() {
            let center = to_screen(projector, *position);
            screen_markers.push(center);

            let (radius, fill) = if self.selected == Some(index) {
                (MARKER_RADIUS + 2.0, Color32::from_rgb(220, 60, 50))
            } else {
                (MARKER_RADIUS, Color32::from_rgb(235, 130, 50))
            };
            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, Stroke::new(1.5, Color32::WHITE));
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(index) = hit_test(&screen_markers, pointer)
        {
            *self.clicked.lock().unwrap() = Some(index);
        }
    }
}

/// Index of the marker hit by the pointer; the last-drawn (topmost) one wins
/// when several overlap
fn hit_test(markers: &[egui::Pos2], pointer: egui::Pos2) -> Option<usize> {
    markers
        .iter()
        .enumerate()
        .rev()
        .find(|(_, center)| center.distance(pointer) <= MARKER_RADIUS + CLICK_SLOP)
        .map(|(index, _)| index)
}

fn to_screen(projector: &Projector, position: Coordinate) -> egui::Pos2 {
    let screen_vec = projector.project(walkers::lat_lon(position.latitude, position.longitude));
    egui::Pos2::new(screen_vec.x, screen_vec.y)
}

/// Plugin for rendering the active driving route
pub struct RoutePlugin {
    route: RouteGeometry,
    width: f32,
}

impl RoutePlugin {
    pub fn new(route: RouteGeometry, width: f32) -> Self {
        Self { route, width }
    }
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutePlugin::run");

        let stroke = Stroke::new(self.width, Color32::from_rgb(70, 130, 220));

        // Convert WGS84 coordinates to screen space
        let screen_points: Vec<egui::Pos2> = self
            .route
            .geometry
            .points()
            .map(|point| {
                let position = walkers::lat_lon(point.y(), point.x());
                let screen_vec = projector.project(position);
                egui::Pos2::new(screen_vec.x, screen_vec.y)
            })
            .collect();

        // Draw the polyline if we have at least 2 points
        if screen_points.len() >= 2 {
            ui.painter().add(egui::Shape::line(screen_points, stroke));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test_within_slop() {
        let markers = vec![egui::Pos2::new(100.0, 100.0)];
        assert_eq!(
            hit_test(&markers, egui::Pos2::new(100.0 + MARKER_RADIUS, 100.0)),
            Some(0)
        );
        assert_eq!(hit_test(&markers, egui::Pos2::new(130.0, 100.0)), None);
    }

    #[test]
    fn test_hit_test_topmost_marker_wins() {
        let markers = vec![
            egui::Pos2::new(100.0, 100.0),
            egui::Pos2::new(102.0, 100.0),
        ];
        assert_eq!(hit_test(&markers, egui::Pos2::new(101.0, 100.0)), Some(1));
    }
}
