//! UI panels for the application
//!
//! This module renders the results sidebar (ranked list, loading and error
//! presentation, tile provider switch) and the overlays drawn on top of the
//! map.

use crate::app::state::{AppState, TilesProvider};
use egui::{Color32, RichText, Ui};

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(
        button_rect,
        5.0, // rounding
        bg_color,
    );

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state);
            });
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state);
            });
    }
}

/// Render the sidebar content (shared between portrait and landscape)
fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("📍 Nearby Services").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⟳ Refresh").clicked() {
                state.refresh_requested = true;
            }
        });
    });

    ui.separator();

    // Persistent error banner, last message wins
    if let Some(message) = state.session.error() {
        ui.label(
            RichText::new(format!("⚠ {message}"))
                .strong()
                .color(Color32::RED),
        );
        ui.add_space(4.0);
    }

    if state.session.is_loading() || state.session.fetch_pending() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new("Loading nearby services...").color(ui.visuals().warn_fg_color),
            );
        });
        ui.add_space(4.0);
    }

    let has_origin = state.session.origin().is_some();
    let result_count = state.session.results().map(|results| results.len());

    match (has_origin, result_count) {
        (false, _) => {
            ui.label(RichText::new("Waiting for a position fix...").weak());
        }
        (true, None) => {}
        (true, Some(0)) => {
            ui.label(RichText::new("No services found within 5 km").weak());
        }
        (true, Some(_)) => render_results_list(ui, state),
    }

    ui.add_space(8.0);
    ui.separator();

    render_tiles_section(ui, state);
}

/// Render the ranked results, nearest first
fn render_results_list(ui: &mut Ui, state: &mut AppState) {
    let Some(results) = state.session.results() else {
        return;
    };
    let selected = state.session.selected();
    let route = state.session.route();

    // Leave room for the tiles section below the list
    let available_height = (ui.available_height() - 120.0).max(80.0);

    egui::ScrollArea::vertical()
        .id_salt("results_scroll")
        .max_height(available_height)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (index, entry) in results.iter().enumerate() {
                let is_selected = selected == Some(index);

                ui.horizontal(|ui| {
                    let name_label = ui
                        .selectable_label(is_selected, RichText::new(&entry.place.name).strong());
                    if name_label.clicked() {
                        state.pending_selection = Some(index);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        match entry.distance_km {
                            Some(km) => ui.label(RichText::new(format!("{km:.1} km")).strong()),
                            None => ui.label(RichText::new("n/a").weak()),
                        };
                    });
                });

                let mut meta: Vec<String> = Vec::new();
                if let Some(rating) = entry.place.rating {
                    meta.push(format!("★ {rating:.1}"));
                }
                if let Some(vicinity) = &entry.place.vicinity {
                    meta.push(vicinity.clone());
                }
                if !meta.is_empty() {
                    ui.label(RichText::new(meta.join("  ")).small().weak());
                }

                if is_selected && let Some(route) = route {
                    ui.label(
                        RichText::new(format!(
                            "🚗 {:.1} km, {:.0} min by road",
                            route.distance_m / 1000.0,
                            route.duration_s / 60.0
                        ))
                        .small(),
                    );
                }

                ui.add_space(6.0);
            }
        });
}

/// Render the tile provider switch with its attribution
fn render_tiles_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(4.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );
}

/// Centered overlay shown until a position fix arrives
pub fn acquiring_overlay(ui: &mut Ui) {
    let rect = ui.max_rect();
    let bg_size = egui::vec2(280.0, 56.0);
    let bg_rect = egui::Rect::from_center_size(rect.center(), bg_size);

    ui.painter()
        .rect_filled(bg_rect, 10.0, Color32::from_black_alpha(160));
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "📡 Acquiring location...",
        egui::FontId::proportional(16.0),
        Color32::WHITE,
    );
}
