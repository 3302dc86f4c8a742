//! Nearby Locator - Application Library
//!
//! This is the main application crate that wires the headless locator core
//! (`nearby-lib`) to the map UI: capability adapters for position, places and
//! directions, the egui/eframe application itself, and the native entry point.

mod app;
pub mod metadata;
pub mod run;

pub use app::NearbyLocatorApp;
