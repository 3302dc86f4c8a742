//! Native entry point and logging setup

/// Initialize the tracing subscriber
///
/// This must run before any logging so every layer lands in the same
/// subscriber.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            // Nicer default logs
            std::env::set_var("RUST_LOG", "info,wgpu_hal=warn,eframe=warn");
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::EnvFilter::from_default_env());

    tracing_subscriber::registry().with(fmt_layer).init();
}

/// Entry point for desktop platforms
pub async fn native_main(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) {
    setup_logging();

    crate::metadata::log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    let _ = eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    );
}
