//! Standalone entry point for the location proxy

use clap::Parser;
use nearby_proxy::{DEFAULT_BASE_URL, PlacesApi, ProxyError, ProxyServer};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Location proxy for the nearby services locator
pub struct Settings {
    /// Address to listen on
    #[clap(short, long, default_value = "127.0.0.1:3001")]
    pub listen: String,

    /// Places API credential, falling back to the PLACES_API_KEY environment
    /// variable
    #[clap(short, long)]
    pub api_key: Option<String>,

    /// Upstream places API host
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

fn main() -> ExitCode {
    setup_logging();

    let settings = Settings::parse();
    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: Settings) -> nearby_proxy::Result<()> {
    let api_key = settings
        .api_key
        .or_else(|| std::env::var("PLACES_API_KEY").ok())
        .filter(|key| !key.is_empty())
        .ok_or(ProxyError::MissingCredential)?;

    let upstream = PlacesApi::with_base_url(api_key, &settings.base_url)?;
    let _server = ProxyServer::spawn(&settings.listen, Arc::new(upstream))?;

    // Serve until the process is interrupted
    loop {
        std::thread::park();
    }
}

/// Initialize tracing with an env-filtered fmt subscriber
fn setup_logging() {
    use tracing_subscriber::prelude::*;

    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::EnvFilter::from_default_env());
    tracing_subscriber::registry().with(fmt_layer).init();
}
