use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Nearby Locator - find schools, universities, colleges and government offices around you
pub struct Settings {
    /// Skip geolocation and use this fixed latitude
    #[clap(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Skip geolocation and use this fixed longitude
    #[clap(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Base URL of an already-running location proxy instead of the embedded one
    #[clap(long, value_name = "URL")]
    pub proxy_url: Option<String>,

    /// Places API credential for the embedded proxy (PLACES_API_KEY env works too)
    #[clap(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Bind address for the embedded location proxy
    #[clap(long, default_value = "127.0.0.1:0")]
    pub proxy_listen: String,

    /// Directions service base URL (OSRM-compatible)
    #[clap(long, default_value = "https://router.project-osrm.org", value_name = "URL")]
    pub directions_url: String,

    /// Map tiles provider at startup (openstreetmap or opentopomap)
    #[clap(long, default_value = "openstreetmap", value_name = "NAME")]
    pub tiles: String,

    /// Quiet window for position-driven fetches, in milliseconds
    #[clap(long, default_value = "500")]
    pub debounce_ms: u64,
}

impl Settings {
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// The credential for the embedded proxy, CLI flag first, then environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("PLACES_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }

    /// The fixed position override, once both halves were given
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lng?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_position_requires_both_coordinates() {
        let settings =
            Settings::try_parse_from(["nearby-locator", "--lat", "19.076", "--lng", "72.8777"])
                .unwrap();
        assert_eq!(settings.fixed_position(), Some((19.076, 72.8777)));

        assert!(Settings::try_parse_from(["nearby-locator", "--lat", "19.076"]).is_err());
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let settings =
            Settings::try_parse_from(["nearby-locator", "--lat", "-33.9", "--lng", "-70.6"])
                .unwrap();
        assert_eq!(settings.fixed_position(), Some((-33.9, -70.6)));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["nearby-locator"]).unwrap();
        assert_eq!(settings.fixed_position(), None);
        assert_eq!(settings.proxy_listen, "127.0.0.1:0");
        assert_eq!(settings.directions_url, "https://router.project-osrm.org");
        assert_eq!(settings.debounce_ms, 500);
    }
}
