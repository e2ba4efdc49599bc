/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Base URL of the PostgREST service fronting the LST database.
    pub postgrest_url: String,
    /// Allowed browser origin for CORS.
    pub cors_origin: String,
    pub nominatim_url: String,
    pub photon_url: String,
    pub bigdatacloud_url: String,
    /// User-Agent sent to geocoding providers (Nominatim rejects anonymous clients).
    pub geocoder_user_agent: String,
    /// Per-attempt timeout for a geocoding provider call.
    pub geocode_timeout_secs: u64,
    /// Retries per geocoding provider after the first attempt.
    pub geocode_retries: u32,
    /// Delay between successive geocoding chains when resolving a list of areas.
    pub geocode_pacing_ms: u64,
    /// Optional Google Maps Embed API key; without it the keyless embed URL is used.
    pub google_maps_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            postgrest_url: std::env::var("POSTGREST_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
            nominatim_url: std::env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            photon_url: std::env::var("PHOTON_URL")
                .unwrap_or_else(|_| "https://photon.komoot.io".to_string()),
            bigdatacloud_url: std::env::var("BIGDATACLOUD_URL")
                .unwrap_or_else(|_| "https://api.bigdatacloud.net".to_string()),
            geocoder_user_agent: std::env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "ClimateFarm/0.1 (educational climate farming game)".to_string()),
            geocode_timeout_secs: std::env::var("GEOCODE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("GEOCODE_TIMEOUT_SECS must be a valid u64"),
            geocode_retries: std::env::var("GEOCODE_RETRIES")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .expect("GEOCODE_RETRIES must be a valid u32"),
            geocode_pacing_ms: std::env::var("GEOCODE_PACING_MS")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .expect("GEOCODE_PACING_MS must be a valid u64"),
            google_maps_api_key: std::env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // set_var/remove_var race with other tests reading the environment;
        // this is the only test in the crate that touches these variables.
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("POSTGREST_URL");
            std::env::remove_var("CORS_ORIGIN");
            std::env::remove_var("GEOCODE_TIMEOUT_SECS");
            std::env::remove_var("GEOCODE_RETRIES");
            std::env::remove_var("GEOCODE_PACING_MS");
            std::env::remove_var("GOOGLE_MAPS_API_KEY");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.port, 3000);
        assert_eq!(config.postgrest_url, "http://localhost:3001");
        assert_eq!(config.cors_origin, "http://localhost:4200");
        assert_eq!(config.geocode_timeout_secs, 5);
        assert_eq!(config.geocode_retries, 1);
        assert_eq!(config.geocode_pacing_ms, 200);
        assert!(config.geocoder_user_agent.contains("ClimateFarm"));
        assert!(config.google_maps_api_key.is_none());
    }
}
