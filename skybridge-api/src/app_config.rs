use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub round_trip: RoundTripConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// The MakerSuite-family APIs: booking creation and one-way flight search
/// share a base URL and an ApiKey header.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub booking_endpoint: String,
    pub flight_search_endpoint: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoundTripConfig {
    /// How long an unpaired first leg is held before the opportunistic
    /// sweep discards it.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_seconds: u64,
    /// Whether the first-arriving leg of a pair is the return or the
    /// depart leg. "return" per the current sender contract.
    #[serde(default = "default_first_arrival")]
    pub first_arrival: String,
}

fn default_pending_ttl() -> u64 {
    3600
}

fn default_first_arrival() -> String {
    "return".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Then the environment-specific file, if present
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Then a local file that shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Finally env overrides, e.g. SKYBRIDGE__SERVER__PORT=8000
            .add_source(config::Environment::with_prefix("SKYBRIDGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
