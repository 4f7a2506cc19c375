use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: Option<String>,
    pub database_path: Option<String>,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// How far back a 5-minute window may be offset, in minutes
    #[serde(default = "default_max_minute_offset")]
    pub max_minute_offset_minutes: i64,

    /// How far back an hourly window may be offset, in hours
    #[serde(default = "default_max_hour_offset")]
    pub max_hour_offset_hours: i64,

    /// Most buckets one window query may emit, at any width
    #[serde(default = "default_max_window_buckets")]
    pub max_window_buckets: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cache_max_entries() -> u64 {
    10000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_max_minute_offset() -> i64 {
    120
}

fn default_max_hour_offset() -> i64 {
    168
}

fn default_max_window_buckets() -> i64 {
    1000
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .add_source(
                Environment::with_prefix("LINKTALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
