//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::traffic::GeoPoint;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === TomTom Credentials ===
    /// TomTom API key sent as the `key` query parameter.
    #[serde(default)]
    pub tomtom_api_key: String,

    /// Flow-segment-by-point endpoint.
    #[serde(default = "default_flow_url")]
    pub tomtom_flow_url: String,

    // === Upstream HTTP ===
    /// Per-call timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub http_connect_timeout_ms: u64,

    /// Idle connections kept per host.
    #[serde(default = "default_pool_size")]
    pub http_pool_size: usize,

    /// Upstream calls allowed in flight for a single inbound request.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    // === Query Defaults ===
    /// Latitude used when the request omits `lat`.
    #[serde(default = "default_lat")]
    pub default_lat: f64,

    /// Longitude used when the request omits `lon`.
    #[serde(default = "default_lon")]
    pub default_lon: f64,

    // === Server Configuration ===
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,
}

fn default_flow_url() -> String {
    "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json".to_string()
}

fn default_http_timeout_ms() -> u64 {
    3000
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_pool_size() -> usize {
    10
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_lat() -> f64 {
    12.9716
}

fn default_lon() -> f64 {
    77.5946
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tomtom_api_key: String::new(),
            tomtom_flow_url: default_flow_url(),
            http_timeout_ms: default_http_timeout_ms(),
            http_connect_timeout_ms: default_connect_timeout_ms(),
            http_pool_size: default_pool_size(),
            max_concurrent_requests: default_max_concurrent_requests(),
            default_lat: default_lat(),
            default_lon: default_lon(),
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tomtom_api_key.trim().is_empty() {
            return Err("TOMTOM_API_KEY is required".to_string());
        }

        match url::Url::parse(&self.tomtom_flow_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(format!(
                    "TOMTOM_FLOW_URL must be http(s), got scheme '{}'",
                    parsed.scheme()
                ));
            }
            Err(e) => return Err(format!("TOMTOM_FLOW_URL is not a valid URL: {}", e)),
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.max_concurrent_requests == 0 {
            return Err("MAX_CONCURRENT_REQUESTS must be at least 1".to_string());
        }

        if !self.default_center().is_valid() {
            return Err(format!(
                "DEFAULT_LAT/DEFAULT_LON out of range: {}",
                self.default_center()
            ));
        }

        Ok(())
    }

    /// Center used when a request does not supply coordinates.
    pub fn default_center(&self) -> GeoPoint {
        GeoPoint::new(self.default_lat, self.default_lon)
    }

    /// Address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
