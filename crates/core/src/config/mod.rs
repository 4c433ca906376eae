//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ARAMAPS_*)
//! 2. TOML config file (if ARAMAPS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Name of the current cache generation. Bump it to invalidate every
/// previously cached entry.
pub const DEFAULT_CACHE_NAME: &str = "aramaps-v1";

/// Resources fetched and stored during install.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/manifest.json",
    "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.js",
    "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.css",
];

/// URL substrings marking vector tiles, glyph fonts and raster images.
pub const DEFAULT_ASSET_MARKERS: &[&str] = &[".pbf", ".ttf", ".png"];

/// Largest response body written to the cache by default.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ARAMAPS_*)
/// 2. TOML config file (if ARAMAPS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the current cache store.
    ///
    /// Set via ARAMAPS_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin of the map application; relative precache entries and tool
    /// URLs resolve against it.
    ///
    /// Set via ARAMAPS_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Precache manifest, in install order.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// URL substrings that make a successful miss eligible for caching.
    #[serde(default = "default_asset_markers")]
    pub asset_markers: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via ARAMAPS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via ARAMAPS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest response body written to the cache. Bigger asset responses
    /// are still returned, just not stored.
    ///
    /// Set via ARAMAPS_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Largest response body read from the network at all.
    ///
    /// Set via ARAMAPS_MAX_RESPONSE_BYTES environment variable.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ARAMAPS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.into()
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect()
}

fn default_asset_markers() -> Vec<String> {
    DEFAULT_ASSET_MARKERS.iter().map(|s| s.to_string()).collect()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./aramaps-cache.sqlite")
}

fn default_user_agent() -> String {
    "aramaps-cache/0.1".into()
}

fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

fn default_max_response_bytes() -> usize {
    256 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            origin: default_origin(),
            precache: default_precache(),
            asset_markers: default_asset_markers(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            max_response_bytes: default_max_response_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ARAMAPS_`
    /// 2. TOML file from `ARAMAPS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ARAMAPS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ARAMAPS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
