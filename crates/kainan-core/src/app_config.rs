use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Required only while the user content store is enabled.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub places_api_key: Option<String>,
    pub enable_remote_directory: bool,
    pub enable_user_store: bool,
    pub enable_fixtures: bool,
    pub cache_remote_results: bool,
    pub search_center: Coordinate,
    pub search_radius_m: u32,
    pub fixtures_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_ms: u64,
}

impl AppConfig {
    /// The remote directory is only usable when enabled *and* an API key is present.
    #[must_use]
    pub fn remote_directory_active(&self) -> bool {
        self.enable_remote_directory && self.places_api_key.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("enable_remote_directory", &self.enable_remote_directory)
            .field("enable_user_store", &self.enable_user_store)
            .field("enable_fixtures", &self.enable_fixtures)
            .field("cache_remote_results", &self.cache_remote_results)
            .field("search_center", &self.search_center)
            .field("search_radius_m", &self.search_radius_m)
            .field("fixtures_path", &self.fixtures_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_ms",
                &self.http_retry_backoff_base_ms,
            )
            .finish()
    }
}
