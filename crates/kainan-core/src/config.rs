use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Kalibo town proper; the default centre for remote directory queries.
pub const DEFAULT_SEARCH_CENTER: Coordinate = Coordinate::new(11.6894, 122.3670);

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<f64>()
                .map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got '{raw}'"))
            }),
            Err(_) => Ok(default),
        }
    };

    let non_empty = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("KAINAN_ENV", "development"))?;
    let bind_addr = parse_addr("KAINAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("KAINAN_LOG_LEVEL", "info");

    let enable_remote_directory = parse_flag("KAINAN_ENABLE_REMOTE_DIRECTORY", true)?;
    let enable_user_store = parse_flag("KAINAN_ENABLE_USER_STORE", true)?;
    let enable_fixtures = parse_flag("KAINAN_ENABLE_FIXTURES", true)?;
    let cache_remote_results = parse_flag("KAINAN_CACHE_REMOTE_RESULTS", true)?;

    let database_url = non_empty("DATABASE_URL");
    if enable_user_store && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }
    let places_api_key = non_empty("GOOGLE_PLACES_API_KEY");

    let search_center = Coordinate::new(
        parse_f64("KAINAN_SEARCH_CENTER_LAT", DEFAULT_SEARCH_CENTER.latitude)?,
        parse_f64("KAINAN_SEARCH_CENTER_LNG", DEFAULT_SEARCH_CENTER.longitude)?,
    );
    search_center
        .validate()
        .map_err(|e| invalid("KAINAN_SEARCH_CENTER_LAT/KAINAN_SEARCH_CENTER_LNG", e.to_string()))?;
    let search_radius_m = parse_u32("KAINAN_SEARCH_RADIUS_M", "5000")?;
    if search_radius_m == 0 || search_radius_m > 50_000 {
        return Err(invalid(
            "KAINAN_SEARCH_RADIUS_M",
            format!("must be within 1..=50000 metres, got {search_radius_m}"),
        ));
    }
    let fixtures_path = non_empty("KAINAN_FIXTURES_PATH").map(PathBuf::from);

    let db_max_connections = parse_u32("KAINAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KAINAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KAINAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("KAINAN_HTTP_TIMEOUT_SECS", "15")?;
    let http_user_agent = or_default("KAINAN_HTTP_USER_AGENT", "kainan/0.1 (restaurant-discovery)");
    let http_max_retries = parse_u32("KAINAN_HTTP_MAX_RETRIES", "0")?;
    let http_retry_backoff_base_ms = parse_u64("KAINAN_HTTP_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        places_api_key,
        enable_remote_directory,
        enable_user_store,
        enable_fixtures,
        cache_remote_results,
        search_center,
        search_radius_m,
        fixtures_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KAINAN_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
