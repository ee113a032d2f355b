//! Wires a [`BusinessResolver`] from [`AppConfig`].

use std::sync::Arc;

use chrono::Utc;
use kainan_core::{AppConfig, ConfigError};
use kainan_db::{DbError, PoolConfig};
use kainan_places::{PlacesClient, PlacesError};
use sqlx::PgPool;
use thiserror::Error;

use crate::providers::{PgBusinessStore, RemoteDirectoryProvider, StaticFixtureProvider};
use crate::resolver::{BusinessResolver, ResolverConfig};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to build places client: {0}")]
    Places(#[from] PlacesError),

    #[error("failed to configure database pool: {0}")]
    Database(#[from] DbError),

    #[error("failed to load fixtures: {0}")]
    Fixtures(#[from] ConfigError),
}

/// The resolver plus the pool behind its store, so callers can run
/// migrations or health checks against the same connections.
pub struct ResolverBundle {
    pub resolver: BusinessResolver,
    pub pool: Option<PgPool>,
}

/// Builds every enabled provider. The pool connects lazily, so a database
/// that is down at startup shows up as per-call store failures.
///
/// # Errors
///
/// Returns [`BootstrapError`] when a provider cannot be constructed from the
/// configuration (bad API key header, unparseable database URL, invalid
/// fixtures file).
pub fn build_resolver(config: &AppConfig) -> Result<ResolverBundle, BootstrapError> {
    let mut resolver = BusinessResolver::new(ResolverConfig::from_app_config(config));
    let mut pool = None;

    if config.enable_remote_directory {
        match config.places_api_key.as_deref() {
            Some(api_key) => {
                let client = PlacesClient::new(
                    api_key,
                    config.http_timeout_secs,
                    &config.http_user_agent,
                )?
                .with_retry(config.http_max_retries, config.http_retry_backoff_base_ms);
                let remote = RemoteDirectoryProvider::new(
                    client,
                    config.search_center,
                    config.search_radius_m,
                );
                resolver = resolver.with_remote(Arc::new(remote));
            }
            None => tracing::warn!(
                "remote directory enabled but GOOGLE_PLACES_API_KEY is not set; skipping it"
            ),
        }
    }

    if config.enable_user_store {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(DbError::MissingDatabaseUrl)?;
        let pg = kainan_db::connect_pool_lazy(database_url, PoolConfig::from_app_config(config))
            .map_err(DbError::from)?;
        resolver = resolver.with_store(Arc::new(PgBusinessStore::new(pg.clone())));
        pool = Some(pg);
    }

    if config.enable_fixtures {
        let fixtures = match &config.fixtures_path {
            Some(path) => StaticFixtureProvider::from_file(path, Utc::now())?,
            None => StaticFixtureProvider::builtin(Utc::now())?,
        };
        resolver = resolver.with_fixtures(Arc::new(fixtures));
    }

    tracing::info!(
        providers = ?resolver.active_providers(),
        cache_remote_results = config.cache_remote_results,
        "business resolver configured"
    );

    Ok(ResolverBundle { resolver, pool })
}
