//! In-memory fallback dataset. Read-only at runtime, so shared without locking.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kainan_core::{
    apply_search, load_fixtures, parse_fixtures, Business, ConfigError, FilterSupport,
    PageRequest, PagedResult, ProviderKind, SearchRequest,
};

use crate::error::ProviderError;
use crate::provider::BusinessProvider;

const BUILTIN_KALIBO: &str = include_str!("../../fixtures/kalibo.yaml");

#[derive(Debug, Clone)]
pub struct StaticFixtureProvider {
    businesses: Arc<[Business]>,
}

impl StaticFixtureProvider {
    /// The bundled Kalibo dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the bundled YAML fails validation.
    pub fn builtin(now: DateTime<Utc>) -> Result<Self, ConfigError> {
        Ok(Self::from_businesses(parse_fixtures(BUILTIN_KALIBO, now)?))
    }

    /// A dataset loaded from a YAML fixtures file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path, now: DateTime<Utc>) -> Result<Self, ConfigError> {
        let businesses = load_fixtures(path, now)?;
        tracing::info!(path = %path.display(), count = businesses.len(), "loaded fixture dataset");
        Ok(Self::from_businesses(businesses))
    }

    #[must_use]
    pub fn from_businesses(businesses: Vec<Business>) -> Self {
        Self {
            businesses: businesses.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    fn active(&self) -> Vec<Business> {
        self.businesses.iter().filter(|b| b.is_active).cloned().collect()
    }
}

#[async_trait]
impl BusinessProvider for StaticFixtureProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::StaticFixture
    }

    fn filter_support(&self) -> FilterSupport {
        FilterSupport::ALL
    }

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError> {
        Ok(PagedResult::paginate(self.active(), page))
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ProviderError> {
        let matched = apply_search(self.active(), request, chrono::Local::now().naive_local());
        Ok(PagedResult::paginate(matched, request.page))
    }

    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError> {
        Ok(self.businesses.iter().find(|b| b.id == id).cloned())
    }
}
