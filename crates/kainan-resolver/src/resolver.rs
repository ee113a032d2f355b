//! The Business Data Resolver: a sequential fallback chain for reads and a
//! single authoritative store for writes.

use std::sync::Arc;

use kainan_core::{
    AppConfig, Business, BusinessPatch, Coordinate, GeoFilter, NewBusiness, PageRequest,
    PagedResult, ProviderKind, SearchFilters, SearchRequest, SortKey, ValidationError,
};

use crate::error::{ProviderError, ProviderFailure, ResolveError};
use crate::metrics::{ResolverMetrics, ResolverStats};
use crate::provider::{BusinessProvider, BusinessStore};

/// Which providers take part and whether remote reads are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub enable_remote_directory: bool,
    pub enable_user_store: bool,
    pub enable_fixtures: bool,
    pub cache_remote_results: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enable_remote_directory: true,
            enable_user_store: true,
            enable_fixtures: true,
            cache_remote_results: true,
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            enable_remote_directory: config.remote_directory_active(),
            enable_user_store: config.enable_user_store,
            enable_fixtures: config.enable_fixtures,
            cache_remote_results: config.cache_remote_results,
        }
    }
}

#[derive(Clone, Copy)]
enum ReadOp<'a> {
    List(PageRequest),
    Search(&'a SearchRequest),
}

impl ReadOp<'_> {
    fn name(self) -> &'static str {
        match self {
            ReadOp::List(_) => "list_businesses",
            ReadOp::Search(_) => "search_businesses",
        }
    }
}

/// Composes the remote directory, the user content store and the static
/// fixtures in that fixed priority order.
///
/// Reads try each enabled provider to completion before the next; there is
/// no racing and no retry at this level. Mutations go to the store only.
#[derive(Clone)]
pub struct BusinessResolver {
    remote: Option<Arc<dyn BusinessProvider>>,
    store: Option<Arc<dyn BusinessStore>>,
    fixtures: Option<Arc<dyn BusinessProvider>>,
    config: ResolverConfig,
    metrics: Arc<ResolverMetrics>,
}

impl BusinessResolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            remote: None,
            store: None,
            fixtures: None,
            config,
            metrics: Arc::new(ResolverMetrics::default()),
        }
    }

    #[must_use]
    pub fn with_remote(mut self, provider: Arc<dyn BusinessProvider>) -> Self {
        self.remote = Some(provider);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn BusinessStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_fixtures(mut self, provider: Arc<dyn BusinessProvider>) -> Self {
        self.fixtures = Some(provider);
        self
    }

    #[must_use]
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.metrics.snapshot()
    }

    /// Providers that are both configured and enabled, in chain order.
    #[must_use]
    pub fn active_providers(&self) -> Vec<ProviderKind> {
        self.read_chain().iter().map(|p| p.kind()).collect()
    }

    fn active_remote(&self) -> Option<&Arc<dyn BusinessProvider>> {
        self.remote
            .as_ref()
            .filter(|_| self.config.enable_remote_directory)
    }

    fn active_store(&self) -> Option<&Arc<dyn BusinessStore>> {
        self.store.as_ref().filter(|_| self.config.enable_user_store)
    }

    fn active_fixtures(&self) -> Option<&Arc<dyn BusinessProvider>> {
        self.fixtures.as_ref().filter(|_| self.config.enable_fixtures)
    }

    fn read_chain(&self) -> Vec<&dyn BusinessProvider> {
        let mut chain: Vec<&dyn BusinessProvider> = Vec::with_capacity(3);
        if let Some(remote) = self.active_remote() {
            chain.push(remote.as_ref());
        }
        if let Some(store) = self.active_store() {
            let store: &dyn BusinessProvider = store.as_ref();
            chain.push(store);
        }
        if let Some(fixtures) = self.active_fixtures() {
            chain.push(fixtures.as_ref());
        }
        chain
    }

    fn lookup_chain(&self) -> Vec<&dyn BusinessProvider> {
        self.read_chain()
            .into_iter()
            .filter(|p| p.kind() != ProviderKind::RemoteDirectory)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// A page of active businesses from the first provider that answers.
    /// Each provider's own pagination is passed through unchanged.
    ///
    /// # Errors
    ///
    /// [`ResolveError::AllSourcesUnavailable`] when every provider fails.
    pub async fn list_businesses(
        &self,
        page: PageRequest,
    ) -> Result<PagedResult<Business>, ResolveError> {
        self.read_through_chain(ReadOp::List(page)).await
    }

    /// Filtered, sorted search. Filters a provider does not support are
    /// dropped for that provider and logged at debug level.
    ///
    /// # Errors
    ///
    /// [`ResolveError::AllSourcesUnavailable`] when every provider fails.
    pub async fn search_businesses(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ResolveError> {
        self.read_through_chain(ReadOp::Search(request)).await
    }

    /// Businesses within `radius_km` of `origin`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Validation`] for an invalid origin or radius, otherwise
    /// as [`BusinessResolver::search_businesses`].
    pub async fn nearby_businesses(
        &self,
        origin: Coordinate,
        radius_km: f64,
        sort_by: SortKey,
        page: PageRequest,
    ) -> Result<PagedResult<Business>, ResolveError> {
        origin.validate()?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ValidationError::InvalidRadius(radius_km).into());
        }
        let request = SearchRequest {
            query: String::new(),
            filters: SearchFilters {
                near: Some(GeoFilter { origin, radius_km }),
                ..SearchFilters::default()
            },
            sort_by,
            page,
        };
        self.search_businesses(&request).await
    }

    /// Owner-authored records take precedence, so the store is consulted
    /// first, then the fixtures. The remote directory is not consulted.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] when every consulted provider answered and none knew the id.
    /// - [`ResolveError::AllSourcesUnavailable`] when any consulted provider failed, since the
    ///   record may live in the one that could not answer.
    pub async fn get_business_by_id(&self, id: &str) -> Result<Business, ResolveError> {
        let mut failures = Vec::new();
        let mut answered = false;

        for provider in self.lookup_chain() {
            let kind = provider.kind();
            match provider.get(id).await {
                Ok(Some(business)) => {
                    self.metrics.record_served(kind);
                    tracing::debug!(provider = %kind, business_id = id, "business resolved");
                    return Ok(business);
                }
                Ok(None) => answered = true,
                Err(err) => {
                    self.metrics.record_failed(kind);
                    tracing::warn!(
                        provider = %kind,
                        business_id = id,
                        error = %err,
                        "lookup failed, trying next provider"
                    );
                    failures.push(ProviderFailure::from(&err));
                }
            }
        }

        if answered && failures.is_empty() {
            Err(ResolveError::NotFound { id: id.to_string() })
        } else {
            self.metrics.record_exhausted();
            tracing::error!(
                business_id = id,
                failures = failures.len(),
                "business lookup incomplete, a provider failed"
            );
            Err(ResolveError::AllSourcesUnavailable { failures })
        }
    }

    async fn read_through_chain(
        &self,
        op: ReadOp<'_>,
    ) -> Result<PagedResult<Business>, ResolveError> {
        let chain = self.read_chain();
        let mut failures = Vec::with_capacity(chain.len());

        for provider in chain {
            let kind = provider.kind();
            let result = match op {
                ReadOp::List(page) => provider.list(page).await,
                ReadOp::Search(request) => {
                    let support = provider.filter_support();
                    let ignored = request.filters.ignored_by(support);
                    if !ignored.is_empty() {
                        tracing::debug!(
                            provider = %kind,
                            ignored = ?ignored,
                            "provider does not support some filters; ignoring them"
                        );
                    }
                    let scoped = SearchRequest {
                        filters: request.filters.restricted_to(support),
                        ..request.clone()
                    };
                    provider.search(&scoped).await
                }
            };

            match result {
                Ok(page) => {
                    self.metrics.record_served(kind);
                    tracing::debug!(
                        provider = %kind,
                        operation = op.name(),
                        items = page.items.len(),
                        total = page.pagination.total,
                        "served by provider"
                    );
                    if kind == ProviderKind::RemoteDirectory {
                        self.spawn_cache_write(&page.items);
                    }
                    return Ok(page);
                }
                Err(err) => {
                    self.metrics.record_failed(kind);
                    tracing::warn!(
                        provider = %kind,
                        operation = op.name(),
                        error = %err,
                        "provider failed, falling through"
                    );
                    failures.push(ProviderFailure::from(&err));
                }
            }
        }

        self.metrics.record_exhausted();
        tracing::error!(
            operation = op.name(),
            failures = failures.len(),
            "all business sources unavailable"
        );
        Err(ResolveError::AllSourcesUnavailable { failures })
    }

    /// Hands remote records to a background task that caches them in the
    /// store. The caller never waits on or observes the outcome; it is
    /// visible only through [`ResolverStats::cache_writes`].
    fn spawn_cache_write(&self, items: &[Business]) {
        if !self.config.cache_remote_results || items.is_empty() {
            return;
        }
        let Some(store) = self.active_store() else {
            return;
        };
        let store = Arc::clone(store);
        let metrics = Arc::clone(&self.metrics);
        let records = items.to_vec();

        tokio::spawn(async move {
            for record in &records {
                metrics.record_cache_attempt();
                match store.cache_remote(record).await {
                    Ok(written) => metrics.record_cache_success(written),
                    Err(err) => {
                        metrics.record_cache_failure();
                        tracing::warn!(
                            business_id = %record.id,
                            error = %err,
                            "failed to cache remote directory record"
                        );
                    }
                }
            }
        });
    }

    // ---------------------------------------------------------------------
    // Mutations: user content store only, never redirected
    // ---------------------------------------------------------------------

    fn require_store(
        &self,
        operation: &'static str,
    ) -> Result<&Arc<dyn BusinessStore>, ResolveError> {
        self.active_store()
            .ok_or(ResolveError::Unsupported { operation })
    }

    fn store_failure(&self, operation: &'static str, err: &ProviderError) -> ResolveError {
        self.metrics.record_failed(ProviderKind::UserContent);
        tracing::error!(operation, error = %err, "user content store failed during mutation");
        ResolveError::StoreUnavailable {
            reason: err.to_string(),
        }
    }

    /// # Errors
    ///
    /// [`ResolveError::Validation`], [`ResolveError::Unsupported`] without a
    /// store, or [`ResolveError::StoreUnavailable`] if the store fails.
    pub async fn create_business(&self, new: &NewBusiness) -> Result<Business, ResolveError> {
        const OP: &str = "create_business";
        new.validate()?;
        let store = self.require_store(OP)?;
        let created = store
            .create(new)
            .await
            .map_err(|e| self.store_failure(OP, &e))?;
        tracing::info!(business_id = %created.id, owner_id = %new.owner_id, "business created");
        Ok(created)
    }

    /// # Errors
    ///
    /// As [`BusinessResolver::create_business`], plus [`ResolveError::NotFound`].
    pub async fn update_business(
        &self,
        id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, ResolveError> {
        const OP: &str = "update_business";
        patch.validate()?;
        let store = self.require_store(OP)?;
        let updated = store
            .update(id, patch)
            .await
            .map_err(|e| self.store_failure(OP, &e))?
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })?;
        tracing::info!(business_id = id, "business updated");
        Ok(updated)
    }

    /// Soft delete: the record stays but is excluded from listings.
    ///
    /// # Errors
    ///
    /// As [`BusinessResolver::update_business`].
    pub async fn delete_business(&self, id: &str) -> Result<(), ResolveError> {
        const OP: &str = "delete_business";
        let store = self.require_store(OP)?;
        let existed = store
            .deactivate(id)
            .await
            .map_err(|e| self.store_failure(OP, &e))?;
        if !existed {
            return Err(ResolveError::NotFound { id: id.to_string() });
        }
        tracing::info!(business_id = id, "business deactivated");
        Ok(())
    }

    /// Every listing owned by `owner_id`, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Validation`] for an empty owner id, otherwise as
    /// [`BusinessResolver::create_business`].
    pub async fn get_businesses_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Business>, ResolveError> {
        const OP: &str = "get_businesses_by_owner";
        if owner_id.trim().is_empty() {
            return Err(ValidationError::EmptyOwner.into());
        }
        let store = self.require_store(OP)?;
        store
            .list_by_owner(owner_id)
            .await
            .map_err(|e| self.store_failure(OP, &e))
    }

    /// Admin moderation of the verified badge.
    ///
    /// # Errors
    ///
    /// As [`BusinessResolver::update_business`].
    pub async fn set_business_verified(
        &self,
        id: &str,
        verified: bool,
    ) -> Result<Business, ResolveError> {
        const OP: &str = "set_business_verified";
        let store = self.require_store(OP)?;
        let business = store
            .set_verified(id, verified)
            .await
            .map_err(|e| self.store_failure(OP, &e))?
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })?;
        tracing::info!(business_id = id, verified, "business verification changed");
        Ok(business)
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
