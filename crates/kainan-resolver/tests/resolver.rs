//! Fallback-chain behaviour of `BusinessResolver` against in-memory doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kainan_core::{
    apply_search, Business, BusinessPatch, Category, Coordinate, FilterSupport, NewBusiness,
    PageRequest, PagedResult, PriceTier, ProviderKind, SearchRequest, ValidationError,
};
use kainan_places::PlacesClient;
use kainan_resolver::{
    BusinessProvider, BusinessResolver, BusinessStore, ProviderError, RemoteDirectoryProvider,
    ResolveError, ResolverConfig, ResolverStats, StaticFixtureProvider,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KALIBO: Coordinate = Coordinate::new(11.7068, 122.3652);

fn business(id: &str, source: ProviderKind) -> Business {
    Business::new(
        id,
        format!("Kainan {id}"),
        Category::Filipino,
        PriceTier::Budget,
        KALIBO,
        source,
        Utc::now(),
    )
    .with_rating(4.0, 10)
}

fn unavailable(provider: ProviderKind) -> ProviderError {
    ProviderError::Unavailable {
        provider,
        reason: "connection refused".to_string(),
    }
}

/// A read-only provider that either serves a fixed list or always fails,
/// and records what it was asked.
struct ScriptedProvider {
    kind: ProviderKind,
    support: FilterSupport,
    records: Vec<Business>,
    fail: bool,
    calls: AtomicUsize,
    last_search: Mutex<Option<SearchRequest>>,
}

impl ScriptedProvider {
    fn serving(kind: ProviderKind, ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            kind,
            support: FilterSupport::ALL,
            records: ids.iter().map(|id| business(id, kind)).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        })
    }

    fn failing(kind: ProviderKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            support: FilterSupport::ALL,
            records: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<Vec<Business>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(unavailable(self.kind))
        } else {
            Ok(self.records.clone())
        }
    }
}

#[async_trait]
impl BusinessProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn filter_support(&self) -> FilterSupport {
        self.support
    }

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError> {
        Ok(PagedResult::paginate(self.answer()?, page))
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ProviderError> {
        *self.last_search.lock().unwrap() = Some(request.clone());
        let records = self.answer()?;
        Ok(PagedResult::paginate(
            apply_search(records, request, chrono::Local::now().naive_local()),
            request.page,
        ))
    }

    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError> {
        Ok(self.answer()?.into_iter().find(|b| b.id == id))
    }
}

#[derive(Default)]
struct InMemoryStore {
    records: Mutex<Vec<Business>>,
    fail: AtomicBool,
    fail_cache: AtomicBool,
    calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl InMemoryStore {
    fn with_records(records: Vec<Business>) -> Arc<Self> {
        let store = Self::default();
        *store.records.lock().unwrap() = records;
        Arc::new(store)
    }

    fn check(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(unavailable(ProviderKind::UserContent))
        } else {
            Ok(())
        }
    }

    fn ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.id.clone())
            .collect()
    }
}

#[async_trait]
impl BusinessProvider for InMemoryStore {
    fn kind(&self) -> ProviderKind {
        ProviderKind::UserContent
    }

    fn filter_support(&self) -> FilterSupport {
        FilterSupport::ALL
    }

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError> {
        self.check()?;
        let active = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        Ok(PagedResult::paginate(active, page))
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ProviderError> {
        let all = self.list(PageRequest::new(1, 100)).await?.items;
        Ok(PagedResult::paginate(
            apply_search(all, request, chrono::Local::now().naive_local()),
            request.page,
        ))
    }

    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }
}

#[async_trait]
impl BusinessStore for InMemoryStore {
    async fn create(&self, new: &NewBusiness) -> Result<Business, ProviderError> {
        self.check()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut created = Business::new(
            format!("store-{n}"),
            new.name.trim(),
            new.category,
            new.price_tier,
            new.location,
            ProviderKind::UserContent,
            Utc::now(),
        );
        created.owner_id = Some(new.owner_id.clone());
        created.hours = new.hours_or_default();
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &str,
        patch: &BusinessPatch,
    ) -> Result<Option<Business>, ProviderError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        Ok(records.iter_mut().find(|b| b.id == id).map(|b| {
            patch.apply(b, Utc::now());
            b.clone()
        }))
    }

    async fn deactivate(&self, id: &str) -> Result<bool, ProviderError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        Ok(records
            .iter_mut()
            .find(|b| b.id == id)
            .map(|b| b.is_active = false)
            .is_some())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, ProviderError> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn set_verified(
        &self,
        id: &str,
        verified: bool,
    ) -> Result<Option<Business>, ProviderError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        Ok(records.iter_mut().find(|b| b.id == id).map(|b| {
            b.is_verified = verified;
            b.clone()
        }))
    }

    async fn cache_remote(&self, business: &Business) -> Result<bool, ProviderError> {
        if self.fail_cache.load(Ordering::SeqCst) {
            return Err(unavailable(ProviderKind::UserContent));
        }
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|b| b.id == business.id) {
            Some(existing) if existing.owner_id.is_some() => Ok(false),
            Some(existing) => {
                *existing = business.clone();
                Ok(true)
            }
            None => {
                records.push(business.clone());
                Ok(true)
            }
        }
    }
}

fn new_listing(owner: &str) -> NewBusiness {
    NewBusiness {
        name: "Inasal ni Nanay".to_string(),
        description: String::new(),
        category: Category::Filipino,
        price_tier: PriceTier::Budget,
        location: KALIBO,
        address: kainan_core::Address::default(),
        phone: None,
        website: None,
        image_url: None,
        hours: None,
        amenities: std::collections::BTreeSet::new(),
        owner_id: owner.to_string(),
    }
}

/// Waits for background cache writes to report `expected` attempts.
async fn settled_stats(resolver: &BusinessResolver, expected: u64) -> ResolverStats {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = resolver.stats();
            if stats.cache_writes.attempted >= expected && stats.cache_writes.settled() {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("cache writes should settle")
}

// ---------------------------------------------------------------------------
// Read fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_success_short_circuits_the_chain() {
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1", "r2"]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig {
        cache_remote_results: false,
        ..ResolverConfig::default()
    })
    .with_remote(remote.clone())
    .with_fixtures(fixtures.clone());

    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|b| b.source == ProviderKind::RemoteDirectory));
    assert_eq!(fixtures.calls(), 0);
    assert_eq!(resolver.stats().remote_directory.served, 1);
}

#[tokio::test]
async fn falls_back_in_priority_order() {
    let remote = ScriptedProvider::failing(ProviderKind::RemoteDirectory);
    let store = InMemoryStore::with_records(vec![business("s1", ProviderKind::UserContent)]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote.clone())
        .with_store(store.clone())
        .with_fixtures(fixtures.clone());

    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].id, "s1");
    assert_eq!(fixtures.calls(), 0);

    store.fail.store(true, Ordering::SeqCst);
    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].id, "f1");

    let stats = resolver.stats();
    assert_eq!(stats.remote_directory.failed, 2);
    assert_eq!(stats.user_content.served, 1);
    assert_eq!(stats.user_content.failed, 1);
    assert_eq!(stats.static_fixture.served, 1);
    assert_eq!(stats.all_sources_exhausted, 0);
}

#[tokio::test]
async fn empty_result_is_a_success_not_a_failure() {
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &[]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote)
        .with_fixtures(fixtures.clone());

    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(fixtures.calls(), 0);
}

#[tokio::test]
async fn every_provider_failing_reports_each_failure() {
    let store = InMemoryStore::with_records(Vec::new());
    store.fail.store(true, Ordering::SeqCst);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(ScriptedProvider::failing(ProviderKind::RemoteDirectory))
        .with_store(store)
        .with_fixtures(ScriptedProvider::failing(ProviderKind::StaticFixture));

    let err = resolver
        .search_businesses(&SearchRequest::default())
        .await
        .unwrap_err();

    let ResolveError::AllSourcesUnavailable { failures } = err else {
        panic!("expected AllSourcesUnavailable, got {err:?}");
    };
    let order: Vec<ProviderKind> = failures.iter().map(|f| f.provider).collect();
    assert_eq!(
        order,
        vec![
            ProviderKind::RemoteDirectory,
            ProviderKind::UserContent,
            ProviderKind::StaticFixture
        ]
    );
    assert_eq!(resolver.stats().all_sources_exhausted, 1);
}

#[tokio::test]
async fn no_configured_providers_is_unavailable() {
    let resolver = BusinessResolver::new(ResolverConfig::default());
    let err = resolver.list_businesses(PageRequest::default()).await.unwrap_err();
    assert!(
        matches!(&err, ResolveError::AllSourcesUnavailable { failures } if failures.is_empty())
    );
    assert!(err.to_string().contains("no providers configured"));
}

#[tokio::test]
async fn disabled_provider_is_skipped() {
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1"]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig {
        enable_remote_directory: false,
        ..ResolverConfig::default()
    })
    .with_remote(remote.clone())
    .with_fixtures(fixtures);

    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].id, "f1");
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn unsupported_filters_are_dropped_for_that_provider_only() {
    let remote = Arc::new(ScriptedProvider {
        kind: ProviderKind::RemoteDirectory,
        support: FilterSupport {
            category: false,
            ..FilterSupport::ALL
        },
        records: vec![business("r1", ProviderKind::RemoteDirectory)],
        fail: true,
        calls: AtomicUsize::new(0),
        last_search: Mutex::new(None),
    });
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote.clone())
        .with_fixtures(fixtures.clone());

    let mut request = SearchRequest::default();
    request.filters.categories.insert(Category::Seafood);
    request.filters.min_rating = Some(3.5);

    let page = resolver.search_businesses(&request).await.unwrap();
    // The fixture is Filipino, so the category filter reached the fixtures.
    assert!(page.is_empty());

    let seen_by_remote = remote.last_search.lock().unwrap().clone().unwrap();
    assert!(seen_by_remote.filters.categories.is_empty());
    assert_eq!(seen_by_remote.filters.min_rating, Some(3.5));

    let seen_by_fixtures = fixtures.last_search.lock().unwrap().clone().unwrap();
    assert_eq!(seen_by_fixtures.filters, request.filters);
}

// ---------------------------------------------------------------------------
// Lookup by id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_id_prefers_store_then_fixtures() {
    let mut owned = business("shared", ProviderKind::UserContent);
    owned.name = "Owner Edited".to_string();
    let store = InMemoryStore::with_records(vec![owned]);
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["shared"]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["shared", "f2"]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote.clone())
        .with_store(store.clone())
        .with_fixtures(fixtures);

    let found = resolver.get_business_by_id("shared").await.unwrap();
    assert_eq!(found.name, "Owner Edited");

    let found = resolver.get_business_by_id("f2").await.unwrap();
    assert_eq!(found.source, ProviderKind::StaticFixture);

    store.fail.store(true, Ordering::SeqCst);
    let found = resolver.get_business_by_id("shared").await.unwrap();
    assert_eq!(found.source, ProviderKind::StaticFixture);

    // The record could be in the unreachable store, so absence is not proven.
    let err = resolver.get_business_by_id("nowhere").await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::AllSourcesUnavailable { ref failures }
            if failures.len() == 1 && failures[0].provider == ProviderKind::UserContent
    ));

    store.fail.store(false, Ordering::SeqCst);
    let err = resolver.get_business_by_id("nowhere").await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { id } if id == "nowhere"));
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn get_by_id_with_every_lookup_failing_is_unavailable() {
    let store = InMemoryStore::with_records(Vec::new());
    store.fail.store(true, Ordering::SeqCst);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_store(store)
        .with_fixtures(ScriptedProvider::failing(ProviderKind::StaticFixture));

    let err = resolver.get_business_by_id("any").await.unwrap_err();
    assert!(matches!(err, ResolveError::AllSourcesUnavailable { failures } if failures.len() == 2));
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutations_never_fall_back() {
    let store = InMemoryStore::with_records(Vec::new());
    store.fail.store(true, Ordering::SeqCst);
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["f1"]);
    let fixtures = ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote.clone())
        .with_store(store)
        .with_fixtures(fixtures.clone());

    let err = resolver.create_business(&new_listing("owner-1")).await.unwrap_err();
    assert!(matches!(err, ResolveError::StoreUnavailable { .. }));

    let patch = BusinessPatch {
        name: Some("Renamed".to_string()),
        ..BusinessPatch::default()
    };
    let err = resolver.update_business("f1", &patch).await.unwrap_err();
    assert!(matches!(err, ResolveError::StoreUnavailable { .. }));

    let err = resolver.delete_business("f1").await.unwrap_err();
    assert!(matches!(err, ResolveError::StoreUnavailable { .. }));

    let err = resolver.get_businesses_by_owner("owner-1").await.unwrap_err();
    assert!(matches!(err, ResolveError::StoreUnavailable { .. }));

    let err = resolver.set_business_verified("f1", true).await.unwrap_err();
    assert!(matches!(err, ResolveError::StoreUnavailable { .. }));

    assert_eq!(remote.calls(), 0);
    assert_eq!(fixtures.calls(), 0);
}

#[tokio::test]
async fn mutations_without_a_store_are_unsupported() {
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_fixtures(ScriptedProvider::serving(ProviderKind::StaticFixture, &["f1"]));

    let err = resolver.create_business(&new_listing("owner-1")).await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Unsupported {
            operation: "create_business"
        }
    ));
    let err = resolver.set_business_verified("f1", true).await.unwrap_err();
    assert!(matches!(err, ResolveError::Unsupported { .. }));
}

#[tokio::test]
async fn owner_lifecycle_through_the_store() {
    let store = InMemoryStore::with_records(Vec::new());
    let resolver = BusinessResolver::new(ResolverConfig::default()).with_store(store.clone());

    let created = resolver.create_business(&new_listing("owner-1")).await.unwrap();
    assert_eq!(created.owner_id.as_deref(), Some("owner-1"));
    assert_eq!(created.source, ProviderKind::UserContent);

    let patch = BusinessPatch {
        description: Some("Best inasal in Kalibo".to_string()),
        ..BusinessPatch::default()
    };
    let updated = resolver.update_business(&created.id, &patch).await.unwrap();
    assert_eq!(updated.description, "Best inasal in Kalibo");
    assert_eq!(updated.name, created.name);

    let verified = resolver.set_business_verified(&created.id, true).await.unwrap();
    assert!(verified.is_verified);

    resolver.delete_business(&created.id).await.unwrap();
    resolver.delete_business(&created.id).await.unwrap();

    let listed = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert!(listed.is_empty());

    let owned = resolver.get_businesses_by_owner("owner-1").await.unwrap();
    assert_eq!(owned.len(), 1);
    assert!(!owned[0].is_active);

    let fetched = resolver.get_business_by_id(&created.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn mutation_validation_and_missing_records() {
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_store(InMemoryStore::with_records(Vec::new()));

    let mut invalid = new_listing("owner-1");
    invalid.name = "   ".to_string();
    let err = resolver.create_business(&invalid).await.unwrap_err();
    assert!(matches!(err, ResolveError::Validation(ValidationError::EmptyName)));

    let err = resolver.get_businesses_by_owner(" ").await.unwrap_err();
    assert!(matches!(err, ResolveError::Validation(ValidationError::EmptyOwner)));

    let err = resolver
        .update_business("missing", &BusinessPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }));

    let err = resolver.delete_business("missing").await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Remote result caching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_results_are_cached_in_the_background() {
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1", "r2"]);
    let store = InMemoryStore::with_records(Vec::new());
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote)
        .with_store(store.clone());

    resolver.list_businesses(PageRequest::default()).await.unwrap();

    let stats = settled_stats(&resolver, 2).await;
    assert_eq!(stats.cache_writes.succeeded, 2);
    let mut ids = store.ids();
    ids.sort();
    assert_eq!(ids, vec!["r1", "r2"]);
}

#[tokio::test]
async fn cache_failure_does_not_affect_the_read() {
    let remote = ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1"]);
    let store = InMemoryStore::with_records(Vec::new());
    store.fail_cache.store(true, Ordering::SeqCst);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(remote)
        .with_store(store);

    let page = resolver.list_businesses(PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].id, "r1");

    let stats = settled_stats(&resolver, 1).await;
    assert_eq!(stats.cache_writes.failed, 1);
    assert_eq!(stats.remote_directory.served, 1);
}

#[tokio::test]
async fn owner_claimed_records_are_not_overwritten() {
    let mut claimed = business("r1", ProviderKind::UserContent);
    claimed.owner_id = Some("owner-1".to_string());
    claimed.name = "Claimed Name".to_string();
    let store = InMemoryStore::with_records(vec![claimed]);
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1"]))
        .with_store(store.clone());

    resolver.list_businesses(PageRequest::default()).await.unwrap();

    let stats = settled_stats(&resolver, 1).await;
    assert_eq!(stats.cache_writes.skipped, 1);
    assert_eq!(
        store.records.lock().unwrap()[0].name,
        "Claimed Name".to_string()
    );
}

#[tokio::test]
async fn caching_can_be_disabled() {
    let store = InMemoryStore::with_records(Vec::new());
    let resolver = BusinessResolver::new(ResolverConfig {
        cache_remote_results: false,
        ..ResolverConfig::default()
    })
    .with_remote(ScriptedProvider::serving(ProviderKind::RemoteDirectory, &["r1"]))
    .with_store(store.clone());

    resolver.list_businesses(PageRequest::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(resolver.stats().cache_writes.attempted, 0);
    assert!(store.ids().is_empty());
}

// ---------------------------------------------------------------------------
// Real adapters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn places_quota_exhaustion_falls_back_to_builtin_fixtures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OVER_QUERY_LIMIT",
            "results": [],
            "error_message": "You have exceeded your daily request quota."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url("test-key", 5, "kainan-test", &server.uri())
        .expect("client construction should not fail")
        .with_retry(2, 0);
    let remote = RemoteDirectoryProvider::new(client, KALIBO, 5_000);
    let fixtures = StaticFixtureProvider::builtin(Utc::now()).unwrap();
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(Arc::new(remote))
        .with_fixtures(Arc::new(fixtures));

    let page = resolver.list_businesses(PageRequest::new(1, 5)).await.unwrap();

    assert_eq!(page.items.len(), 5);
    assert!(page.items.iter().all(|b| b.source == ProviderKind::StaticFixture));
    assert_eq!(resolver.stats().remote_directory.failed, 1);
}

#[tokio::test]
async fn failing_places_call_is_attempted_once_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url("test-key", 5, "kainan-test", &server.uri())
        .expect("client construction should not fail");
    let fixtures = StaticFixtureProvider::builtin(Utc::now()).unwrap();
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(Arc::new(RemoteDirectoryProvider::new(client, KALIBO, 5_000)))
        .with_fixtures(Arc::new(fixtures));

    let page = resolver.list_businesses(PageRequest::new(1, 3)).await.unwrap();

    assert!(page.items.iter().all(|b| b.source == ProviderKind::StaticFixture));
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(resolver.stats().remote_directory.failed, 1);
}

#[tokio::test]
async fn places_results_are_normalized_and_served() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{
                "place_id": "ChIJ-inasal",
                "name": "Bacolod Chicken Inasal",
                "geometry": { "location": { "lat": 11.7050, "lng": 122.3660 } },
                "vicinity": "Roxas Ave, Kalibo",
                "types": ["restaurant"],
                "price_level": 1,
                "rating": 4.3,
                "user_ratings_total": 87
            }]
        })))
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url("test-key", 5, "kainan-test", &server.uri())
        .expect("client construction should not fail");
    let resolver = BusinessResolver::new(ResolverConfig::default())
        .with_remote(Arc::new(RemoteDirectoryProvider::new(client, KALIBO, 5_000)));

    let request = SearchRequest {
        query: "inasal".to_string(),
        ..SearchRequest::default()
    };
    let page = resolver.search_businesses(&request).await.unwrap();

    assert_eq!(page.items.len(), 1);
    let found = &page.items[0];
    assert_eq!(found.id, "ChIJ-inasal");
    assert_eq!(found.source, ProviderKind::RemoteDirectory);
    assert_eq!(found.price_tier, PriceTier::Budget);
    assert_eq!(found.review_count, 87);
}
