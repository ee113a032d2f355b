//! Remote directory adapter backed by the Places client.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use kainan_core::{
    apply_search, Business, Coordinate, FilterSupport, PageRequest, PagedResult, PriceTier,
    ProviderKind, SearchFilters, SearchRequest,
};
use kainan_places::{normalize_place, normalize_places, PlacesClient, PlacesError, PlacesQuery};

use crate::error::ProviderError;
use crate::provider::BusinessProvider;

/// Places has no cuisine filter; everything else maps onto a request parameter.
const SUPPORT: FilterSupport = FilterSupport {
    category: false,
    price_tier: true,
    min_rating: true,
    open_now: true,
    near: true,
};

const MAX_RADIUS_M: u32 = 50_000;

/// Serves one Places result page per call and paginates it in memory.
pub struct RemoteDirectoryProvider {
    client: PlacesClient,
    center: Coordinate,
    radius_m: u32,
}

impl RemoteDirectoryProvider {
    /// `center` and `radius_m` scope listings and any search without a `near` filter.
    #[must_use]
    pub fn new(client: PlacesClient, center: Coordinate, radius_m: u32) -> Self {
        Self {
            client,
            center,
            radius_m: radius_m.clamp(1, MAX_RADIUS_M),
        }
    }

    fn query_for(&self, filters: &SearchFilters) -> PlacesQuery {
        let (center, radius_m) = match filters.near {
            Some(near) => (near.origin, km_to_m(near.radius_km)),
            None => (self.center, self.radius_m),
        };
        let mut query = PlacesQuery::new(center, radius_m);
        query.open_now = filters.open_now;
        query.price_range = price_range(&filters.price_tiers);
        query
    }
}

#[async_trait]
impl BusinessProvider for RemoteDirectoryProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RemoteDirectory
    }

    fn filter_support(&self) -> FilterSupport {
        SUPPORT
    }

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError> {
        let query = PlacesQuery::new(self.center, self.radius_m);
        let results = self.client.nearby_search(&query).await?;
        let businesses = normalize_places(results.results, Utc::now());
        Ok(PagedResult::paginate(businesses, page))
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ProviderError> {
        let query = self.query_for(&request.filters);
        let results = match request.trimmed_query() {
            Some(text) => self.client.text_search(text, &query).await?,
            None => self.client.nearby_search(&query).await?,
        };
        let businesses = normalize_places(results.results, Utc::now());

        // Text and open-now were answered by Places; the hours on normalized
        // records are defaults and must not be re-checked locally.
        let local = SearchRequest {
            query: String::new(),
            filters: SearchFilters {
                open_now: false,
                categories: BTreeSet::new(),
                ..request.filters.clone()
            },
            sort_by: request.sort_by,
            page: request.page,
        };
        let matched = apply_search(businesses, &local, chrono::Local::now().naive_local());
        Ok(PagedResult::paginate(matched, request.page))
    }

    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError> {
        match self.client.place_details(id).await {
            Ok(place) => Ok(normalize_place(place, Utc::now())),
            Err(PlacesError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn km_to_m(radius_km: f64) -> u32 {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return 1;
    }
    (radius_km * 1000.0).round().clamp(1.0, f64::from(MAX_RADIUS_M)) as u32
}

/// The contiguous Places price-level range covering every requested tier.
/// Budget also admits level 0 (free). Gaps are closed by the local price filter.
fn price_range(tiers: &BTreeSet<PriceTier>) -> Option<(u8, u8)> {
    let min = tiers.iter().map(|t| match t {
        PriceTier::Budget => 0,
        other => other.price_level(),
    });
    let min = min.min()?;
    let max = tiers.iter().map(|t| t.price_level()).max()?;
    Some((min, max))
}
