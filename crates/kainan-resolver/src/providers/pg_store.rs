//! User content store adapter backed by Postgres.

use async_trait::async_trait;
use kainan_core::{
    apply_search, Business, BusinessPatch, FilterSupport, NewBusiness, PageRequest, PagedResult,
    ProviderKind, SearchRequest,
};
use kainan_db::BusinessRow;
use sqlx::PgPool;

use crate::error::ProviderError;
use crate::provider::{BusinessProvider, BusinessStore};

/// Category, price and rating are answered in SQL; radius is applied to the
/// SQL result set. Opening hours are not queryable.
const SUPPORT: FilterSupport = FilterSupport {
    category: true,
    price_tier: true,
    min_rating: true,
    open_now: false,
    near: true,
};

#[derive(Debug, Clone)]
pub struct PgBusinessStore {
    pool: PgPool,
}

impl PgBusinessStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode(row: BusinessRow) -> Result<Business, ProviderError> {
    row.into_business().map_err(ProviderError::from)
}

fn decode_all(rows: Vec<BusinessRow>) -> Result<Vec<Business>, ProviderError> {
    rows.into_iter().map(decode).collect()
}

#[async_trait]
impl BusinessProvider for PgBusinessStore {
    fn kind(&self) -> ProviderKind {
        ProviderKind::UserContent
    }

    fn filter_support(&self) -> FilterSupport {
        SUPPORT
    }

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError> {
        let limit = i64::from(page.limit);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let (rows, total) = kainan_db::list_active_businesses(&self.pool, limit, offset).await?;
        let items = decode_all(rows)?;
        Ok(PagedResult::new(
            items,
            page,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<PagedResult<Business>, ProviderError> {
        let categories: Vec<String> = request
            .filters
            .categories
            .iter()
            .map(|c| c.as_str().to_owned())
            .collect();
        let price_tiers: Vec<String> = request
            .filters
            .price_tiers
            .iter()
            .map(|t| t.as_str().to_owned())
            .collect();

        let rows = kainan_db::search_active_businesses(
            &self.pool,
            &categories,
            &price_tiers,
            request.filters.min_rating,
        )
        .await?;
        let candidates = decode_all(rows)?;

        let matched = apply_search(candidates, request, chrono::Local::now().naive_local());
        Ok(PagedResult::paginate(matched, request.page))
    }

    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError> {
        kainan_db::get_business(&self.pool, id)
            .await?
            .map(decode)
            .transpose()
    }
}

#[async_trait]
impl BusinessStore for PgBusinessStore {
    async fn create(&self, new: &NewBusiness) -> Result<Business, ProviderError> {
        let row = kainan_db::insert_business(&self.pool, new).await?;
        decode(row)
    }

    async fn update(
        &self,
        id: &str,
        patch: &BusinessPatch,
    ) -> Result<Option<Business>, ProviderError> {
        kainan_db::update_business(&self.pool, id, patch)
            .await?
            .map(decode)
            .transpose()
    }

    async fn deactivate(&self, id: &str) -> Result<bool, ProviderError> {
        Ok(kainan_db::deactivate_business(&self.pool, id).await?)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, ProviderError> {
        let rows = kainan_db::list_businesses_by_owner(&self.pool, owner_id).await?;
        decode_all(rows)
    }

    async fn set_verified(
        &self,
        id: &str,
        verified: bool,
    ) -> Result<Option<Business>, ProviderError> {
        kainan_db::set_business_verified(&self.pool, id, verified)
            .await?
            .map(decode)
            .transpose()
    }

    async fn cache_remote(&self, business: &Business) -> Result<bool, ProviderError> {
        Ok(kainan_db::upsert_cached_business(&self.pool, business).await?)
    }
}
