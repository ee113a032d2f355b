//! The seam between the resolver and its data sources.

use async_trait::async_trait;
use kainan_core::{
    Business, BusinessPatch, FilterSupport, NewBusiness, PageRequest, PagedResult, ProviderKind,
    SearchRequest,
};

use crate::error::ProviderError;

/// A read-only source of business records.
///
/// `search` receives a request already narrowed to [`filter_support`]; a
/// provider never needs to reject a filter it does not understand.
///
/// [`filter_support`]: BusinessProvider::filter_support
#[async_trait]
pub trait BusinessProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn filter_support(&self) -> FilterSupport;

    async fn list(&self, page: PageRequest) -> Result<PagedResult<Business>, ProviderError>;

    async fn search(&self, request: &SearchRequest)
        -> Result<PagedResult<Business>, ProviderError>;

    /// `Ok(None)` means the provider answered and does not know this id.
    async fn get(&self, id: &str) -> Result<Option<Business>, ProviderError>;
}

/// The authoritative, writable store for owner-submitted records.
#[async_trait]
pub trait BusinessStore: BusinessProvider {
    async fn create(&self, new: &NewBusiness) -> Result<Business, ProviderError>;

    /// `Ok(None)` when no record has this id.
    async fn update(&self, id: &str, patch: &BusinessPatch)
        -> Result<Option<Business>, ProviderError>;

    /// Soft delete. `Ok(false)` when no record has this id.
    async fn deactivate(&self, id: &str) -> Result<bool, ProviderError>;

    /// Every record owned by `owner_id`, including inactive ones.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, ProviderError>;

    async fn set_verified(&self, id: &str, verified: bool)
        -> Result<Option<Business>, ProviderError>;

    /// Best-effort cache of a remote directory record. `Ok(false)` when the
    /// store declined to overwrite an owner-claimed record.
    async fn cache_remote(&self, business: &Business) -> Result<bool, ProviderError>;
}
