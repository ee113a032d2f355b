use axum::{extract::State, Extension, Json};
use kainan_core::ProviderKind;
use kainan_resolver::ResolverStats;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    active_providers: Vec<ProviderKind>,
    cache_remote_results: bool,
    counters: ResolverStats,
}

/// GET /api/v1/resolver/stats
pub(super) async fn resolver_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<StatsData>> {
    let resolver = &state.resolver;
    Json(ApiResponse {
        data: StatsData {
            active_providers: resolver.active_providers(),
            cache_remote_results: resolver.config().cache_remote_results,
            counters: resolver.stats(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
