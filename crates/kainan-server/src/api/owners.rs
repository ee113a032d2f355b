use axum::{
    extract::{Path, State},
    Extension, Json,
};
use kainan_core::Business;

use crate::middleware::RequestId;

use super::{map_resolve_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// GET /api/v1/owners/{owner_id}/businesses, including soft-deleted listings.
pub(super) async fn list_owner_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(owner_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Business>>>, ApiError> {
    let data = state
        .resolver
        .get_businesses_by_owner(&owner_id)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
