//! Business read and owner-mutation handlers.

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kainan_core::business::MAX_RATING;
use kainan_core::{
    Business, BusinessPatch, Coordinate, GeoFilter, NewBusiness, PageRequest, PagedResult,
    SearchFilters, SearchRequest, SortKey, ValidationError, DEFAULT_PAGE_LIMIT,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_resolve_error, ApiError, ApiResponse, AppState, PageQuery, ResponseMeta};

const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

// ---------------------------------------------------------------------------
// Query strings and bodies
// ---------------------------------------------------------------------------

/// `category` and `price` take comma-separated values.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub min_rating: Option<f64>,
    pub open_now: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerificationRequest {
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedResponse {
    pub id: String,
    pub deactivated: bool,
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

fn parse_set<T>(raw: Option<&str>) -> Result<BTreeSet<T>, ValidationError>
where
    T: FromStr<Err = ValidationError> + Ord,
{
    raw.map_or_else(
        || Ok(BTreeSet::new()),
        |raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(T::from_str)
                .collect()
        },
    )
}

fn page_from(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_LIMIT))
}

fn geo_filter(origin: Coordinate, radius_km: f64) -> Result<GeoFilter, ValidationError> {
    origin.validate()?;
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ValidationError::InvalidRadius(radius_km));
    }
    Ok(GeoFilter { origin, radius_km })
}

fn min_rating_filter(min_rating: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match min_rating {
        Some(r) if !r.is_finite() || !(0.0..=MAX_RATING).contains(&r) => {
            Err(ValidationError::RatingOutOfRange(r))
        }
        other => Ok(other),
    }
}

impl SearchQuery {
    fn into_request(self, rid: &str) -> Result<SearchRequest, ApiError> {
        let invalid = |e: ValidationError| ApiError::new(rid, "validation_error", e.to_string());

        let near = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(
                geo_filter(
                    Coordinate::new(lat, lng),
                    self.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM),
                )
                .map_err(invalid)?,
            ),
            (None, None) => None,
            _ => {
                return Err(ApiError::new(
                    rid,
                    "validation_error",
                    "lat and lng must be given together",
                ))
            }
        };

        let sort_by = self
            .sort
            .as_deref()
            .map(SortKey::from_str)
            .transpose()
            .map_err(invalid)?
            .unwrap_or_default();

        Ok(SearchRequest {
            query: self.q.unwrap_or_default(),
            filters: SearchFilters {
                categories: parse_set(self.category.as_deref()).map_err(invalid)?,
                price_tiers: parse_set(self.price.as_deref()).map_err(invalid)?,
                min_rating: min_rating_filter(self.min_rating).map_err(invalid)?,
                open_now: self.open_now.unwrap_or(false),
                near,
            },
            sort_by,
            page: page_from(self.page, self.limit),
        })
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/businesses
pub(super) async fn list_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PagedResult<Business>>>, ApiError> {
    let data = state
        .resolver
        .list_businesses(query.to_request())
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/search
pub(super) async fn search_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<Business>>>, ApiError> {
    let request = query.into_request(&req_id.0)?;
    let data = state
        .resolver
        .search_businesses(&request)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/nearby
pub(super) async fn nearby_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<PagedResult<Business>>>, ApiError> {
    let rid = &req_id.0;
    let sort_by = match query.sort.as_deref() {
        Some(raw) => SortKey::from_str(raw)
            .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?,
        None => SortKey::Distance,
    };

    let data = state
        .resolver
        .nearby_businesses(
            Coordinate::new(query.lat, query.lng),
            query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM),
            sort_by,
            page_from(query.page, query.limit),
        )
        .await
        .map_err(|e| map_resolve_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/businesses/{id}
pub(super) async fn get_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Business>>, ApiError> {
    let data = state
        .resolver
        .get_business_by_id(&id)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/businesses
pub(super) async fn create_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewBusiness>,
) -> Result<(StatusCode, Json<ApiResponse<Business>>), ApiError> {
    let data = state
        .resolver
        .create_business(&body)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/businesses/{id}: absent fields keep their stored value.
pub(super) async fn update_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<BusinessPatch>,
) -> Result<Json<ApiResponse<Business>>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "update must change at least one field",
        ));
    }

    let data = state
        .resolver
        .update_business(&id, &body)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/businesses/{id}: soft delete.
pub(super) async fn delete_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state
        .resolver
        .delete_business(&id)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeletedResponse {
            id,
            deactivated: true,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/businesses/{id}/verification
pub(super) async fn set_verification(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<VerificationRequest>,
) -> Result<Json<ApiResponse<Business>>, ApiError> {
    let data = state
        .resolver
        .set_business_verified(&id, body.verified)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
