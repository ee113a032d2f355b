mod businesses;
mod owners;
mod stats;

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kainan_core::{PageRequest, ProviderKind, DEFAULT_PAGE_LIMIT};
use kainan_resolver::{BusinessResolver, ResolveError};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub resolver: BusinessResolver,
    /// Present when the user content store is enabled.
    pub pool: Option<PgPool>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    providers: Vec<ProviderKind>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "not_implemented" => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Shared `?page=&limit=` parameters.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub(super) fn to_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
    }
}

pub(super) fn map_resolve_error(request_id: String, error: &ResolveError) -> ApiError {
    match error {
        ResolveError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
        ResolveError::Validation(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        ResolveError::Unsupported { .. } => {
            ApiError::new(request_id, "not_implemented", error.to_string())
        }
        ResolveError::AllSourcesUnavailable { .. } | ResolveError::StoreUnavailable { .. } => {
            tracing::error!(error = %error, "business data unavailable");
            ApiError::new(
                request_id,
                "unavailable",
                "business data is temporarily unavailable",
            )
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/businesses",
            get(businesses::list_businesses).post(businesses::create_business),
        )
        .route(
            "/api/v1/businesses/search",
            get(businesses::search_businesses),
        )
        .route(
            "/api/v1/businesses/nearby",
            get(businesses::nearby_businesses),
        )
        .route(
            "/api/v1/businesses/{id}",
            get(businesses::get_business)
                .patch(businesses::update_business)
                .delete(businesses::delete_business),
        )
        .route(
            "/api/v1/businesses/{id}/verification",
            put(businesses::set_verification),
        )
        .route(
            "/api/v1/owners/{owner_id}/businesses",
            get(owners::list_owner_businesses),
        )
        .route("/api/v1/resolver/stats", get(stats::resolver_stats))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

/// Always 200 while any provider is configured: reads fall back when the
/// database is down, so a dead store is reported as degraded.
async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let providers = state.resolver.active_providers();

    let database = match &state.pool {
        None => "disabled",
        Some(pool) => match kainan_db::health_check(pool).await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "health check: database unavailable");
                "unavailable"
            }
        },
    };

    let (code, status) = match (providers.is_empty(), database) {
        (true, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (false, "unavailable") => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::OK, "ok"),
    };

    (
        code,
        Json(ApiResponse {
            data: HealthData {
                status,
                database,
                providers,
            },
            meta,
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(60, Duration::from_secs(60))
}
