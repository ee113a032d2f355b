//! HTTP client for the Google Places Web Service.
//!
//! Wraps `reqwest` with Places-specific status handling, API key management,
//! opt-in retry with back-off, and typed response deserialization. Every endpoint
//! checks the `"status"` field of the JSON envelope and maps non-OK values
//! onto [`PlacesError`] variants.

use std::time::Duration;

use kainan_core::Coordinate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailsEnvelope, PlaceResult, PlacesPage, SearchEnvelope};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
const DEFAULT_MAX_RETRIES: u32 = 0;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
const PLACE_TYPE: &str = "restaurant";

/// Fields requested from the Details endpoint. Limiting the field mask keeps
/// requests in the cheaper billing SKU.
const DETAIL_FIELDS: &str = "place_id,name,geometry,vicinity,formatted_address,types,\
price_level,rating,user_ratings_total,business_status,opening_hours,\
formatted_phone_number,international_phone_number,website,editorial_summary";

/// Shared parameters for nearby and text searches.
#[derive(Debug, Clone)]
pub struct PlacesQuery {
    pub center: Coordinate,
    pub radius_m: u32,
    pub keyword: Option<String>,
    pub open_now: bool,
    /// Inclusive `(min, max)` Places price levels, each in `0..=4`.
    pub price_range: Option<(u8, u8)>,
    pub page_token: Option<String>,
}

impl PlacesQuery {
    #[must_use]
    pub fn new(center: Coordinate, radius_m: u32) -> Self {
        Self {
            center,
            radius_m,
            keyword: None,
            open_now: false,
            price_range: None,
            page_token: None,
        }
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "location",
                format!("{},{}", self.center.latitude, self.center.longitude),
            ),
            ("radius", self.radius_m.to_string()),
            ("type", PLACE_TYPE.to_owned()),
        ];
        if self.open_now {
            params.push(("opennow", "true".to_owned()));
        }
        if let Some((min, max)) = self.price_range {
            params.push(("minprice", min.min(4).to_string()));
            params.push(("maxprice", max.min(4).to_string()));
        }
        if let Some(token) = &self.page_token {
            params.push(("pagetoken", token.clone()));
        }
        params
    }
}

/// Client for the Places Web Service.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a new client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint path
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Enables retry on transient failures. The default is a single attempt.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Restaurants within `query.radius_m` of `query.center`, optionally
    /// narrowed by keyword.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::QuotaExceeded`], [`PlacesError::RequestDenied`],
    ///   [`PlacesError::InvalidRequest`] or [`PlacesError::ApiError`] for a
    ///   non-OK envelope status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn nearby_search(&self, query: &PlacesQuery) -> Result<PlacesPage, PlacesError> {
        let mut params = query.common_params();
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            params.push(("keyword", keyword.trim().to_owned()));
        }
        self.search("nearbysearch/json", &params).await
    }

    /// Free-text search (`"lechon near Kalibo"`) biased toward `query.center`.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::nearby_search`].
    pub async fn text_search(
        &self,
        text: &str,
        query: &PlacesQuery,
    ) -> Result<PlacesPage, PlacesError> {
        let mut params = query.common_params();
        params.push(("query", text.trim().to_owned()));
        self.search("textsearch/json", &params).await
    }

    /// Full details for a single place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] when the place id is unknown or stale.
    /// - Otherwise the same as [`PlacesClient::nearby_search`].
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceResult, PlacesError> {
        let params = [
            ("place_id", place_id.to_owned()),
            ("fields", DETAIL_FIELDS.to_owned()),
        ];
        let url = self.build_url("details/json", &params)?;
        let context = format!("details(place_id={place_id})");

        let envelope: DetailsEnvelope = self.fetch(&url, &context).await?;
        check_status(&envelope.status, envelope.error_message.as_deref(), &context)?;
        envelope
            .result
            .ok_or_else(|| PlacesError::NotFound(place_id.to_owned()))
    }

    async fn search(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<PlacesPage, PlacesError> {
        let url = self.build_url(endpoint, params)?;
        let envelope: SearchEnvelope = self.fetch(&url, endpoint).await?;
        check_status(&envelope.status, envelope.error_message.as_deref(), endpoint)?;

        tracing::debug!(
            endpoint,
            results = envelope.results.len(),
            has_next_page = envelope.next_page_token.is_some(),
            "Places search completed"
        );

        Ok(PlacesPage {
            results: envelope.results,
            next_page_token: envelope.next_page_token,
        })
    }

    /// Fetches and decodes `url`, retrying transient failures. The envelope
    /// status is checked inside the retry loop so `UNKNOWN_ERROR` is retried.
    async fn fetch<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, PlacesError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let body = self.request_json(url, context).await?;
            if let Some(status) = body.get("status").and_then(serde_json::Value::as_str) {
                if status == "UNKNOWN_ERROR" {
                    return Err(PlacesError::ApiError {
                        status: status.to_owned(),
                        message: error_message(&body),
                    });
                }
            }
            serde_json::from_value::<T>(body).map_err(|e| PlacesError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }

    /// Builds the request URL with percent-encoded query parameters. The API
    /// key is always appended first.
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: format!("{}{endpoint}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: &Url, context: &str) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn error_message(body: &serde_json::Value) -> String {
    body.get("error_message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Maps a Places envelope status onto a result. `OK` and `ZERO_RESULTS` are
/// both success.
fn check_status(status: &str, message: Option<&str>, context: &str) -> Result<(), PlacesError> {
    let message = match message {
        Some(m) if !m.is_empty() => format!("{context}: {m}"),
        _ => context.to_owned(),
    };
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => Err(PlacesError::QuotaExceeded(message)),
        "REQUEST_DENIED" => Err(PlacesError::RequestDenied(message)),
        "INVALID_REQUEST" => Err(PlacesError::InvalidRequest(message)),
        "NOT_FOUND" => Err(PlacesError::NotFound(message)),
        other => Err(PlacesError::ApiError {
            status: other.to_owned(),
            message,
        }),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
