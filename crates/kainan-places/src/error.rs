use thiserror::Error;

/// Errors returned by the Places directory client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `OVER_QUERY_LIMIT`: billing or quota rejection. Never retried.
    #[error("Places quota exceeded: {0}")]
    QuotaExceeded(String),

    /// `REQUEST_DENIED`: bad or restricted API key.
    #[error("Places request denied: {0}")]
    RequestDenied(String),

    /// `INVALID_REQUEST`: missing or malformed parameters (including stale page tokens).
    #[error("Places rejected the request as invalid: {0}")]
    InvalidRequest(String),

    /// `NOT_FOUND`: the referenced place id no longer exists.
    #[error("place not found: {0}")]
    NotFound(String),

    /// Any other non-OK envelope status.
    #[error("Places API error {status}: {message}")]
    ApiError { status: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
