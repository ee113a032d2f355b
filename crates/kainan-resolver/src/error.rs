use kainan_core::{ProviderKind, ValidationError};
use kainan_db::DbError;
use kainan_places::PlacesError;
use thiserror::Error;

/// A single provider's failure. Always caught by the resolver on read paths.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} is unreachable: {reason}")]
    Unavailable {
        provider: ProviderKind,
        reason: String,
    },

    #[error("{provider} quota exceeded: {reason}")]
    QuotaExceeded {
        provider: ProviderKind,
        reason: String,
    },

    #[error("{provider} denied the request: {reason}")]
    Denied {
        provider: ProviderKind,
        reason: String,
    },

    #[error("{provider} is not configured")]
    NotConfigured { provider: ProviderKind },

    #[error("{provider} backend failure: {reason}")]
    Backend {
        provider: ProviderKind,
        reason: String,
    },
}

impl ProviderError {
    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        match self {
            ProviderError::Unavailable { provider, .. }
            | ProviderError::QuotaExceeded { provider, .. }
            | ProviderError::Denied { provider, .. }
            | ProviderError::NotConfigured { provider }
            | ProviderError::Backend { provider, .. } => *provider,
        }
    }
}

impl From<PlacesError> for ProviderError {
    fn from(err: PlacesError) -> Self {
        let provider = ProviderKind::RemoteDirectory;
        match err {
            PlacesError::QuotaExceeded(reason) => ProviderError::QuotaExceeded { provider, reason },
            PlacesError::RequestDenied(reason) => ProviderError::Denied { provider, reason },
            PlacesError::Http(e) if e.is_timeout() || e.is_connect() => ProviderError::Unavailable {
                provider,
                reason: e.to_string(),
            },
            other => ProviderError::Backend {
                provider,
                reason: other.to_string(),
            },
        }
    }
}

impl From<DbError> for ProviderError {
    fn from(err: DbError) -> Self {
        let provider = ProviderKind::UserContent;
        match err {
            DbError::MissingDatabaseUrl => ProviderError::NotConfigured { provider },
            DbError::Sqlx(e) => e.into(),
            other => ProviderError::Backend {
                provider,
                reason: other.to_string(),
            },
        }
    }
}

impl From<sqlx::Error> for ProviderError {
    fn from(err: sqlx::Error) -> Self {
        let provider = ProviderKind::UserContent;
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ProviderError::Unavailable {
                    provider,
                    reason: err.to_string(),
                }
            }
            other => ProviderError::Backend {
                provider,
                reason: other.to_string(),
            },
        }
    }
}

/// One entry in [`ResolveError::AllSourcesUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub message: String,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

impl From<&ProviderError> for ProviderFailure {
    fn from(err: &ProviderError) -> Self {
        Self {
            provider: err.provider(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every provider on the read chain failed (or none is configured).
    #[error("no business source is reachable{}", summarize(.failures))]
    AllSourcesUnavailable { failures: Vec<ProviderFailure> },

    #[error("business '{id}' not found")]
    NotFound { id: String },

    /// The user content store failed during a mutation. Never retried or redirected.
    #[error("user content store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A mutation was requested but no user content store is configured.
    #[error("{operation} requires the user content store, which is not configured")]
    Unsupported { operation: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn summarize(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return " (no providers configured)".to_string();
    }
    let parts: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!(" ({})", parts.join("; "))
}
