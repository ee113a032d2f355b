pub mod app_config;
pub mod business;
pub mod config;
pub mod filter;
pub mod fixtures;
pub mod geo;
pub mod hours;
pub mod page;
pub mod search;

pub use app_config::{AppConfig, Environment};
pub use business::{
    clamp_rating, Address, Business, BusinessPatch, Category, NewBusiness, PriceTier,
    ProviderKind,
};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_SEARCH_CENTER};
pub use filter::{
    apply_search, filter_by_category, filter_by_min_rating, filter_by_price, filter_open_now,
    filter_within_radius, matches_query, sort_businesses,
};
pub use fixtures::{load_fixtures, parse_fixtures, FixtureBusiness, FixturesFile};
pub use geo::{haversine_distance_km, within_radius, Coordinate};
pub use hours::{DayHours, WeeklyHours};
pub use page::{PageRequest, PagedResult, Pagination, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use search::{FilterSupport, GeoFilter, SearchFilters, SearchRequest, SortKey};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read fixtures file {path}: {source}")]
    FixturesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixtures file: {0}")]
    FixturesFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Rejections raised when a business payload does not satisfy the model invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name must be non-empty")]
    EmptyName,

    #[error("name must be at most {max} characters, got {len}")]
    NameTooLong { len: usize, max: usize },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("rating {0} is outside [0, 5]")]
    RatingOutOfRange(f64),

    #[error("{day} hours value '{value}' is not HH:MM")]
    InvalidHours { day: &'static str, value: String },

    #[error("owner id must be non-empty")]
    EmptyOwner,

    #[error("search radius {0} km must be positive and finite")]
    InvalidRadius(f64),

    #[error("unknown {field} '{value}'")]
    UnknownVariant { field: &'static str, value: String },
}
