//! Search request types and per-provider filter capabilities.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::business::{Category, PriceTier};
use crate::geo::Coordinate;
use crate::page::PageRequest;
use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFilter {
    pub origin: Coordinate,
    pub radius_km: f64,
}

/// Filter set for a search. Empty sets and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub categories: BTreeSet<Category>,
    #[serde(default)]
    pub price_tiers: BTreeSet<PriceTier>,
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub open_now: bool,
    pub near: Option<GeoFilter>,
}

/// Which [`SearchFilters`] fields a provider honours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSupport {
    pub category: bool,
    pub price_tier: bool,
    pub min_rating: bool,
    pub open_now: bool,
    pub near: bool,
}

impl FilterSupport {
    pub const ALL: FilterSupport = FilterSupport {
        category: true,
        price_tier: true,
        min_rating: true,
        open_now: true,
        near: true,
    };
}

impl SearchFilters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.price_tiers.is_empty()
            && self.min_rating.is_none()
            && !self.open_now
            && self.near.is_none()
    }

    /// Names of the active filters `support` cannot honour.
    #[must_use]
    pub fn ignored_by(&self, support: FilterSupport) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if !support.category && !self.categories.is_empty() {
            ignored.push("category");
        }
        if !support.price_tier && !self.price_tiers.is_empty() {
            ignored.push("price_tier");
        }
        if !support.min_rating && self.min_rating.is_some() {
            ignored.push("min_rating");
        }
        if !support.open_now && self.open_now {
            ignored.push("open_now");
        }
        if !support.near && self.near.is_some() {
            ignored.push("near");
        }
        ignored
    }

    /// Copy of these filters with every field `support` cannot honour cleared.
    #[must_use]
    pub fn restricted_to(&self, support: FilterSupport) -> SearchFilters {
        SearchFilters {
            categories: if support.category {
                self.categories.clone()
            } else {
                BTreeSet::new()
            },
            price_tiers: if support.price_tier {
                self.price_tiers.clone()
            } else {
                BTreeSet::new()
            },
            min_rating: self.min_rating.filter(|_| support.min_rating),
            open_now: self.open_now && support.open_now,
            near: self.near.filter(|_| support.near),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep the provider's order.
    #[default]
    Relevance,
    /// Highest rating first.
    Rating,
    /// Most reviewed first.
    ReviewCount,
    /// Most recently created first.
    Newest,
    PriceAsc,
    PriceDesc,
    /// Closest to the search origin first; no-op without one.
    Distance,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Rating => "rating",
            SortKey::ReviewCount => "review_count",
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Distance => "distance",
        }
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "rating" => Ok(SortKey::Rating),
            "review_count" | "reviews" => Ok(SortKey::ReviewCount),
            "newest" => Ok(SortKey::Newest),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "distance" => Ok(SortKey::Distance),
            _ => Err(ValidationError::UnknownVariant {
                field: "sort_by",
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub page: PageRequest,
}

impl SearchRequest {
    #[must_use]
    pub fn trimmed_query(&self) -> Option<&str> {
        let q = self.query.trim();
        (!q.is_empty()).then_some(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_filters() -> SearchFilters {
        SearchFilters {
            categories: BTreeSet::from([Category::Seafood]),
            price_tiers: BTreeSet::from([PriceTier::Budget]),
            min_rating: Some(4.0),
            open_now: true,
            near: Some(GeoFilter {
                origin: Coordinate::new(11.6894, 122.3670),
                radius_km: 2.0,
            }),
        }
    }

    #[test]
    fn restricted_to_clears_unsupported_fields() {
        let support = FilterSupport {
            category: false,
            open_now: false,
            ..FilterSupport::ALL
        };
        let restricted = all_filters().restricted_to(support);
        assert!(restricted.categories.is_empty());
        assert!(!restricted.open_now);
        assert_eq!(restricted.min_rating, Some(4.0));
        assert!(restricted.near.is_some());
        assert_eq!(restricted.price_tiers.len(), 1);
    }

    #[test]
    fn ignored_by_names_only_active_unsupported_filters() {
        let support = FilterSupport {
            category: false,
            near: false,
            ..FilterSupport::ALL
        };
        assert_eq!(all_filters().ignored_by(support), vec!["category", "near"]);
        assert!(SearchFilters::default().ignored_by(support).is_empty());
    }

    #[test]
    fn full_support_keeps_everything() {
        let filters = all_filters();
        assert_eq!(filters.restricted_to(FilterSupport::ALL), filters);
        assert!(filters.ignored_by(FilterSupport::ALL).is_empty());
    }

    #[test]
    fn sort_key_parses_known_values() {
        assert_eq!("rating".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert_eq!("Price_Desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert!("alphabetical".parse::<SortKey>().is_err());
        assert_eq!(SortKey::default(), SortKey::Relevance);
    }

    #[test]
    fn trimmed_query_treats_whitespace_as_empty() {
        let req = SearchRequest {
            query: "   ".to_string(),
            ..SearchRequest::default()
        };
        assert!(req.trimmed_query().is_none());
    }
}
