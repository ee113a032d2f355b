//! Pure filter and sort combinators over in-memory business lists.
//!
//! Every provider that filters client-side goes through [`apply_search`], so
//! the semantics stay identical across adapters.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime};

use crate::business::{Business, Category, PriceTier};
use crate::geo::{haversine_distance_km, within_radius, Coordinate};
use crate::search::{SearchRequest, SortKey};

/// Keeps exactly the businesses whose category is in `categories`.
#[must_use]
pub fn filter_by_category(
    businesses: Vec<Business>,
    categories: &BTreeSet<Category>,
) -> Vec<Business> {
    businesses
        .into_iter()
        .filter(|b| categories.contains(&b.category))
        .collect()
}

/// Keeps exactly the businesses whose price tier is in `tiers`.
#[must_use]
pub fn filter_by_price(businesses: Vec<Business>, tiers: &BTreeSet<PriceTier>) -> Vec<Business> {
    businesses
        .into_iter()
        .filter(|b| tiers.contains(&b.price_tier))
        .collect()
}

#[must_use]
pub fn filter_by_min_rating(businesses: Vec<Business>, min_rating: f64) -> Vec<Business> {
    businesses
        .into_iter()
        .filter(|b| b.rating >= min_rating)
        .collect()
}

/// Keeps businesses whose hours table says they are open at local time `now`.
#[must_use]
pub fn filter_open_now(businesses: Vec<Business>, now: NaiveDateTime) -> Vec<Business> {
    let weekday = now.weekday();
    let time = now.time();
    businesses
        .into_iter()
        .filter(|b| b.hours.is_open_at(weekday, time))
        .collect()
}

#[must_use]
pub fn filter_within_radius(
    businesses: Vec<Business>,
    origin: Coordinate,
    radius_km: f64,
) -> Vec<Business> {
    businesses
        .into_iter()
        .filter(|b| within_radius(origin, b.location, radius_km))
        .collect()
}

/// Case-insensitive substring match against name, description, category,
/// city and amenities. An empty query matches everything.
#[must_use]
pub fn matches_query(business: &Business, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

    hit(&business.name)
        || hit(&business.description)
        || hit(business.category.label())
        || business.address.city.as_deref().is_some_and(hit)
        || business.amenities.iter().any(|a| hit(a))
}

/// Stable sort by `key`. Ties keep their input order.
///
/// [`SortKey::Distance`] needs `origin`; without one the list is left untouched.
pub fn sort_businesses(businesses: &mut [Business], key: SortKey, origin: Option<Coordinate>) {
    match key {
        SortKey::Relevance => {}
        SortKey::Rating => businesses.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::ReviewCount => businesses.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
        SortKey::Newest => businesses.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceAsc => businesses.sort_by_key(|b| b.price_tier.ordinal()),
        SortKey::PriceDesc => {
            businesses.sort_by(|a, b| b.price_tier.ordinal().cmp(&a.price_tier.ordinal()));
        }
        SortKey::Distance => {
            if let Some(origin) = origin {
                businesses.sort_by(|a, b| {
                    haversine_distance_km(origin, a.location)
                        .total_cmp(&haversine_distance_km(origin, b.location))
                });
            }
        }
    }
}

/// Runs the full client-side search pipeline: query, category, price,
/// minimum rating, open-now, radius, then sort.
///
/// Only the filters present in `request` are applied; callers restrict the
/// filter set to what their provider supports beforehand.
#[must_use]
pub fn apply_search(
    businesses: Vec<Business>,
    request: &SearchRequest,
    local_now: NaiveDateTime,
) -> Vec<Business> {
    let filters = &request.filters;

    let mut out: Vec<Business> = match request.trimmed_query() {
        Some(q) => businesses
            .into_iter()
            .filter(|b| matches_query(b, q))
            .collect(),
        None => businesses,
    };
    if !filters.categories.is_empty() {
        out = filter_by_category(out, &filters.categories);
    }
    if !filters.price_tiers.is_empty() {
        out = filter_by_price(out, &filters.price_tiers);
    }
    if let Some(min) = filters.min_rating {
        out = filter_by_min_rating(out, min);
    }
    if filters.open_now {
        out = filter_open_now(out, local_now);
    }
    if let Some(near) = filters.near {
        out = filter_within_radius(out, near.origin, near.radius_km);
    }

    sort_businesses(&mut out, request.sort_by, filters.near.map(|n| n.origin));
    out
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
