//! Normalization of Places API results into [`Business`] records.

use chrono::{DateTime, Utc};
use kainan_core::{Address, Business, Category, Coordinate, PriceTier, ProviderKind};

use crate::types::PlaceResult;

/// Name keywords checked in order; the first hit wins. Checked before the
/// Places `types`, which are too coarse to tell a carinderia from a sushi bar.
const NAME_KEYWORDS: &[(&[&str], Category)] = &[
    (&["seafood", "fish", "talabahan", "shrimp"], Category::Seafood),
    (&["sushi", "ramen", "japanese", "izakaya"], Category::Japanese),
    (&["korean", "samgyup", "samgyupsal", "kimchi"], Category::Korean),
    (&["chinese", "dimsum", "dim sum", "lauriat"], Category::Chinese),
    (&["pizza", "pasta", "italian", "trattoria"], Category::Italian),
    (&["burger", "steak", "diner", "american"], Category::American),
    (&["vegan", "vegetarian", "veggie"], Category::Vegetarian),
    (&["dessert", "ice cream", "halo-halo", "gelato"], Category::Dessert),
    (&["buffet", "eat-all-you-can", "unlimited"], Category::Buffet),
    (&["bakeshop", "bakery", "bread", "pandesal"], Category::Bakery),
    (&["cafe", "café", "coffee", "tea house"], Category::Cafe),
    (
        &["jollibee", "mcdonald", "chowking", "greenwich", "kfc", "mang inasal"],
        Category::FastFood,
    ),
    (
        &["lechon", "inasal", "carinderia", "kainan", "lutong bahay", "filipino", "batchoy"],
        Category::Filipino,
    ),
    (&["bar", "pub", "grill & bar"], Category::Bar),
];

/// Places `types` fallbacks when no name keyword matched.
const TYPE_CATEGORIES: &[(&str, Category)] = &[
    ("cafe", Category::Cafe),
    ("bakery", Category::Bakery),
    ("bar", Category::Bar),
    ("night_club", Category::Bar),
    ("meal_takeaway", Category::FastFood),
];

/// Infers a [`Category`] from the place name and its Places `types`.
///
/// Falls back to [`Category::Other`].
#[must_use]
pub fn infer_category(types: &[String], name: &str) -> Category {
    let name = name.to_lowercase();
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();

    let hit = |keyword: &str| {
        if keyword.contains(' ') || keyword.contains('&') {
            name.contains(keyword)
        } else {
            words.iter().any(|w| {
                let stem = w.strip_suffix("'s").unwrap_or(*w);
                stem == keyword || stem.strip_suffix('s') == Some(keyword)
            })
        }
    };

    if let Some((_, category)) = NAME_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|&k| hit(k)))
    {
        return *category;
    }

    TYPE_CATEGORIES
        .iter()
        .find(|(t, _)| types.iter().any(|pt| pt == t))
        .map_or(Category::Other, |(_, category)| *category)
}

/// Converts a Places result into a [`Business`].
///
/// Returns `None` for results without geometry (they cannot be placed on a
/// map) and for places Google marks `CLOSED_PERMANENTLY`.
#[must_use]
pub fn normalize_place(place: PlaceResult, now: DateTime<Utc>) -> Option<Business> {
    let location = place.geometry.as_ref().map(|g| g.location)?;
    let location = Coordinate::new(location.lat, location.lng);
    if location.validate().is_err() {
        tracing::debug!(place_id = %place.place_id, "dropping place with invalid coordinates");
        return None;
    }
    if place.business_status.as_deref() == Some("CLOSED_PERMANENTLY") {
        tracing::debug!(place_id = %place.place_id, "dropping permanently closed place");
        return None;
    }

    let category = infer_category(&place.types, &place.name);
    let price_tier = place
        .price_level
        .and_then(PriceTier::from_price_level)
        .unwrap_or(PriceTier::Budget);

    let street = place
        .formatted_address
        .clone()
        .or_else(|| place.vicinity.clone())
        .filter(|s| !s.trim().is_empty());
    let city = place.vicinity.as_deref().and_then(city_from_vicinity);

    let mut business = Business::new(
        place.place_id,
        place.name,
        category,
        price_tier,
        location,
        ProviderKind::RemoteDirectory,
        now,
    )
    .with_rating(
        place.rating.unwrap_or_default(),
        place.user_ratings_total.unwrap_or_default(),
    );

    business.description = place
        .editorial_summary
        .and_then(|s| s.overview)
        .unwrap_or_default();
    business.address = Address {
        street,
        city,
        ..Address::default()
    };
    business.phone = place
        .formatted_phone_number
        .or(place.international_phone_number);
    business.website = place.website;

    Some(business)
}

/// Normalizes a page of results, dropping those [`normalize_place`] rejects.
#[must_use]
pub fn normalize_places(places: Vec<PlaceResult>, now: DateTime<Utc>) -> Vec<Business> {
    let total = places.len();
    let businesses: Vec<Business> = places
        .into_iter()
        .filter_map(|p| normalize_place(p, now))
        .collect();
    if businesses.len() < total {
        tracing::debug!(
            total,
            kept = businesses.len(),
            "dropped unusable Places results"
        );
    }
    businesses
}

/// `vicinity` is `"<street>, <locality>"`; the last segment is the town.
fn city_from_vicinity(vicinity: &str) -> Option<String> {
    let (_, last) = vicinity.rsplit_once(',')?;
    let last = last.trim();
    (!last.is_empty()).then(|| last.to_owned())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
