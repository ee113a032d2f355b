use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::hours::WeeklyHours;
use crate::ValidationError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Filipino,
    Seafood,
    Cafe,
    FastFood,
    Bakery,
    Chinese,
    Japanese,
    Korean,
    Italian,
    American,
    Vegetarian,
    Dessert,
    Bar,
    Buffet,
    Other,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Filipino,
        Category::Seafood,
        Category::Cafe,
        Category::FastFood,
        Category::Bakery,
        Category::Chinese,
        Category::Japanese,
        Category::Korean,
        Category::Italian,
        Category::American,
        Category::Vegetarian,
        Category::Dessert,
        Category::Bar,
        Category::Buffet,
        Category::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Filipino => "filipino",
            Category::Seafood => "seafood",
            Category::Cafe => "cafe",
            Category::FastFood => "fast_food",
            Category::Bakery => "bakery",
            Category::Chinese => "chinese",
            Category::Japanese => "japanese",
            Category::Korean => "korean",
            Category::Italian => "italian",
            Category::American => "american",
            Category::Vegetarian => "vegetarian",
            Category::Dessert => "dessert",
            Category::Bar => "bar",
            Category::Buffet => "buffet",
            Category::Other => "other",
        }
    }

    /// Human-readable label, also matched by free-text search.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Filipino => "Filipino",
            Category::Seafood => "Seafood",
            Category::Cafe => "Cafe",
            Category::FastFood => "Fast Food",
            Category::Bakery => "Bakery",
            Category::Chinese => "Chinese",
            Category::Japanese => "Japanese",
            Category::Korean => "Korean",
            Category::Italian => "Italian",
            Category::American => "American",
            Category::Vegetarian => "Vegetarian",
            Category::Dessert => "Dessert",
            Category::Bar => "Bar",
            Category::Buffet => "Buffet",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "category",
                value: s.to_owned(),
            })
    }
}

/// Four price tiers, ordered cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    Moderate,
    Expensive,
    Luxury,
}

impl PriceTier {
    pub const ALL: [PriceTier; 4] = [
        PriceTier::Budget,
        PriceTier::Moderate,
        PriceTier::Expensive,
        PriceTier::Luxury,
    ];

    /// 1-based ordinal used for price sorting.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            PriceTier::Budget => 1,
            PriceTier::Moderate => 2,
            PriceTier::Expensive => 3,
            PriceTier::Luxury => 4,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Expensive => "$$$",
            PriceTier::Luxury => "$$$$",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceTier::Budget => "budget",
            PriceTier::Moderate => "moderate",
            PriceTier::Expensive => "expensive",
            PriceTier::Luxury => "luxury",
        }
    }

    /// Maps a directory `price_level` (0 = free … 4 = very expensive).
    #[must_use]
    pub fn from_price_level(level: u8) -> Option<Self> {
        match level {
            0 | 1 => Some(PriceTier::Budget),
            2 => Some(PriceTier::Moderate),
            3 => Some(PriceTier::Expensive),
            4 => Some(PriceTier::Luxury),
            _ => None,
        }
    }

    /// Inverse of [`PriceTier::from_price_level`], used when querying the directory.
    #[must_use]
    pub fn price_level(self) -> u8 {
        self.ordinal()
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PriceTier::ALL
            .into_iter()
            .find(|t| t.symbol() == trimmed || t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "price_tier",
                value: s.to_owned(),
            })
    }
}

/// Which backend produced a [`Business`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    RemoteDirectory,
    UserContent,
    StaticFixture,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::RemoteDirectory => "remote_directory",
            ProviderKind::UserContent => "user_content",
            ProviderKind::StaticFixture => "static_fixture",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote_directory" => Ok(ProviderKind::RemoteDirectory),
            "user_content" => Ok(ProviderKind::UserContent),
            "static_fixture" => Ok(ProviderKind::StaticFixture),
            other => Err(ValidationError::UnknownVariant {
                field: "source",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Assigned by whichever provider created the record; unique only within that provider.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price_tier: PriceTier,
    pub location: Coordinate,
    #[serde(default)]
    pub address: Address,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub hours: WeeklyHours,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub owner_id: Option<String>,
    /// Always within [0, 5].
    pub rating: f64,
    pub review_count: u32,
    pub source: ProviderKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// A bare active record with default hours and no rating, stamped `now`.
    ///
    /// Adapters fill the remaining attributes from their own source data.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        price_tier: PriceTier,
        location: Coordinate,
        source: ProviderKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            price_tier,
            location,
            address: Address::default(),
            phone: None,
            website: None,
            image_url: None,
            hours: WeeklyHours::default(),
            amenities: BTreeSet::new(),
            is_verified: false,
            is_active: true,
            owner_id: None,
            rating: 0.0,
            review_count: 0,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style rating setter that enforces the [0, 5] range.
    #[must_use]
    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = clamp_rating(rating);
        self.review_count = review_count;
        self
    }
}

/// Clamps an upstream rating into [0, 5]; NaN becomes 0.
#[must_use]
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, MAX_RATING)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Owner-submitted payload for a new listing. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBusiness {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub price_tier: PriceTier,
    pub location: Coordinate,
    #[serde(default)]
    pub address: Address,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    /// Falls back to [`WeeklyHours::default`] when omitted.
    pub hours: Option<WeeklyHours>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    pub owner_id: String,
}

impl NewBusiness {
    /// # Errors
    ///
    /// Returns the first invariant the payload violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        self.location.validate()?;
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        if let Some(hours) = &self.hours {
            hours.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn hours_or_default(&self) -> WeeklyHours {
        self.hours.clone().unwrap_or_default()
    }
}

/// Partial update: `None` keeps the stored value, `Some` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price_tier: Option<PriceTier>,
    pub location: Option<Coordinate>,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub hours: Option<WeeklyHours>,
    pub amenities: Option<BTreeSet<String>>,
    pub is_active: Option<bool>,
}

impl BusinessPatch {
    /// # Errors
    ///
    /// Returns the first invariant a present field violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        if let Some(hours) = &self.hours {
            hours.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies every present field to `business` and bumps `updated_at`.
    pub fn apply(&self, business: &mut Business, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            business.name = name.trim().to_owned();
        }
        if let Some(description) = &self.description {
            business.description.clone_from(description);
        }
        if let Some(category) = self.category {
            business.category = category;
        }
        if let Some(price_tier) = self.price_tier {
            business.price_tier = price_tier;
        }
        if let Some(location) = self.location {
            business.location = location;
        }
        if let Some(address) = &self.address {
            business.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            business.phone = Some(phone.clone());
        }
        if let Some(website) = &self.website {
            business.website = Some(website.clone());
        }
        if let Some(image_url) = &self.image_url {
            business.image_url = Some(image_url.clone());
        }
        if let Some(hours) = &self.hours {
            business.hours = hours.clone();
        }
        if let Some(amenities) = &self.amenities {
            business.amenities = amenities.clone();
        }
        if let Some(is_active) = self.is_active {
            business.is_active = is_active;
        }
        business.updated_at = now;
    }
}

#[cfg(test)]
#[path = "business_test.rs"]
mod tests;
