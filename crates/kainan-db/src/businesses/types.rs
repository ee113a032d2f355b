//! Row type for the `businesses` table.

use chrono::{DateTime, Utc};
use kainan_core::{Address, Business, Coordinate, WeeklyHours};
use sqlx::types::Json;

use crate::DbError;

/// A row from the `businesses` table. Enum columns are stored as their
/// snake_case text form and parsed in [`BusinessRow::into_business`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_tier: String,
    pub latitude: f64,
    pub longitude: f64,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub hours: Json<WeeklyHours>,
    pub amenities: Vec<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub owner_id: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessRow {
    /// Converts the row into the domain [`Business`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if an enum column holds an unknown value.
    pub fn into_business(self) -> Result<Business, DbError> {
        let invalid = |id: &str, reason: String| DbError::InvalidRow {
            id: id.to_owned(),
            reason,
        };
        let category = self
            .category
            .parse()
            .map_err(|e: kainan_core::ValidationError| invalid(&self.id, e.to_string()))?;
        let price_tier = self
            .price_tier
            .parse()
            .map_err(|e: kainan_core::ValidationError| invalid(&self.id, e.to_string()))?;
        let source = self
            .source
            .parse()
            .map_err(|e: kainan_core::ValidationError| invalid(&self.id, e.to_string()))?;

        Ok(Business {
            id: self.id,
            name: self.name,
            description: self.description,
            category,
            price_tier,
            location: Coordinate::new(self.latitude, self.longitude),
            address: Address {
                street: self.street,
                city: self.city,
                state: self.state,
                country: self.country,
                postal_code: self.postal_code,
            },
            phone: self.phone,
            website: self.website,
            image_url: self.image_url,
            hours: self.hours.0,
            amenities: self.amenities.into_iter().collect(),
            is_verified: self.is_verified,
            is_active: self.is_active,
            owner_id: self.owner_id,
            rating: kainan_core::clamp_rating(self.rating),
            review_count: u32::try_from(self.review_count).unwrap_or(0),
            source,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
