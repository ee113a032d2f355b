//! Loading the static fixture dataset from a YAML file.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::business::{Address, Business, Category, PriceTier, ProviderKind};
use crate::geo::Coordinate;
use crate::hours::WeeklyHours;
use crate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureBusiness {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub price_tier: PriceTier,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Address,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub hours: Option<WeeklyHours>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl FixtureBusiness {
    /// Converts into a [`Business`] tagged as a static fixture, stamped `now`.
    #[must_use]
    pub fn into_business(self, now: DateTime<Utc>) -> Business {
        let mut business = Business::new(
            self.id,
            self.name,
            self.category,
            self.price_tier,
            Coordinate::new(self.latitude, self.longitude),
            ProviderKind::StaticFixture,
            now,
        )
        .with_rating(self.rating, self.review_count);
        business.description = self.description;
        business.address = self.address;
        business.phone = self.phone;
        business.website = self.website;
        business.image_url = self.image_url;
        business.hours = self.hours.unwrap_or_default();
        business.amenities = self.amenities;
        business.is_verified = self.is_verified;
        business
    }
}

#[derive(Debug, Deserialize)]
pub struct FixturesFile {
    pub businesses: Vec<FixtureBusiness>,
}

/// Load and validate a fixture dataset from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_fixtures(path: &Path, now: DateTime<Utc>) -> Result<Vec<Business>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FixturesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_fixtures(&content, now)
}

/// Parse and validate a fixture dataset from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_fixtures(content: &str, now: DateTime<Utc>) -> Result<Vec<Business>, ConfigError> {
    let file: FixturesFile = serde_yaml::from_str(content)?;
    validate_fixtures(&file)?;
    Ok(file
        .businesses
        .into_iter()
        .map(|f| f.into_business(now))
        .collect())
}

fn validate_fixtures(file: &FixturesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for fixture in &file.businesses {
        if fixture.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "fixture '{}' has an empty id",
                fixture.name
            )));
        }
        if !seen_ids.insert(fixture.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate fixture id: '{}'",
                fixture.id
            )));
        }
        if fixture.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "fixture '{}' has an empty name",
                fixture.id
            )));
        }
        Coordinate::new(fixture.latitude, fixture.longitude)
            .validate()
            .map_err(|e| ConfigError::Validation(format!("fixture '{}': {e}", fixture.id)))?;
        if let Some(hours) = &fixture.hours {
            hours
                .validate()
                .map_err(|e| ConfigError::Validation(format!("fixture '{}': {e}", fixture.id)))?;
        }
    }

    Ok(())
}
