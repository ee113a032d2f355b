//! Great-circle distance helpers shared by every provider adapter.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that latitude is within [-90, 90] and longitude within [-180, 180].
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range axis as a [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Great-circle distance between two points in kilometres.
///
/// Symmetric in its arguments and exactly `0.0` for identical points.
#[must_use]
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// `true` when `target` lies within `radius_km` of `origin` (inclusive).
#[must_use]
pub fn within_radius(origin: Coordinate, target: Coordinate, radius_km: f64) -> bool {
    haversine_distance_km(origin, target) <= radius_km
}
