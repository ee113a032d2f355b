//! Database operations for the `businesses` table.

/// Column list shared by every `SELECT` / `RETURNING` so rows always decode
/// into [`BusinessRow`].
macro_rules! business_columns {
    () => {
        "id, name, description, category, price_tier, latitude, longitude, \
         street, city, state, country, postal_code, phone, website, image_url, \
         hours, amenities, is_verified, is_active, owner_id, rating, review_count, \
         source, created_at, updated_at"
    };
}

mod read;
mod types;
mod write;

pub use read::{
    get_business, list_active_businesses, list_businesses_by_owner, search_active_businesses,
};
pub use types::BusinessRow;
pub use write::{
    deactivate_business, insert_business, set_business_verified, update_business,
    upsert_cached_business,
};
