//! Write operations for the `businesses` table.

use kainan_core::{Business, BusinessPatch, NewBusiness, ProviderKind};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::BusinessRow;

/// Insert an owner-submitted business. The id and both timestamps are
/// assigned here / by the database; the row is returned as stored.
///
/// Callers are expected to have run [`NewBusiness::validate`].
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails (including CHECK violations).
pub async fn insert_business(pool: &PgPool, new: &NewBusiness) -> Result<BusinessRow, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let amenities: Vec<String> = new.amenities.iter().cloned().collect();

    sqlx::query_as::<_, BusinessRow>(concat!(
        "INSERT INTO businesses \
             (id, name, description, category, price_tier, latitude, longitude, \
              street, city, state, country, postal_code, phone, website, image_url, \
              hours, amenities, owner_id, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19) \
         RETURNING ",
        business_columns!()
    ))
    .bind(&id)
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(new.category.as_str())
    .bind(new.price_tier.as_str())
    .bind(new.location.latitude)
    .bind(new.location.longitude)
    .bind(&new.address.street)
    .bind(&new.address.city)
    .bind(&new.address.state)
    .bind(&new.address.country)
    .bind(&new.address.postal_code)
    .bind(&new.phone)
    .bind(&new.website)
    .bind(&new.image_url)
    .bind(Json(new.hours_or_default()))
    .bind(&amenities)
    .bind(&new.owner_id)
    .bind(ProviderKind::UserContent.as_str())
    .fetch_one(pool)
    .await
}

/// Apply a partial update. Absent patch fields keep the stored value; a
/// present `address` replaces every address column. Bumps `updated_at`.
///
/// Returns `None` when no row has this id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn update_business(
    pool: &PgPool,
    id: &str,
    patch: &BusinessPatch,
) -> Result<Option<BusinessRow>, sqlx::Error> {
    let address = patch.address.as_ref();
    let amenities: Option<Vec<String>> = patch
        .amenities
        .as_ref()
        .map(|set| set.iter().cloned().collect());

    sqlx::query_as::<_, BusinessRow>(concat!(
        "UPDATE businesses SET \
             name        = COALESCE($2, name), \
             description = COALESCE($3, description), \
             category    = COALESCE($4, category), \
             price_tier  = COALESCE($5, price_tier), \
             latitude    = COALESCE($6, latitude), \
             longitude   = COALESCE($7, longitude), \
             street      = CASE WHEN $8::boolean THEN $9::text ELSE street END, \
             city        = CASE WHEN $8::boolean THEN $10::text ELSE city END, \
             state       = CASE WHEN $8::boolean THEN $11::text ELSE state END, \
             country     = CASE WHEN $8::boolean THEN $12::text ELSE country END, \
             postal_code = CASE WHEN $8::boolean THEN $13::text ELSE postal_code END, \
             phone       = COALESCE($14, phone), \
             website     = COALESCE($15, website), \
             image_url   = COALESCE($16, image_url), \
             hours       = COALESCE($17, hours), \
             amenities   = COALESCE($18::text[], amenities), \
             is_active   = COALESCE($19, is_active), \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING ",
        business_columns!()
    ))
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.description)
    .bind(patch.category.map(kainan_core::Category::as_str))
    .bind(patch.price_tier.map(kainan_core::PriceTier::as_str))
    .bind(patch.location.map(|c| c.latitude))
    .bind(patch.location.map(|c| c.longitude))
    .bind(address.is_some())
    .bind(address.and_then(|a| a.street.clone()))
    .bind(address.and_then(|a| a.city.clone()))
    .bind(address.and_then(|a| a.state.clone()))
    .bind(address.and_then(|a| a.country.clone()))
    .bind(address.and_then(|a| a.postal_code.clone()))
    .bind(&patch.phone)
    .bind(&patch.website)
    .bind(&patch.image_url)
    .bind(patch.hours.clone().map(Json))
    .bind(amenities)
    .bind(patch.is_active)
    .fetch_optional(pool)
    .await
}

/// Soft-delete a business by clearing `is_active`.
///
/// Idempotent: returns `true` whenever the row exists (even if it was already
/// inactive) and `false` when no row has this id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn deactivate_business(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query(
        "UPDATE businesses \
         SET is_active = FALSE, \
             updated_at = CASE WHEN is_active THEN NOW() ELSE updated_at END \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Set the admin-moderated `is_verified` flag. Returns `None` when absent.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn set_business_verified(
    pool: &PgPool,
    id: &str,
    verified: bool,
) -> Result<Option<BusinessRow>, sqlx::Error> {
    sqlx::query_as::<_, BusinessRow>(concat!(
        "UPDATE businesses \
         SET is_verified = $2, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING ",
        business_columns!()
    ))
    .bind(id)
    .bind(verified)
    .fetch_optional(pool)
    .await
}

/// Cache a remote directory record.
///
/// Inserts new ids and refreshes previously cached ones, keeping their
/// `created_at`, `is_active` and `is_verified`. A row with a non-null
/// `owner_id` has been claimed by an owner and is never overwritten.
///
/// Returns `true` if a row was inserted or refreshed, `false` if the id
/// belongs to an owner-claimed record.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the upsert fails.
pub async fn upsert_cached_business(pool: &PgPool, business: &Business) -> Result<bool, sqlx::Error> {
    let amenities: Vec<String> = business.amenities.iter().cloned().collect();
    let review_count = i32::try_from(business.review_count).unwrap_or(i32::MAX);

    let rows_affected = sqlx::query(
        "INSERT INTO businesses \
             (id, name, description, category, price_tier, latitude, longitude, \
              street, city, state, country, postal_code, phone, website, image_url, \
              hours, amenities, rating, review_count, source) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19, $20) \
         ON CONFLICT (id) DO UPDATE SET \
             name         = EXCLUDED.name, \
             description  = EXCLUDED.description, \
             category     = EXCLUDED.category, \
             price_tier   = EXCLUDED.price_tier, \
             latitude     = EXCLUDED.latitude, \
             longitude    = EXCLUDED.longitude, \
             street       = EXCLUDED.street, \
             city         = EXCLUDED.city, \
             state        = EXCLUDED.state, \
             country      = EXCLUDED.country, \
             postal_code  = EXCLUDED.postal_code, \
             phone        = EXCLUDED.phone, \
             website      = EXCLUDED.website, \
             image_url    = EXCLUDED.image_url, \
             hours        = EXCLUDED.hours, \
             amenities    = EXCLUDED.amenities, \
             rating       = EXCLUDED.rating, \
             review_count = EXCLUDED.review_count, \
             updated_at   = NOW() \
         WHERE businesses.owner_id IS NULL",
    )
    .bind(&business.id)
    .bind(&business.name)
    .bind(&business.description)
    .bind(business.category.as_str())
    .bind(business.price_tier.as_str())
    .bind(business.location.latitude)
    .bind(business.location.longitude)
    .bind(&business.address.street)
    .bind(&business.address.city)
    .bind(&business.address.state)
    .bind(&business.address.country)
    .bind(&business.address.postal_code)
    .bind(&business.phone)
    .bind(&business.website)
    .bind(&business.image_url)
    .bind(Json(&business.hours))
    .bind(&amenities)
    .bind(kainan_core::clamp_rating(business.rating))
    .bind(review_count)
    .bind(business.source.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}
