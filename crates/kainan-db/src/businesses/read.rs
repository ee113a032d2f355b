//! Read operations for the `businesses` table.

use sqlx::PgPool;

use super::types::BusinessRow;

/// One page of active businesses plus the total active count.
///
/// Ordered by `created_at DESC, id` so pages are stable when timestamps tie.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if either query fails.
pub async fn list_active_businesses(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<(Vec<BusinessRow>, i64), sqlx::Error> {
    let total: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM businesses WHERE is_active = TRUE")
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, BusinessRow>(concat!(
        "SELECT ",
        business_columns!(),
        " FROM businesses \
          WHERE is_active = TRUE \
          ORDER BY created_at DESC, id \
          LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Active businesses matching the equality/range filters the table can
/// answer directly. An empty `categories` or `price_tiers` slice means "any".
///
/// Text matching, open-now, radius and sorting are left to the caller.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn search_active_businesses(
    pool: &PgPool,
    categories: &[String],
    price_tiers: &[String],
    min_rating: Option<f64>,
) -> Result<Vec<BusinessRow>, sqlx::Error> {
    sqlx::query_as::<_, BusinessRow>(concat!(
        "SELECT ",
        business_columns!(),
        " FROM businesses \
          WHERE is_active = TRUE \
            AND (cardinality($1::text[]) = 0 OR category = ANY($1::text[])) \
            AND (cardinality($2::text[]) = 0 OR price_tier = ANY($2::text[])) \
            AND ($3::float8 IS NULL OR rating >= $3::float8) \
          ORDER BY created_at DESC, id"
    ))
    .bind(categories)
    .bind(price_tiers)
    .bind(min_rating)
    .fetch_all(pool)
    .await
}

/// Fetch a business by id regardless of its active flag.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_business(pool: &PgPool, id: &str) -> Result<Option<BusinessRow>, sqlx::Error> {
    sqlx::query_as::<_, BusinessRow>(concat!(
        "SELECT ",
        business_columns!(),
        " FROM businesses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// All businesses owned by `owner_id`, including soft-deleted ones so owners
/// can see and restore them.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_businesses_by_owner(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<BusinessRow>, sqlx::Error> {
    sqlx::query_as::<_, BusinessRow>(concat!(
        "SELECT ",
        business_columns!(),
        " FROM businesses \
          WHERE owner_id = $1 \
          ORDER BY created_at DESC, id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}
