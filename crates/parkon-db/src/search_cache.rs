//! Database operations for the append-only `search_cache` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `search_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchCacheRow {
    pub id: i64,
    pub public_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub spot_type: Option<String>,
    pub max_price: Option<Decimal>,
    pub privilege: String,
    /// Full ranked result set, before the response cap.
    pub results: serde_json::Value,
    pub total_matched: i64,
    pub providers: serde_json::Value,
    pub cached_at: DateTime<Utc>,
}

/// Values for a new `search_cache` row.
#[derive(Debug, Clone)]
pub struct NewSearchCacheEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub spot_type: Option<String>,
    pub max_price: Option<Decimal>,
    pub privilege: String,
    pub results: serde_json::Value,
    pub total_matched: i64,
    pub providers: serde_json::Value,
    pub cached_at: DateTime<Utc>,
}

/// Appends one search to the cache and returns its `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_search_cache(
    pool: &PgPool,
    entry: &NewSearchCacheEntry,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO search_cache \
           (public_id, latitude, longitude, radius_km, spot_type, max_price, privilege, \
            results, total_matched, providers, cached_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(entry.latitude)
    .bind(entry.longitude)
    .bind(entry.radius_km)
    .bind(entry.spot_type.as_deref())
    .bind(entry.max_price)
    .bind(&entry.privilege)
    .bind(&entry.results)
    .bind(entry.total_matched)
    .bind(&entry.providers)
    .bind(entry.cached_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Total number of cached searches.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_search_cache(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM search_cache")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Most recent searches, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_search_cache(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<SearchCacheRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchCacheRow>(
        "SELECT id, public_id, latitude, longitude, radius_km, spot_type, max_price, \
                privilege, results, total_matched, providers, cached_at \
         FROM search_cache \
         ORDER BY cached_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes entries cached strictly before `older_than`. Returns the number
/// of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn prune_search_cache(pool: &PgPool, older_than: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM search_cache WHERE cached_at < $1")
        .bind(older_than)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
