//! Database operations for the `region_codes` registry table.

use chrono::{DateTime, Utc};
use offerdb_core::RegionCode;
use sqlx::PgPool;

use crate::{is_unique_violation, DbError};

/// A row from the `region_codes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegionCodeRow {
    pub id: i64,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Returns every registered region code in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_region_codes(pool: &PgPool) -> Result<Vec<RegionCodeRow>, DbError> {
    let rows = sqlx::query_as::<_, RegionCodeRow>(
        "SELECT id, code, created_at FROM region_codes ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single region code row, or `None` if the code is not registered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_region_code(
    pool: &PgPool,
    code: &RegionCode,
) -> Result<Option<RegionCodeRow>, DbError> {
    let row = sqlx::query_as::<_, RegionCodeRow>(
        "SELECT id, code, created_at FROM region_codes WHERE code = $1",
    )
    .bind(code.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Registers a new region code.
///
/// # Errors
///
/// Returns [`DbError::AlreadyExists`] if the code is already registered, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_region_code(pool: &PgPool, code: &RegionCode) -> Result<RegionCodeRow, DbError> {
    sqlx::query_as::<_, RegionCodeRow>(
        "INSERT INTO region_codes (code) VALUES ($1) \
         ON CONFLICT (code) DO NOTHING \
         RETURNING id, code, created_at",
    )
    .bind(code.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::AlreadyExists(format!("region code {code}")))
}

/// Changes a registered code to `new_code`.
///
/// Stored offers and markers are keyed by the code string and are not
/// rewritten; the next ingestion for `new_code` starts without a marker.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `code` is not registered,
/// [`DbError::AlreadyExists`] if `new_code` is taken, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn rename_region_code(
    pool: &PgPool,
    code: &RegionCode,
    new_code: &RegionCode,
) -> Result<RegionCodeRow, DbError> {
    let result = sqlx::query_as::<_, RegionCodeRow>(
        "UPDATE region_codes SET code = $2 WHERE code = $1 \
         RETURNING id, code, created_at",
    )
    .bind(code.as_str())
    .bind(new_code.as_str())
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(DbError::NotFound),
        Err(e) if is_unique_violation(&e) => {
            Err(DbError::AlreadyExists(format!("region code {new_code}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Removes a region code from the registry.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the code is not registered, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_region_code(pool: &PgPool, code: &RegionCode) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM region_codes WHERE code = $1")
        .bind(code.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
