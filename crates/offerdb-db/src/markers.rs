//! Per-region ingestion markers stored in `ingestion_markers`.
//!
//! Each call checks out its own pooled connection and hands it back when the
//! guard drops, on success and error paths alike. Nothing is held between
//! calls.

use chrono::{DateTime, Utc};
use offerdb_core::RegionCode;
use sqlx::PgPool;

use crate::DbError;

/// Returns when `region` was last ingested successfully, or `None` if it
/// never has been.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the query
/// fails.
pub async fn get_marker(
    pool: &PgPool,
    region: &RegionCode,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let mut conn = pool.acquire().await?;

    let epoch_secs: Option<i64> = sqlx::query_scalar(
        "SELECT last_update FROM ingestion_markers WHERE marker_key = $1",
    )
    .bind(region.marker_key())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(epoch_secs.and_then(|secs| DateTime::from_timestamp(secs, 0)))
}

/// Records `at` as the last successful ingestion of `region`, overwriting
/// any previous marker.
///
/// Markers have whole-second precision. A fractional `at` is rounded up, so
/// the stored marker is never earlier than `at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the upsert
/// fails.
pub async fn set_marker(pool: &PgPool, region: &RegionCode, at: DateTime<Utc>) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        "INSERT INTO ingestion_markers (marker_key, last_update) VALUES ($1, $2) \
         ON CONFLICT (marker_key) DO UPDATE SET \
             last_update = EXCLUDED.last_update, \
             updated_at  = NOW()",
    )
    .bind(region.marker_key())
    .bind(ceil_epoch_secs(at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn ceil_epoch_secs(at: DateTime<Utc>) -> i64 {
    at.timestamp() + i64::from(at.timestamp_subsec_nanos() > 0)
}
