//! Database operations for `ingestion_runs` and `ingestion_run_regions`.

use chrono::{DateTime, Utc};
use offerdb_core::RegionCode;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `ingestion_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub regions_processed: i32,
    pub offers_written: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `ingestion_run_regions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestionRunRegionRow {
    pub id: i64,
    pub ingestion_run_id: i64,
    pub region_code: String,
    pub status: String,
    pub offers_written: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
                           regions_processed, offers_written, error_message, created_at";

// ---------------------------------------------------------------------------
// ingestion_runs operations
// ---------------------------------------------------------------------------

/// Creates a new ingestion run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingestion_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<IngestionRunRow, DbError> {
    let row = sqlx::query_as::<_, IngestionRunRow>(&format!(
        "INSERT INTO ingestion_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_ingestion_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a running run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_ingestion_run(
    pool: &PgPool,
    id: i64,
    regions_processed: i32,
    offers_written: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             regions_processed = $1, offers_written = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(regions_processed)
    .bind(offers_written)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a running run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingestion_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_ingestion_run(pool: &PgPool, id: i64) -> Result<IngestionRunRow, DbError> {
    sqlx::query_as::<_, IngestionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingestion_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingestion_runs(pool: &PgPool, limit: i64) -> Result<Vec<IngestionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingestion_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// ingestion_run_regions operations
// ---------------------------------------------------------------------------

/// Inserts or updates the per-region result row for a run.
///
/// Conflicts on `(ingestion_run_id, region_code)` overwrite the previous
/// status, count, and error in place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_ingestion_run_region(
    pool: &PgPool,
    run_id: i64,
    region: &RegionCode,
    status: &str,
    offers_written: i64,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO ingestion_run_regions \
             (ingestion_run_id, region_code, status, offers_written, error_message) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (ingestion_run_id, region_code) DO UPDATE SET \
             status         = EXCLUDED.status, \
             offers_written = EXCLUDED.offers_written, \
             error_message  = EXCLUDED.error_message",
    )
    .bind(run_id)
    .bind(region.as_str())
    .bind(status)
    .bind(offers_written)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns all region-level result rows for a run, ordered by region code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingestion_run_regions(
    pool: &PgPool,
    run_id: i64,
) -> Result<Vec<IngestionRunRegionRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestionRunRegionRow>(
        "SELECT id, ingestion_run_id, region_code, status, offers_written, \
                error_message, created_at \
         FROM ingestion_run_regions \
         WHERE ingestion_run_id = $1 \
         ORDER BY region_code",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
