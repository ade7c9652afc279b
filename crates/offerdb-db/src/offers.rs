//! Database operations for the `offers` table.

use chrono::{DateTime, Utc};
use offerdb_core::{CanonicalOffer, RegionCode};
use sqlx::{PgPool, Postgres};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `offers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub region_code: String,
    pub offer_id: String,
    pub model_year: String,
    pub start_date: String,
    pub end_date: String,
    pub is_featured: bool,
    pub sales_program_name: String,
    pub sales_program_type: String,
    pub model_group_name: String,
    pub photo_url: String,
    pub description: String,
    pub series_item_name: String,
    pub tab: String,
    pub created_at: DateTime<Utc>,
}

/// Optional equality filters for [`list_offers`]. `None` fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    pub region_code: Option<RegionCode>,
    pub tab: Option<String>,
    pub sales_program_type: Option<String>,
    pub model_year: Option<String>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Replaces every stored offer for `region` with `offers`.
///
/// The delete and the bulk insert run in one transaction, so readers see
/// either the previous set or the new one, never an empty or doubled region.
/// Both statements are scoped to `region`; rows of other regions are never
/// touched. An empty `offers` slice clears the region.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::RegionMismatch`] if any offer belongs to a different
/// region (nothing is written), or [`DbError::Sqlx`] if any statement fails
/// (the transaction is rolled back).
pub async fn replace_region_offers(
    pool: &PgPool,
    region: &RegionCode,
    offers: &[CanonicalOffer],
) -> Result<u64, DbError> {
    if let Some(stray) = offers.iter().find(|o| &o.region_code != region) {
        return Err(DbError::RegionMismatch {
            expected: region.to_string(),
            found: stray.region_code.to_string(),
        });
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM offers WHERE region_code = $1")
        .bind(region.as_str())
        .execute(&mut *tx)
        .await?;

    let inserted = if offers.is_empty() {
        0
    } else {
        insert_offer_batch(&mut tx, region, offers).await?
    };

    tx.commit().await?;
    Ok(inserted)
}

/// Bulk-inserts `offers` in one `INSERT … SELECT … FROM UNNEST(…)` round-trip.
async fn insert_offer_batch(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    region: &RegionCode,
    offers: &[CanonicalOffer],
) -> Result<u64, sqlx::Error> {
    // Collect each column into a parallel Vec for UNNEST binding.
    let mut offer_ids: Vec<&str> = Vec::with_capacity(offers.len());
    let mut model_years: Vec<&str> = Vec::with_capacity(offers.len());
    let mut start_dates: Vec<&str> = Vec::with_capacity(offers.len());
    let mut end_dates: Vec<&str> = Vec::with_capacity(offers.len());
    let mut featured: Vec<bool> = Vec::with_capacity(offers.len());
    let mut program_names: Vec<&str> = Vec::with_capacity(offers.len());
    let mut program_types: Vec<&str> = Vec::with_capacity(offers.len());
    let mut group_names: Vec<&str> = Vec::with_capacity(offers.len());
    let mut photo_urls: Vec<&str> = Vec::with_capacity(offers.len());
    let mut descriptions: Vec<&str> = Vec::with_capacity(offers.len());
    let mut series_names: Vec<&str> = Vec::with_capacity(offers.len());
    let mut tabs: Vec<&str> = Vec::with_capacity(offers.len());
    let mut created_ats: Vec<DateTime<Utc>> = Vec::with_capacity(offers.len());

    for offer in offers {
        offer_ids.push(&offer.offer_id);
        model_years.push(&offer.model_year);
        start_dates.push(&offer.start_date);
        end_dates.push(&offer.end_date);
        featured.push(offer.is_featured);
        program_names.push(&offer.sales_program_name);
        program_types.push(&offer.sales_program_type);
        group_names.push(&offer.model_group_name);
        photo_urls.push(&offer.photo_url);
        descriptions.push(&offer.description);
        series_names.push(&offer.series_item_name);
        tabs.push(&offer.tab);
        created_ats.push(offer.created_at);
    }

    let result = sqlx::query(
        "INSERT INTO offers \
             (region_code, offer_id, model_year, start_date, end_date, is_featured, \
              sales_program_name, sales_program_type, model_group_name, photo_url, \
              description, series_item_name, tab, created_at) \
         SELECT $1, * FROM UNNEST(\
              $2::text[], $3::text[], $4::text[], $5::text[], $6::bool[], \
              $7::text[], $8::text[], $9::text[], $10::text[], \
              $11::text[], $12::text[], $13::text[], $14::timestamptz[])",
    )
    .bind(region.as_str())
    .bind(&offer_ids)
    .bind(&model_years)
    .bind(&start_dates)
    .bind(&end_dates)
    .bind(&featured)
    .bind(&program_names)
    .bind(&program_types)
    .bind(&group_names)
    .bind(&photo_urls)
    .bind(&descriptions)
    .bind(&series_names)
    .bind(&tabs)
    .bind(&created_ats)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Lists stored offers matching `filter`, ordered by region then offer id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_offers(pool: &PgPool, filter: &OfferFilter) -> Result<Vec<OfferRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferRow>(
        "SELECT id, region_code, offer_id, model_year, start_date, end_date, is_featured, \
                sales_program_name, sales_program_type, model_group_name, photo_url, \
                description, series_item_name, tab, created_at \
         FROM offers \
         WHERE ($1::TEXT IS NULL OR region_code = $1) \
           AND ($2::TEXT IS NULL OR tab = $2) \
           AND ($3::TEXT IS NULL OR sales_program_type = $3) \
           AND ($4::TEXT IS NULL OR model_year = $4) \
         ORDER BY region_code, offer_id, id \
         LIMIT COALESCE($5, 9223372036854775807)",
    )
    .bind(filter.region_code.as_ref().map(RegionCode::as_str))
    .bind(filter.tab.as_deref())
    .bind(filter.sales_program_type.as_deref())
    .bind(filter.model_year.as_deref())
    .bind(filter.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the number of offers currently stored for `region`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_offers_for_region(pool: &PgPool, region: &RegionCode) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE region_code = $1")
        .bind(region.as_str())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
