//! Production bindings of the [`crate::ports`] traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use offerdb_core::{CanonicalOffer, RegionCode};
use offerdb_fetcher::{FetchError, OffersClient, RawOffer};
use sqlx::PgPool;

use crate::error::BoxError;
use crate::ports::{MarkerStore, OfferSource, OfferStore, RegionRegistry};

/// Registry, offer store, and marker store backed by one Postgres pool.
///
/// Every call checks a connection out of the pool for its own duration only.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionRegistry for PostgresStore {
    /// Lists registered regions in registration order. Stored codes that no
    /// longer parse are skipped with a warning.
    async fn list_regions(&self) -> Result<Vec<RegionCode>, BoxError> {
        let rows = offerdb_db::list_region_codes(&self.pool).await?;
        let regions = rows
            .into_iter()
            .filter_map(|row| match RegionCode::parse(&row.code) {
                Ok(region) => Some(region),
                Err(e) => {
                    tracing::warn!(
                        id = row.id,
                        code = %row.code,
                        error = %e,
                        "skipping invalid region code"
                    );
                    None
                }
            })
            .collect();
        Ok(regions)
    }
}

#[async_trait]
impl OfferStore for PostgresStore {
    async fn replace_region(
        &self,
        region: &RegionCode,
        offers: &[CanonicalOffer],
    ) -> Result<u64, BoxError> {
        Ok(offerdb_db::replace_region_offers(&self.pool, region, offers).await?)
    }
}

#[async_trait]
impl MarkerStore for PostgresStore {
    async fn get(&self, region: &RegionCode) -> Result<Option<DateTime<Utc>>, BoxError> {
        Ok(offerdb_db::get_marker(&self.pool, region).await?)
    }

    async fn set(&self, region: &RegionCode, at: DateTime<Utc>) -> Result<(), BoxError> {
        offerdb_db::set_marker(&self.pool, region, at).await?;
        Ok(())
    }
}

#[async_trait]
impl OfferSource for OffersClient {
    async fn fetch_offers(&self, region: &RegionCode) -> Result<Vec<RawOffer>, FetchError> {
        OffersClient::fetch_offers(self, region).await
    }
}
