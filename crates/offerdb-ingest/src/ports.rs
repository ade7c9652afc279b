//! Seams between the ingestion core and its collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use offerdb_core::{CanonicalOffer, RegionCode};
use offerdb_fetcher::{FetchError, RawOffer};

use crate::error::BoxError;

#[async_trait]
pub trait RegionRegistry: Send + Sync {
    async fn list_regions(&self) -> Result<Vec<RegionCode>, BoxError>;
}

#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn fetch_offers(&self, region: &RegionCode) -> Result<Vec<RawOffer>, FetchError>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Atomically replaces every stored offer of `region` with `offers` and
    /// returns the number written. Must not touch other regions.
    async fn replace_region(
        &self,
        region: &RegionCode,
        offers: &[CanonicalOffer],
    ) -> Result<u64, BoxError>;
}

#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// `Ok(None)` when the region has never been ingested.
    async fn get(&self, region: &RegionCode) -> Result<Option<DateTime<Utc>>, BoxError>;

    async fn set(&self, region: &RegionCode, at: DateTime<Utc>) -> Result<(), BoxError>;
}
