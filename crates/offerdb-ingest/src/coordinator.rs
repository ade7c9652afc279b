//! Per-region ingestion: fetch, normalize, replace, mark.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use offerdb_core::RegionCode;
use offerdb_fetcher::normalize_offers;

use crate::error::IngestionError;
use crate::ports::{MarkerStore, OfferSource, OfferStore};

/// Whether a region had been ingested before this write.
///
/// The write itself is the same region-scoped replace-set either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// No marker existed.
    Initial,
    /// A marker existed; previous rows for the region were replaced.
    Refresh,
}

impl WriteMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    pub region: RegionCode,
    pub offers_written: u64,
    pub mode: WriteMode,
    /// Marker value read before the write.
    pub previous_update: Option<DateTime<Utc>>,
}

/// Runs the ingestion steps for one region at a time.
///
/// Steps are strictly sequential within a region. The marker is only set
/// after the offers are durably written, so a failed write is retried in
/// full on the next run.
pub struct IngestionCoordinator {
    source: Arc<dyn OfferSource>,
    store: Arc<dyn OfferStore>,
    markers: Arc<dyn MarkerStore>,
    region_timeout: Option<Duration>,
}

impl IngestionCoordinator {
    #[must_use]
    pub fn new(
        source: Arc<dyn OfferSource>,
        store: Arc<dyn OfferStore>,
        markers: Arc<dyn MarkerStore>,
    ) -> Self {
        Self {
            source,
            store,
            markers,
            region_timeout: None,
        }
    }

    /// Bounds each `ingest_region` call. `None` waits indefinitely.
    #[must_use]
    pub fn with_region_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.region_timeout = timeout;
        self
    }

    /// Ingests the current offers of `region`.
    ///
    /// # Errors
    ///
    /// - [`IngestionError::FetchFailed`]: nothing was written.
    /// - [`IngestionError::MarkerRead`]: nothing was written.
    /// - [`IngestionError::StoreWrite`]: the previous offers remain; marker untouched.
    /// - [`IngestionError::MarkerWrite`]: offers replaced, marker stale.
    /// - [`IngestionError::TimedOut`]: the region deadline elapsed. Any
    ///   in-flight store transaction is dropped and rolled back.
    pub async fn ingest_region(&self, region: &RegionCode) -> Result<RegionReport, IngestionError> {
        let Some(limit) = self.region_timeout else {
            return self.run_region(region).await;
        };

        tokio::time::timeout(limit, self.run_region(region))
            .await
            .map_err(|_| IngestionError::TimedOut {
                region: region.clone(),
                timeout_secs: limit.as_secs(),
            })?
    }

    async fn run_region(&self, region: &RegionCode) -> Result<RegionReport, IngestionError> {
        let raw = self
            .source
            .fetch_offers(region)
            .await
            .map_err(|source| IngestionError::FetchFailed {
                region: region.clone(),
                source,
            })?;

        let offers = normalize_offers(raw, region, Utc::now());

        let previous_update =
            self.markers
                .get(region)
                .await
                .map_err(|source| IngestionError::MarkerRead {
                    region: region.clone(),
                    source,
                })?;
        let mode = if previous_update.is_some() {
            WriteMode::Refresh
        } else {
            WriteMode::Initial
        };

        let offers_written = self
            .store
            .replace_region(region, &offers)
            .await
            .map_err(|source| IngestionError::StoreWrite {
                region: region.clone(),
                source,
            })?;

        self.markers
            .set(region, Utc::now())
            .await
            .map_err(|source| IngestionError::MarkerWrite {
                region: region.clone(),
                source,
            })?;

        tracing::debug!(
            region = %region,
            offers_written,
            mode = mode.as_str(),
            "region ingested"
        );

        Ok(RegionReport {
            region: region.clone(),
            offers_written,
            mode,
            previous_update,
        })
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
