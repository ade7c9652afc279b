//! Bounded fan-out of [`IngestionCoordinator`] over every registered region.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use offerdb_core::RegionCode;

use crate::coordinator::{IngestionCoordinator, RegionReport};
use crate::error::IngestionError;
use crate::ports::RegionRegistry;

pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Number of workers for a batch: `min(max_workers, regions)`.
///
/// `max_workers` below 1 is treated as 1. Zero regions yields zero workers.
#[must_use]
pub fn worker_count(max_workers: usize, regions: usize) -> usize {
    max_workers.max(1).min(regions)
}

/// Result of one region within a batch.
#[derive(Debug)]
pub struct RegionOutcome {
    pub region: RegionCode,
    pub result: Result<RegionReport, IngestionError>,
}

/// Aggregate report of one [`Dispatcher`] batch.
///
/// `outcomes` is in completion order, not registry order.
#[derive(Debug, Default)]
pub struct IngestionSummary {
    pub regions_processed: usize,
    pub workers: usize,
    pub outcomes: Vec<RegionOutcome>,
}

impl IngestionSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Total offers written across successful regions.
    #[must_use]
    pub fn offers_written(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|report| report.offers_written)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&RegionCode, &IngestionError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.region, e)))
    }
}

pub struct Dispatcher {
    registry: Arc<dyn RegionRegistry>,
    coordinator: Arc<IngestionCoordinator>,
    max_workers: usize,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<dyn RegionRegistry>,
        coordinator: Arc<IngestionCoordinator>,
        max_workers: usize,
    ) -> Self {
        Self {
            registry,
            coordinator,
            max_workers,
        }
    }

    /// Ingests every region in the registry.
    ///
    /// Waits for all regions to finish. A failing region is logged and
    /// recorded in the summary; it never stops its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Registry`] if the region list cannot be
    /// read. Per-region failures are reported through the summary instead.
    pub async fn ingest_all(&self) -> Result<IngestionSummary, IngestionError> {
        let regions = self
            .registry
            .list_regions()
            .await
            .map_err(IngestionError::Registry)?;
        Ok(self.ingest_regions(regions).await)
    }

    /// Ingests an explicit set of regions with the same concurrency bound.
    pub async fn ingest_regions(&self, regions: Vec<RegionCode>) -> IngestionSummary {
        let regions_processed = regions.len();
        let workers = worker_count(self.max_workers, regions_processed);

        if workers == 0 {
            tracing::info!(regions_processed, "no regions registered; nothing to ingest");
            return IngestionSummary::default();
        }

        let coordinator = self.coordinator.as_ref();
        let outcomes: Vec<RegionOutcome> = stream::iter(regions)
            .map(|region| async move {
                let result = coordinator.ingest_region(&region).await;
                RegionOutcome { region, result }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        let summary = IngestionSummary {
            regions_processed,
            workers,
            outcomes,
        };

        for (region, error) in summary.failures() {
            tracing::error!(
                region = %region,
                kind = error.kind(),
                error = %error,
                "region ingestion failed"
            );
        }

        tracing::info!(
            regions_processed,
            workers,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            offers_written = summary.offers_written(),
            "ingestion batch complete"
        );

        summary
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
