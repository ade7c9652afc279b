use offerdb_core::RegionCode;
use offerdb_fetcher::FetchError;
use thiserror::Error;

/// Error type carried across the store seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum IngestionError {
    /// The region list could not be read. The only batch-level failure.
    #[error("failed to read region registry: {0}")]
    Registry(#[source] BoxError),

    /// Nothing was written for the region.
    #[error("fetching offers for region {region} failed: {source}")]
    FetchFailed {
        region: RegionCode,
        #[source]
        source: FetchError,
    },

    /// The marker could not be read; nothing was written.
    #[error("reading marker for region {region} failed: {source}")]
    MarkerRead {
        region: RegionCode,
        #[source]
        source: BoxError,
    },

    /// The replace-set was rolled back; the marker was not touched.
    #[error("writing offers for region {region} failed: {source}")]
    StoreWrite {
        region: RegionCode,
        #[source]
        source: BoxError,
    },

    /// Offers were written but the marker is stale.
    #[error("updating marker for region {region} failed: {source}")]
    MarkerWrite {
        region: RegionCode,
        #[source]
        source: BoxError,
    },

    #[error("ingestion of region {region} exceeded {timeout_secs}s")]
    TimedOut { region: RegionCode, timeout_secs: u64 },
}

impl IngestionError {
    /// Region the failure belongs to; `None` for [`IngestionError::Registry`].
    #[must_use]
    pub fn region(&self) -> Option<&RegionCode> {
        match self {
            Self::Registry(_) => None,
            Self::FetchFailed { region, .. }
            | Self::MarkerRead { region, .. }
            | Self::StoreWrite { region, .. }
            | Self::MarkerWrite { region, .. }
            | Self::TimedOut { region, .. } => Some(region),
        }
    }

    /// Short machine-friendly label, used in logs and run history.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(_) => "registry",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::MarkerRead { .. } => "marker_read",
            Self::StoreWrite { .. } => "store_write",
            Self::MarkerWrite { .. } => "marker_write",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}
