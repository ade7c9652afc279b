//! Region-partitioned offer ingestion.
//!
//! [`Dispatcher`] fans [`IngestionCoordinator::ingest_region`] out over every
//! registered region with a bounded number of workers. The coordinator talks
//! to its collaborators only through the traits in [`ports`]; [`adapters`]
//! binds them to Postgres and the HTTP offers client.

pub mod adapters;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use adapters::PostgresStore;
pub use coordinator::{IngestionCoordinator, RegionReport, WriteMode};
pub use dispatcher::{worker_count, Dispatcher, IngestionSummary, RegionOutcome, DEFAULT_MAX_WORKERS};
pub use error::{BoxError, IngestionError};
pub use ports::{MarkerStore, OfferSource, OfferStore, RegionRegistry};
