//! In-memory fakes of the ingestion seams for unit tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use offerdb_core::{CanonicalOffer, RegionCode};
use offerdb_fetcher::{FetchError, RawOffer};

use crate::coordinator::IngestionCoordinator;
use crate::error::BoxError;
use crate::ports::{MarkerStore, OfferSource, OfferStore, RegionRegistry};

pub(crate) fn region(code: &str) -> RegionCode {
    RegionCode::parse(code).unwrap()
}

pub(crate) fn regions(codes: &[&str]) -> Vec<RegionCode> {
    codes.iter().map(|c| region(c)).collect()
}

pub(crate) fn raw_offer(id: &str, program_type: &str) -> RawOffer {
    RawOffer {
        id: Some(id.to_owned()),
        sales_program_type: Some(program_type.to_owned()),
        ..RawOffer::default()
    }
}

// ---------------------------------------------------------------------------
// Offer source
// ---------------------------------------------------------------------------

/// Serves fixed offers per region and records every call.
///
/// Regions without an explicit response get two offers. Tracks the peak
/// number of concurrent in-flight fetches.
#[derive(Default)]
pub(crate) struct FakeSource {
    offers: Mutex<HashMap<String, Vec<RawOffer>>>,
    failures: Mutex<HashMap<String, u16>>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl FakeSource {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_offers(&self, code: &str, offers: Vec<RawOffer>) {
        self.offers.lock().unwrap().insert(code.to_owned(), offers);
    }

    pub fn fail_with_status(&self, code: &str, status: u16) {
        self.failures.lock().unwrap().insert(code.to_owned(), status);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OfferSource for FakeSource {
    async fn fetch_offers(&self, region: &RegionCode) -> Result<Vec<RawOffer>, FetchError> {
        self.calls.lock().unwrap().push(region.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(status) = self.failures.lock().unwrap().get(region.as_str()) {
            return Err(FetchError::Remote {
                region: region.to_string(),
                status: *status,
                body: "fake failure".to_owned(),
            });
        }

        let offers = self.offers.lock().unwrap().get(region.as_str()).cloned();
        Ok(offers.unwrap_or_else(|| {
            vec![
                raw_offer(&format!("{region}-1"), "AcuraConquest"),
                raw_offer(&format!("{region}-2"), "LeaseSpecial"),
            ]
        }))
    }
}

// ---------------------------------------------------------------------------
// Offer store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeStore {
    pub rows: Mutex<HashMap<String, Vec<CanonicalOffer>>>,
    failing: Mutex<HashSet<String>>,
    pub writes: AtomicUsize,
}

impl FakeStore {
    pub fn fail_writes_for(&self, code: &str) {
        self.failing.lock().unwrap().insert(code.to_owned());
    }

    pub fn rows_for(&self, code: &str) -> Vec<CanonicalOffer> {
        self.rows
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.lock().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl OfferStore for FakeStore {
    async fn replace_region(
        &self,
        region: &RegionCode,
        offers: &[CanonicalOffer],
    ) -> Result<u64, BoxError> {
        if self.failing.lock().unwrap().contains(region.as_str()) {
            return Err("offer store unavailable".into());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .insert(region.to_string(), offers.to_vec());
        Ok(offers.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Marker store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeMarkers {
    pub values: Mutex<HashMap<String, DateTime<Utc>>>,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
}

impl FakeMarkers {
    pub fn value(&self, code: &str) -> Option<DateTime<Utc>> {
        self.values.lock().unwrap().get(code).copied()
    }

    pub fn preset(&self, code: &str, at: DateTime<Utc>) {
        self.values.lock().unwrap().insert(code.to_owned(), at);
    }
}

#[async_trait]
impl MarkerStore for FakeMarkers {
    async fn get(&self, region: &RegionCode) -> Result<Option<DateTime<Utc>>, BoxError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err("marker store unavailable".into());
        }
        Ok(self.value(region.as_str()))
    }

    async fn set(&self, region: &RegionCode, at: DateTime<Utc>) -> Result<(), BoxError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err("marker store unavailable".into());
        }
        self.preset(region.as_str(), at);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub(crate) struct FakeRegistry {
    regions: Vec<RegionCode>,
    fail: bool,
}

impl FakeRegistry {
    pub fn new(regions: Vec<RegionCode>) -> Self {
        Self {
            regions,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            regions: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RegionRegistry for FakeRegistry {
    async fn list_regions(&self) -> Result<Vec<RegionCode>, BoxError> {
        if self.fail {
            return Err("registry unavailable".into());
        }
        Ok(self.regions.clone())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub(crate) struct Harness {
    pub source: Arc<FakeSource>,
    pub store: Arc<FakeStore>,
    pub markers: Arc<FakeMarkers>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_source(FakeSource::default())
    }

    pub fn with_source(source: FakeSource) -> Self {
        Self {
            source: Arc::new(source),
            store: Arc::new(FakeStore::default()),
            markers: Arc::new(FakeMarkers::default()),
        }
    }

    pub fn coordinator(&self) -> IngestionCoordinator {
        IngestionCoordinator::new(
            self.source.clone(),
            self.store.clone(),
            self.markers.clone(),
        )
    }
}

/// Collects formatted log output from a scoped subscriber.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Installs a plain-text subscriber on the current thread until the
    /// returned guard drops.
    pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
