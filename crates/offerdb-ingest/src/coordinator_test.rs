use std::sync::atomic::Ordering;

use chrono::TimeZone;

use super::*;
use crate::test_support::{raw_offer, region, FakeSource, Harness};

// -----------------------------------------------------------------------
// Happy path and marker semantics
// -----------------------------------------------------------------------

#[tokio::test]
async fn first_ingestion_is_initial_and_sets_marker() {
    let harness = Harness::new();
    let start = Utc::now();

    let report = harness
        .coordinator()
        .ingest_region(&region("97230"))
        .await
        .unwrap();

    assert_eq!(report.mode, WriteMode::Initial);
    assert_eq!(report.offers_written, 2);
    assert!(report.previous_update.is_none());

    let marker = harness.markers.value("97230").expect("marker should be set");
    assert!(marker >= start);
}

#[tokio::test]
async fn existing_marker_makes_write_a_refresh() {
    let harness = Harness::new();
    let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    harness.markers.preset("97230", earlier);

    let report = harness
        .coordinator()
        .ingest_region(&region("97230"))
        .await
        .unwrap();

    assert_eq!(report.mode, WriteMode::Refresh);
    assert_eq!(report.previous_update, Some(earlier));
    assert!(harness.markers.value("97230").unwrap() > earlier);
}

#[tokio::test]
async fn stored_offers_carry_region_tab_and_one_batch_timestamp() {
    let harness = Harness::new();
    harness.source.set_offers(
        "10001",
        vec![
            raw_offer("A", "AcuraLoyaltyAppreciation"),
            raw_offer("B", "FinanceSpecial"),
            raw_offer("C", "AcuraConquest"),
        ],
    );

    harness
        .coordinator()
        .ingest_region(&region("10001"))
        .await
        .unwrap();

    let rows = harness.store.rows_for("10001");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|o| o.region_code.as_str() == "10001"));
    assert!(rows.iter().all(|o| o.created_at == rows[0].created_at));
    let tabs: Vec<&str> = rows.iter().map(|o| o.tab.as_str()).collect();
    assert_eq!(tabs, ["Special Program", "FinanceSpecial", "Special Program"]);
}

// -----------------------------------------------------------------------
// Idempotence
// -----------------------------------------------------------------------

#[tokio::test]
async fn reingesting_unchanged_data_converges() {
    let harness = Harness::new();
    let coordinator = harness.coordinator();

    coordinator.ingest_region(&region("97230")).await.unwrap();
    let first: Vec<String> = harness
        .store
        .rows_for("97230")
        .into_iter()
        .map(|o| o.offer_id)
        .collect();

    let second_report = coordinator.ingest_region(&region("97230")).await.unwrap();
    let second: Vec<String> = harness
        .store
        .rows_for("97230")
        .into_iter()
        .map(|o| o.offer_id)
        .collect();

    assert_eq!(first, second);
    assert_eq!(second_report.mode, WriteMode::Refresh);
    assert_eq!(harness.store.total_rows(), 2);
}

#[tokio::test]
async fn empty_fetch_clears_region_and_still_sets_marker() {
    let harness = Harness::new();
    let coordinator = harness.coordinator();
    coordinator.ingest_region(&region("97230")).await.unwrap();

    harness.source.set_offers("97230", Vec::new());
    let report = coordinator.ingest_region(&region("97230")).await.unwrap();

    assert_eq!(report.offers_written, 0);
    assert!(harness.store.rows_for("97230").is_empty());
    assert!(harness.markers.value("97230").is_some());
}

// -----------------------------------------------------------------------
// Failure semantics
// -----------------------------------------------------------------------

#[tokio::test]
async fn fetch_failure_writes_nothing() {
    let harness = Harness::new();
    harness.source.fail_with_status("10001", 500);

    let err = harness
        .coordinator()
        .ingest_region(&region("10001"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestionError::FetchFailed { ref source, .. } if source.status() == Some(500)
    ));
    assert_eq!(harness.store.writes.load(Ordering::SeqCst), 0);
    assert!(harness.markers.value("10001").is_none());
}

#[tokio::test]
async fn marker_read_failure_aborts_before_write() {
    let harness = Harness::new();
    harness.markers.fail_get.store(true, Ordering::SeqCst);

    let err = harness
        .coordinator()
        .ingest_region(&region("97230"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "marker_read");
    assert_eq!(harness.store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_leaves_marker_untouched() {
    let harness = Harness::new();
    let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    harness.markers.preset("97230", earlier);
    harness.store.fail_writes_for("97230");

    let err = harness
        .coordinator()
        .ingest_region(&region("97230"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::StoreWrite { .. }));
    assert_eq!(harness.markers.value("97230"), Some(earlier));
}

#[tokio::test]
async fn marker_write_failure_keeps_written_offers() {
    let harness = Harness::new();
    harness.markers.fail_set.store(true, Ordering::SeqCst);

    let err = harness
        .coordinator()
        .ingest_region(&region("97230"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::MarkerWrite { .. }));
    assert_eq!(harness.store.rows_for("97230").len(), 2);
    assert!(harness.markers.value("97230").is_none());
}

#[tokio::test]
async fn region_deadline_yields_timed_out() {
    let harness = Harness::with_source(FakeSource::with_delay(Duration::from_millis(200)));
    let coordinator = harness
        .coordinator()
        .with_region_timeout(Some(Duration::from_millis(20)));

    let err = coordinator
        .ingest_region(&region("97230"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::TimedOut { .. }));
    assert_eq!(err.region().map(RegionCode::as_str), Some("97230"));
    assert_eq!(harness.store.writes.load(Ordering::SeqCst), 0);
}
