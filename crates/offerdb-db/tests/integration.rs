//! Offline tests for offerdb-db pool configuration, row types, and filters.
//! These tests do not require a live database connection.

use offerdb_core::{AppConfig, Environment, RegionCode};
use offerdb_db::{DbError, IngestionRunRow, OfferFilter, OfferRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: "127.0.0.1:8000".parse().unwrap(),
        log_level: "info".to_string(),
        log_file: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        offers_endpoint: "http://localhost/specials".to_string(),
        user_agent: "ua".to_string(),
        request_timeout_secs: 30,
        max_workers: 5,
        region_timeout_secs: 0,
        schedule: "0 0 0 * * *".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn offer_filter_default_matches_everything() {
    let filter = OfferFilter::default();
    assert!(filter.region_code.is_none());
    assert!(filter.tab.is_none());
    assert!(filter.sales_program_type.is_none());
    assert!(filter.model_year.is_none());
    assert!(filter.limit.is_none());
}

#[test]
fn region_mismatch_error_names_both_regions() {
    let err = DbError::RegionMismatch {
        expected: RegionCode::parse("97230").unwrap().to_string(),
        found: "10001".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("97230"), "{message}");
    assert!(message.contains("10001"), "{message}");
}

/// Compile-time smoke test: confirm that [`IngestionRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn ingestion_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = IngestionRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        regions_processed: 0_i32,
        offers_written: 0_i64,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
    assert_eq!(row.regions_processed, 0);
    assert!(row.error_message.is_none());
}

/// Compile-time smoke test: confirm that [`OfferRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn offer_row_has_expected_fields() {
    use chrono::Utc;

    let row = OfferRow {
        id: 42_i64,
        region_code: "97230".to_string(),
        offer_id: "X1".to_string(),
        model_year: "2024".to_string(),
        start_date: String::new(),
        end_date: String::new(),
        is_featured: false,
        sales_program_name: String::new(),
        sales_program_type: "AcuraLoyaltyAppreciation".to_string(),
        model_group_name: String::new(),
        photo_url: String::new(),
        description: String::new(),
        series_item_name: String::new(),
        tab: "Special Program".to_string(),
        created_at: Utc::now(),
    };

    assert_eq!(row.region_code, "97230");
    assert_eq!(row.offer_id, "X1");
    assert_eq!(row.tab, "Special Program");
    assert!(!row.is_featured);
}
