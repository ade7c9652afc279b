//! One-shot ingestion and run-history bookkeeping.
//!
//! Every invocation, from the CLI or the scheduler, is recorded as an
//! ingestion run with one result row per region.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use offerdb_core::{AppConfig, RegionCode};
use offerdb_fetcher::OffersClient;
use offerdb_ingest::{Dispatcher, IngestionCoordinator, IngestionSummary, PostgresStore};

/// Wires the production dispatcher from configuration.
///
/// # Errors
///
/// Returns an error if the offers client cannot be constructed.
pub(crate) fn build_dispatcher(
    pool: &sqlx::PgPool,
    config: &AppConfig,
) -> anyhow::Result<Dispatcher> {
    let client = OffersClient::new(
        &config.offers_endpoint,
        &config.user_agent,
        config.request_timeout_secs,
    )
    .context("failed to build offers client")?;

    let store = Arc::new(PostgresStore::new(pool.clone()));
    let region_timeout =
        (config.region_timeout_secs > 0).then(|| Duration::from_secs(config.region_timeout_secs));

    let coordinator = IngestionCoordinator::new(Arc::new(client), store.clone(), store.clone())
        .with_region_timeout(region_timeout);

    Ok(Dispatcher::new(
        store,
        Arc::new(coordinator),
        config.max_workers,
    ))
}

/// Runs one ingestion batch and records it in `ingestion_runs`.
///
/// With `region_filter` only that region is ingested (it need not be
/// registered) and any failure is returned as an error. Without it every
/// registered region is ingested; individual failures are recorded but only
/// a registry failure, or every region failing, is an error.
///
/// # Errors
///
/// Returns an error if the region filter is not a valid code, the run cannot
/// be recorded, the registry cannot be read, or the failure rules above
/// apply.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    region_filter: Option<&str>,
    trigger_source: &'static str,
) -> anyhow::Result<IngestionSummary> {
    let single = region_filter.map(RegionCode::parse).transpose()?;
    let dispatcher = build_dispatcher(pool, config)?;

    let run = offerdb_db::create_ingestion_run(pool, trigger_source).await?;
    if let Err(e) = offerdb_db::start_ingestion_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    let summary = match single {
        Some(region) => dispatcher.ingest_regions(vec![region]).await,
        None => match dispatcher.ingest_all().await {
            Ok(summary) => summary,
            Err(e) => {
                fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
                return Err(e.into());
            }
        },
    };

    record_region_outcomes(pool, run.id, &summary).await;

    if let Some(region) = region_filter {
        let first_failure = summary.failures().next().map(|(_, e)| format!("{e:#}"));
        if let Some(message) = first_failure {
            fail_run_best_effort(pool, run.id, message.clone()).await;
            anyhow::bail!("ingestion of region {region} failed: {message}");
        }
    }

    if summary.regions_processed > 0 && summary.failed() == summary.regions_processed {
        let message = format!("all {} regions failed ingestion", summary.regions_processed);
        fail_run_best_effort(pool, run.id, message.clone()).await;
        anyhow::bail!("{message}");
    }

    let regions_processed = i32::try_from(summary.regions_processed).unwrap_or(i32::MAX);
    let offers_written = i64::try_from(summary.offers_written()).unwrap_or(i64::MAX);
    if let Err(e) =
        offerdb_db::complete_ingestion_run(pool, run.id, regions_processed, offers_written).await
    {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    Ok(summary)
}

pub(crate) fn print_summary(summary: &IngestionSummary) {
    println!(
        "ingested {} region(s) with {} worker(s): {} succeeded, {} failed, {} offers written",
        summary.regions_processed,
        summary.workers,
        summary.succeeded(),
        summary.failed(),
        summary.offers_written()
    );
    for (region, error) in summary.failures() {
        println!("  {region}: {error}");
    }
}

/// Writes one `ingestion_run_regions` row per outcome. Errors are logged,
/// not propagated, so one bad row does not hide the rest.
async fn record_region_outcomes(pool: &sqlx::PgPool, run_id: i64, summary: &IngestionSummary) {
    for outcome in &summary.outcomes {
        let (status, offers_written, error) = match &outcome.result {
            Ok(report) => (
                "succeeded",
                i64::try_from(report.offers_written).unwrap_or(i64::MAX),
                None,
            ),
            Err(e) => ("failed", 0, Some(e.to_string())),
        };

        if let Err(e) = offerdb_db::upsert_ingestion_run_region(
            pool,
            run_id,
            &outcome.region,
            status,
            offers_written,
            error.as_deref(),
        )
        .await
        {
            tracing::error!(
                run_id,
                region = %outcome.region,
                error = %e,
                "failed to record region outcome"
            );
        }
    }
}

/// Attempt to mark an ingestion run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = offerdb_db::fail_ingestion_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark ingestion run as failed"
        );
    }
}
