//! Read-only commands: raw fetch preview, stored offers, run history.

use anyhow::Context;
use offerdb_core::{AppConfig, RegionCode};
use offerdb_db::OfferFilter;
use offerdb_fetcher::OffersClient;

/// Format an optional timestamp for display, returning `"—"` when `None`.
fn fmt_ts(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Fetch the current offers for one region and print them as JSON.
/// Nothing is written to the database.
///
/// # Errors
///
/// Returns an error if the region code is invalid, the client cannot be
/// built, or the fetch fails.
pub(crate) async fn run_fetch(config: &AppConfig, region: &str) -> anyhow::Result<()> {
    let region = RegionCode::parse(region)?;
    let client = OffersClient::new(
        &config.offers_endpoint,
        &config.user_agent,
        config.request_timeout_secs,
    )
    .context("failed to build offers client")?;

    let offers = client.fetch_offers(&region).await?;
    println!("{}", serde_json::to_string_pretty(&offers)?);
    eprintln!("{} offer(s) for region {region}", offers.len());
    Ok(())
}

/// Build an [`OfferFilter`] from command-line arguments.
///
/// # Errors
///
/// Returns an error if `region` is not a valid region code or `limit` is
/// not positive.
pub(crate) fn offer_filter(
    region: Option<&str>,
    tab: Option<String>,
    sales_program_type: Option<String>,
    model_year: Option<String>,
    limit: i64,
) -> anyhow::Result<OfferFilter> {
    if limit < 1 {
        anyhow::bail!("--limit must be at least 1");
    }
    Ok(OfferFilter {
        region_code: region.map(RegionCode::parse).transpose()?,
        tab,
        sales_program_type,
        model_year,
        limit: Some(limit),
    })
}

/// Print stored offers matching `filter` as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_offers(pool: &sqlx::PgPool, filter: &OfferFilter) -> anyhow::Result<()> {
    let offers = offerdb_db::list_offers(pool, filter).await?;

    if offers.is_empty() {
        println!("no offers found");
        return Ok(());
    }

    println!(
        "{:<8}{:<14}{:<6}{:<18}{:<28}TAB",
        "REGION", "OFFER", "YEAR", "MODEL", "PROGRAM"
    );
    for offer in &offers {
        println!(
            "{:<8}{:<14}{:<6}{:<18}{:<28}{}",
            offer.region_code,
            offer.offer_id,
            offer.model_year,
            offer.model_group_name,
            offer.sales_program_type,
            offer.tab
        );
    }

    if filter.limit.is_some_and(|limit| offers.len() as i64 >= limit) {
        eprintln!("note: limit reached; use --limit to show more");
    }

    Ok(())
}

/// Print the most recent ingestion runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = offerdb_db::list_ingestion_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no ingestion runs recorded");
        return Ok(());
    }

    println!(
        "{:<7}{:<11}{:<11}{:<21}{:<21}{:>8}{:>8}",
        "ID", "TRIGGER", "STATUS", "STARTED", "COMPLETED", "REGIONS", "OFFERS"
    );
    for run in &runs {
        println!(
            "{:<7}{:<11}{:<11}{:<21}{:<21}{:>8}{:>8}",
            run.id,
            run.trigger_source,
            run.status,
            fmt_ts(run.started_at),
            fmt_ts(run.completed_at),
            run.regions_processed,
            run.offers_written
        );
    }

    Ok(())
}

/// Print one ingestion run with its per-region results.
///
/// # Errors
///
/// Returns an error if the run does not exist or the query fails.
pub(crate) async fn run_show_run(pool: &sqlx::PgPool, id: i64) -> anyhow::Result<()> {
    let run = offerdb_db::get_ingestion_run(pool, id)
        .await
        .with_context(|| format!("ingestion run {id} not found"))?;
    let regions = offerdb_db::list_ingestion_run_regions(pool, id).await?;

    println!("Run {} ({})", run.id, run.public_id);
    println!("Trigger: {}", run.trigger_source);
    println!("Status: {}", run.status);
    println!("Started: {}", fmt_ts(run.started_at));
    println!("Completed: {}", fmt_ts(run.completed_at));
    println!(
        "Regions: {} | Offers written: {}",
        run.regions_processed, run.offers_written
    );
    if let Some(message) = &run.error_message {
        println!("Error: {message}");
    }

    if !regions.is_empty() {
        println!();
        println!("{:<10}{:<11}{:>8}  ERROR", "REGION", "STATUS", "OFFERS");
        for region in &regions {
            println!(
                "{:<10}{:<11}{:>8}  {}",
                region.region_code,
                region.status,
                region.offers_written,
                region.error_message.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}
