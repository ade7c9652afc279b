//! Recurring ingestion on a cron schedule.
//!
//! Builds a [`JobScheduler`] with one ingestion job on `OFFERDB_SCHEDULE`
//! and keeps it alive until Ctrl-C or SIGTERM. The cron expression is
//! evaluated in the host's local time zone.

use std::sync::Arc;

use offerdb_core::AppConfig;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Runs the scheduler in the foreground until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if migrations fail, the schedule expression is invalid,
/// or the scheduler cannot start or stop cleanly.
pub(crate) async fn run_scheduler(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<()> {
    offerdb_db::run_migrations(&pool).await?;

    let schedule = config.schedule.clone();
    let mut scheduler = build_scheduler(pool, config).await?;
    tracing::info!(schedule = %schedule, "scheduler: started");

    shutdown_signal().await;
    scheduler.shutdown().await?;
    tracing::info!("scheduler: stopped");
    Ok(())
}

/// Builds and starts the job scheduler.
///
/// The returned handle must be kept alive; dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_ingest_job(&scheduler, pool, config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring all-regions ingestion job.
async fn register_ingest_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    scheduler.add(ingest_job(pool, config)?).await?;
    Ok(())
}

/// Builds the all-regions ingestion job on `config.schedule`, in local time.
fn ingest_job(pool: PgPool, config: Arc<AppConfig>) -> Result<Job, JobSchedulerError> {
    let schedule = config.schedule.clone();
    let pool = Arc::new(pool);

    Job::new_async_tz(schedule.as_str(), chrono::Local, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting offer ingestion run");
            match crate::ingest::run_ingest(&pool, &config, None, "scheduler").await {
                Ok(summary) => tracing::info!(
                    regions_processed = summary.regions_processed,
                    succeeded = summary.succeeded(),
                    failed = summary.failed(),
                    "scheduler: offer ingestion run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: offer ingestion run failed"),
            }
        })
    })
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(schedule: &str) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            database_url: "postgres://localhost/offerdb_test".to_string(),
            env: offerdb_core::Environment::Test,
            bind_addr: "127.0.0.1:8000".parse().unwrap(),
            log_level: "info".to_string(),
            log_file: None,
            db_max_connections: 1,
            db_min_connections: 0,
            db_acquire_timeout_secs: 1,
            offers_endpoint: "http://localhost/specials".to_string(),
            user_agent: "offerdb-test/0.1".to_string(),
            request_timeout_secs: 5,
            max_workers: 5,
            region_timeout_secs: 0,
            schedule: schedule.to_string(),
        })
    }

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/offerdb_test").expect("lazy pool")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_schedule_is_rejected() {
        let result = build_scheduler(lazy_pool(), test_config("every day at noon")).await;
        assert!(result.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn daily_schedule_builds_and_shuts_down() {
        let mut scheduler = build_scheduler(lazy_pool(), test_config("0 0 0 * * *"))
            .await
            .expect("scheduler should start");
        scheduler.shutdown().await.expect("scheduler should stop");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn daily_schedule_fires_at_local_midnight() {
        use chrono::{Local, TimeZone, Timelike};

        let mut job = ingest_job(lazy_pool(), test_config("0 0 0 * * *")).expect("job");
        let next_tick = job.job_data().expect("job data").next_tick;
        let next = Local
            .timestamp_opt(i64::try_from(next_tick).expect("epoch fits i64"), 0)
            .single()
            .expect("unambiguous local time");

        assert_eq!((next.hour(), next.minute(), next.second()), (0, 0, 0));
        assert!(next > Local::now());
    }
}
