mod ingest;
mod query;
mod regions;
mod scheduler;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::regions::RegionsCommands;

#[derive(Debug, Parser)]
#[command(name = "offerdb-cli")]
#[command(about = "Regional promotional-offer ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage the region-code registry
    Regions {
        #[command(subcommand)]
        command: RegionsCommands,
    },
    /// Print the raw offers for one region without storing them
    Fetch {
        /// Region code to fetch (e.g., 97230)
        #[arg(long)]
        region: String,
    },
    /// Ingest offers once, for every registered region or a single one
    Ingest {
        /// Ingest only this region; any failure exits non-zero
        #[arg(long)]
        region: Option<String>,
    },
    /// Run ingestion on `OFFERDB_SCHEDULE` until interrupted
    Schedule,
    /// List stored offers
    Offers {
        #[arg(long)]
        region: Option<String>,
        /// Display tab (e.g., "Special Program")
        #[arg(long)]
        tab: Option<String>,
        /// Sales program type (e.g., AcuraConquest)
        #[arg(long)]
        program_type: Option<String>,
        #[arg(long)]
        model_year: Option<String>,
        /// Maximum number of offers to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Show recent ingestion runs, or one run in detail
    Runs {
        /// Show per-region results for this run id
        #[arg(long)]
        id: Option<i64>,
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("offerdb-cli: no command given (see --help)");
        return Ok(());
    };

    let config = offerdb_core::load_app_config()?;
    init_tracing(&config)?;

    match command {
        Commands::Fetch { region } => query::run_fetch(&config, &region).await?,
        Commands::Schedule => {
            let pool = connect(&config).await?;
            scheduler::run_scheduler(pool, Arc::new(config)).await?;
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    offerdb_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = offerdb_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Commands::Regions { command } => {
            let pool = connect(&config).await?;
            regions::run_regions(&pool, command).await?;
        }
        Commands::Ingest { region } => {
            let pool = connect(&config).await?;
            let summary = ingest::run_ingest(&pool, &config, region.as_deref(), "cli").await?;
            ingest::print_summary(&summary);
        }
        Commands::Offers {
            region,
            tab,
            program_type,
            model_year,
            limit,
        } => {
            let filter =
                query::offer_filter(region.as_deref(), tab, program_type, model_year, limit)?;
            let pool = connect(&config).await?;
            query::run_offers(&pool, &filter).await?;
        }
        Commands::Runs { id, limit } => {
            let pool = connect(&config).await?;
            match id {
                Some(id) => query::run_show_run(&pool, id).await?,
                None => query::run_list_runs(&pool, limit).await?,
            }
        }
    }

    Ok(())
}

async fn connect(config: &offerdb_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = offerdb_db::PoolConfig::from_app_config(config);
    offerdb_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")
}

/// Installs the global subscriber: stderr always, plus `log_file` when set.
fn init_tracing(config: &offerdb_core::AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests;
