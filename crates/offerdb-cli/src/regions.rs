//! Region-code registry commands.

use anyhow::Context;
use clap::Subcommand;
use offerdb_core::RegionCode;

/// Sub-commands available under `regions`.
#[derive(Debug, Subcommand)]
pub enum RegionsCommands {
    /// List registered region codes
    List,
    /// Register a region code
    Add {
        /// Region code (e.g., 97230)
        code: String,
    },
    /// Show a region with its marker and stored offer count
    Show { code: String },
    /// Change a registered region code
    Rename { from: String, to: String },
    /// Unregister a region code. Stored offers are kept
    Remove { code: String },
}

/// Dispatch a `regions` sub-command.
///
/// # Errors
///
/// Returns an error if a code is invalid, the region does not exist (or
/// already exists, for `add`/`rename`), or a database query fails.
pub(crate) async fn run_regions(
    pool: &sqlx::PgPool,
    command: RegionsCommands,
) -> anyhow::Result<()> {
    match command {
        RegionsCommands::List => {
            let rows = offerdb_db::list_region_codes(pool).await?;
            if rows.is_empty() {
                println!("no regions registered");
            }
            for row in &rows {
                println!("{}", row.code);
            }
        }
        RegionsCommands::Add { code } => {
            let code = RegionCode::parse(&code)?;
            let row = offerdb_db::create_region_code(pool, &code).await?;
            println!("registered region {} (id {})", row.code, row.id);
        }
        RegionsCommands::Show { code } => {
            let code = RegionCode::parse(&code)?;
            let row = offerdb_db::get_region_code(pool, &code)
                .await?
                .ok_or_else(|| anyhow::anyhow!("region '{code}' is not registered"))?;
            let marker = offerdb_db::get_marker(pool, &code).await?;
            let offers = offerdb_db::count_offers_for_region(pool, &code).await?;

            println!("Region: {}", row.code);
            println!("Registered: {}", row.created_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "Last update: {}",
                marker.map_or_else(
                    || "never".to_string(),
                    |at| at.format("%Y-%m-%d %H:%M:%S").to_string()
                )
            );
            println!("Stored offers: {offers}");
        }
        RegionsCommands::Rename { from, to } => {
            let from = RegionCode::parse(&from)?;
            let to = RegionCode::parse(&to)?;
            offerdb_db::rename_region_code(pool, &from, &to)
                .await
                .with_context(|| format!("failed to rename region {from}"))?;
            println!("renamed region {from} to {to}");
        }
        RegionsCommands::Remove { code } => {
            let code = RegionCode::parse(&code)?;
            offerdb_db::delete_region_code(pool, &code)
                .await
                .with_context(|| format!("failed to remove region {code}"))?;
            println!("removed region {code}");
        }
    }

    Ok(())
}
