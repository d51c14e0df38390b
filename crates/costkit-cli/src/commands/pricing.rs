use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use costkit_pricing::{refresh, PricingDatabase, RefreshOutcome, DEFAULT_TIMEOUT_SECS};
use costkit_report::{json as jreport, terminal};

use super::resolve_db_path;

#[derive(Args)]
pub struct PricingArgs {
    #[command(subcommand)]
    pub subcommand: PricingSubcommand,
}

#[derive(Subcommand)]
pub enum PricingSubcommand {
    /// List all pricing entries (builtin catalog + database overlays)
    List {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Pricing database path (defaults to ~/.costkit/pricing.json)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show one pricing entry; lists nearby identifiers when absent
    Show {
        /// Pricing identifier, e.g. gpt-4o-input
        identifier: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Pricing database path
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Fetch live pricing and persist it to the database
    Refresh {
        /// Pricing endpoint
        #[arg(long, env = "COSTKIT_PRICING_URL")]
        pricing_url: Option<String>,

        /// Fetch timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Refresh even if the database is within its TTL
        #[arg(long)]
        force: bool,

        /// Pricing database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

pub fn run(args: PricingArgs) -> Result<()> {
    match args.subcommand {
        PricingSubcommand::List { format, db } => {
            let db_path = resolve_db_path(db)?;
            let table = PricingDatabase::load(&db_path)?.to_table()?;
            match format.as_str() {
                "json" => println!("{}", jreport::render_pricing(&table)?),
                _ => terminal::print_pricing_list(&table),
            }
        }

        PricingSubcommand::Show {
            identifier,
            format,
            db,
        } => {
            let db_path = resolve_db_path(db)?;
            let table = PricingDatabase::load(&db_path)?.to_table()?;
            match table.lookup(&identifier) {
                Some(entry) if format == "json" => println!("{}", jreport::render_entry(entry)?),
                Some(entry) => terminal::print_entry(entry),
                None => {
                    println!(
                        "{} No pricing entry for '{}'",
                        "!".yellow(),
                        identifier.bold()
                    );
                    let query = identifier.to_lowercase();
                    let mut nearby: Vec<&str> = table
                        .identifiers()
                        .filter(|id| id.contains(&query) || query.contains(*id))
                        .take(10)
                        .collect();
                    if nearby.is_empty() {
                        nearby = table.identifiers().take(10).collect();
                    }
                    println!("\nAvailable identifiers:");
                    for id in nearby {
                        println!("  · {}", id);
                    }
                }
            }
        }

        PricingSubcommand::Refresh {
            pricing_url,
            timeout_secs,
            force,
            db,
        } => {
            let url = pricing_url.ok_or_else(|| {
                anyhow::anyhow!("no pricing URL; pass --pricing-url or set COSTKIT_PRICING_URL")
            })?;
            let db_path = resolve_db_path(db)?;
            let mut database = PricingDatabase::load(&db_path)?;
            let mut table = database.to_table()?;

            eprintln!("{} Refreshing pricing from {}...", "→".cyan(), url);
            let timeout = Duration::from_secs(timeout_secs);
            match refresh(&mut database, &mut table, &url, timeout, force) {
                RefreshOutcome::Refreshed { count } => {
                    database.save(&db_path)?;
                    eprintln!(
                        "{} {} entries refreshed, written to {}",
                        "✓".green(),
                        count,
                        db_path.display()
                    );
                }
                RefreshOutcome::Skipped => {
                    eprintln!(
                        "{} Pricing refreshed within the last day; use --force to refresh anyway",
                        "→".cyan()
                    );
                }
                RefreshOutcome::Degraded { reason } => {
                    eprintln!(
                        "{} Live pricing unavailable ({}); static data unchanged",
                        "!".yellow(),
                        reason
                    );
                }
            }
        }
    }
    Ok(())
}
