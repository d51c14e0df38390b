use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use costkit_core::aggregate;
use costkit_pricing::{refresh, PricingDatabase, RefreshOutcome, DEFAULT_TIMEOUT_SECS};
use costkit_report::{html as html_report, json as jreport, terminal};

use super::{read_spec, resolve_db_path, write_or_print};

#[derive(Args)]
pub struct EstimateArgs {
    /// Project spec JSON file (use - for stdin)
    #[arg(long)]
    pub spec: PathBuf,

    /// Output format: table, json, html
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Output file (defaults to stdout for table/json, report.html for html)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Refresh live pricing before estimating (skipped while the database
    /// is fresh; failures degrade to static pricing)
    #[arg(long)]
    pub live: bool,

    /// Pricing endpoint used by --live
    #[arg(long, env = "COSTKIT_PRICING_URL")]
    pub pricing_url: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Pricing database path (defaults to ~/.costkit/pricing.json)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

pub fn run(args: EstimateArgs) -> Result<()> {
    let spec = read_spec(&args.spec)?;
    let db_path = resolve_db_path(args.db)?;
    let mut db = PricingDatabase::load(&db_path)?;
    let mut table = db.to_table()?;

    if args.live {
        match args.pricing_url.as_deref() {
            None => eprintln!(
                "{} --live set but no pricing URL configured; using static pricing",
                "!".yellow()
            ),
            Some(url) => {
                eprintln!("{} Refreshing pricing from {}...", "→".cyan(), url);
                let timeout = Duration::from_secs(args.timeout_secs);
                match refresh(&mut db, &mut table, url, timeout, false) {
                    RefreshOutcome::Refreshed { count } => {
                        db.save(&db_path)?;
                        eprintln!("{} {} entries refreshed", "✓".green(), count);
                    }
                    RefreshOutcome::Skipped => {
                        eprintln!("{} Pricing is fresh; skipping fetch", "→".cyan());
                    }
                    RefreshOutcome::Degraded { reason } => {
                        eprintln!(
                            "{} Live pricing unavailable ({}); using static data",
                            "!".yellow(),
                            reason
                        );
                    }
                }
            }
        }
    }

    let report = aggregate(&spec, &table)?;

    match args.format.as_str() {
        "json" => {
            let content = jreport::render_report(&report)?;
            write_or_print(&content, args.out.as_ref(), "report.json")?;
        }
        "html" => {
            let content = html_report::render_report(&report)?;
            write_or_print(&content, args.out.as_ref(), "report.html")?;
        }
        _ => match &args.out {
            Some(path) => {
                std::fs::write(path, terminal::render_narrative(&report))?;
                eprintln!("{} Written to {}", "✓".green(), path.display());
            }
            None => terminal::print_report(&report),
        },
    }
    Ok(())
}
