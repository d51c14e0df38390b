use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
use commands::{estimate, pricing, validate};

#[derive(Parser)]
#[command(
    name = "costkit",
    version = "0.1.0",
    author,
    about = "Estimate monthly costs of AI workloads from a declarative project spec",
    long_about = r#"costkit reads a project spec (models and token volumes, hosting resources,
third-party tool calls), prices each component against a static catalog or a
live-refreshed pricing database, and emits an itemized cost report with
provenance metadata (source, retrieval date, static/live confidence).

Quick start:
  costkit estimate --spec project.json                # terminal report
  costkit estimate --spec project.json --format json  # machine-readable report
  costkit estimate --spec project.json --format html  # shareable HTML report
  costkit estimate --spec project.json --live         # refresh pricing first
  costkit pricing list                                # show the pricing table
  costkit pricing show gpt-4o-input                   # one entry, with sources
  costkit pricing refresh --force                     # force a live refresh
  costkit validate --spec project.json                # structural check only"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute an itemized cost estimate for a project spec
    Estimate(estimate::EstimateArgs),

    /// Inspect or refresh pricing data
    Pricing(pricing::PricingArgs),

    /// Validate a project spec without computing costs
    Validate(validate::ValidateArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Estimate(args) => estimate::run(args),
        Commands::Pricing(args) => pricing::run(args),
        Commands::Validate(args) => validate::run(args),
    }
}
