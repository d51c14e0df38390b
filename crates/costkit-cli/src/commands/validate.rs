use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::read_spec;

#[derive(Args)]
pub struct ValidateArgs {
    /// Project spec JSON file (use - for stdin)
    #[arg(long)]
    pub spec: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let spec = read_spec(&args.spec)?;
    spec.validate()?;

    println!(
        "{} {} is valid ({} component{})",
        "✓".green(),
        args.spec.display(),
        spec.components.len(),
        if spec.components.len() == 1 { "" } else { "s" }
    );
    for component in &spec.components {
        println!("  · {}", component.label());
    }
    Ok(())
}
