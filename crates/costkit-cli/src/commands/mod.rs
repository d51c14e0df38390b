pub mod estimate;
pub mod pricing;
pub mod validate;

use anyhow::{Context, Result};
use colored::Colorize;
use costkit_core::ProjectSpec;
use std::path::{Path, PathBuf};

/// Read a project spec from a JSON file; `-` reads stdin.
pub fn read_spec(path: &Path) -> Result<ProjectSpec> {
    let content = if path == Path::new("-") {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading project spec from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading project spec {}", path.display()))?
    };
    let spec: ProjectSpec = serde_json::from_str(&content).context("parsing project spec")?;
    Ok(spec)
}

/// Pricing database path: explicit flag or `~/.costkit/pricing.json`.
pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => costkit_pricing::default_db_path()
            .ok_or_else(|| anyhow::anyhow!("HOME not set; pass --db explicitly")),
    }
}

pub fn write_or_print(content: &str, out: Option<&PathBuf>, default_file: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("{} Written to {}", "✓".green(), path.display());
        }
        None if content.starts_with("<!DOCTYPE") => {
            // HTML: write to default file
            let path = PathBuf::from(default_file);
            std::fs::write(&path, content)?;
            eprintln!("{} Written to {}", "✓".green(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
