/// On-disk pricing database.
/// Format: ~/.costkit/pricing.json, a JSON document with `metadata`
/// (last refresh timestamp, currency) and a flat `entries` list that is
/// layered over the builtin catalog at load time.
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use costkit_core::{PricingEntry, PricingTable, DEFAULT_CURRENCY};

/// Refresh live pricing at most once per day unless forced.
pub const REFRESH_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    #[serde(default)]
    pub last_successful_update: Option<DateTime<Utc>>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for DatabaseMetadata {
    fn default() -> Self {
        Self {
            last_successful_update: None,
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingDatabase {
    #[serde(default)]
    pub metadata: DatabaseMetadata,
    #[serde(default)]
    pub entries: Vec<PricingEntry>,
}

impl PricingDatabase {
    /// Load from disk. An absent file is an empty database, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading pricing database {}", path.display()))?;
        let db: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing pricing database {}", path.display()))?;
        Ok(db)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut db = self.clone();
        db.entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        let content = serde_json::to_string_pretty(&db)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing pricing database {}", path.display()))?;
        Ok(())
    }

    /// A refresh is due when the database never refreshed or the last
    /// refresh is older than the TTL.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.metadata.last_successful_update {
            None => true,
            Some(last) => now - last >= Duration::hours(REFRESH_TTL_HOURS),
        }
    }

    /// Builtin catalog with this database's entries layered on top
    /// (database entries win on identifier collisions).
    pub fn to_table(&self) -> Result<PricingTable> {
        let mut table = PricingTable::builtin();
        for entry in &self.entries {
            table
                .upsert(entry.clone())
                .with_context(|| format!("invalid database entry '{}'", entry.identifier))?;
        }
        Ok(table)
    }

    /// Record a successful live refresh: replace matching entries, append
    /// new ones, stamp the refresh time.
    pub fn apply_refresh(&mut self, fresh: &[PricingEntry], now: DateTime<Utc>) {
        for entry in fresh {
            match self
                .entries
                .iter_mut()
                .find(|e| e.identifier == entry.identifier)
            {
                Some(existing) => *existing = entry.clone(),
                None => self.entries.push(entry.clone()),
            }
        }
        self.metadata.last_successful_update = Some(now);
    }
}

/// Load the effective pricing table for a database path.
pub fn load_table(path: &Path) -> Result<PricingTable> {
    PricingDatabase::load(path)?.to_table()
}
