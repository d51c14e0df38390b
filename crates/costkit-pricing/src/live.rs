//! Live pricing fetch.
//!
//! One GET against a JSON endpoint mapping identifier → quote. The fetch is
//! synchronous, timeout-bounded, and all-or-nothing: either every decoded
//! entry validates and is applied, or the static table is left untouched and
//! the caller reports a confidence downgrade instead of an error.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use thiserror::Error;

use costkit_core::{Confidence, PricingEntry, PricingTable, Unit, DEFAULT_CURRENCY};

use crate::store::PricingDatabase;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("pricing endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("pricing payload could not be decoded: {0}")]
    Decode(String),

    #[error("pricing payload rejected: {0}")]
    InvalidEntry(String),
}

/// One quote as served by the pricing endpoint. Currency, source, and
/// retrieval time are optional on the wire and defaulted here.
#[derive(Debug, Clone, Deserialize)]
pub struct WireQuote {
    pub unit: Unit,
    pub unit_price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
}

/// Normalize a decoded payload into live-confidence entries, keeping only
/// identifiers the caller asked for. Any invalid quote rejects the whole
/// payload.
pub fn entries_from_payload(
    payload: BTreeMap<String, WireQuote>,
    wanted: &BTreeSet<String>,
    default_source: &str,
    now: DateTime<Utc>,
) -> Result<Vec<PricingEntry>, FetchError> {
    let mut entries = Vec::new();
    for (identifier, quote) in payload {
        if !wanted.contains(&identifier) {
            continue;
        }
        let entry = PricingEntry {
            identifier,
            unit: quote.unit,
            unit_price: quote.unit_price,
            currency: quote.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            source: quote.source.unwrap_or_else(|| default_source.to_string()),
            retrieved_at: quote.retrieved_at.unwrap_or(now),
            confidence: Confidence::Live,
        };
        entry
            .validate()
            .map_err(|e| FetchError::InvalidEntry(e.to_string()))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Fetch quotes for the given identifiers. Timeouts and transport failures
/// surface as `Unavailable`; the caller degrades to static pricing.
pub fn fetch_live_pricing(
    url: &str,
    wanted: &BTreeSet<String>,
    timeout: Duration,
) -> Result<Vec<PricingEntry>, FetchError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent
        .get(url)
        .call()
        .map_err(|e| FetchError::Unavailable(e.to_string()))?;
    let payload: BTreeMap<String, WireQuote> = response
        .into_json()
        .map_err(|e| FetchError::Decode(e.to_string()))?;
    entries_from_payload(payload, wanted, url, Utc::now())
}

#[derive(Debug)]
pub enum RefreshOutcome {
    /// Live quotes applied to the table and recorded in the database.
    Refreshed { count: usize },
    /// The database refreshed within the TTL; nothing fetched.
    Skipped,
    /// Fetch failed; table and database untouched, static pricing stands.
    Degraded { reason: String },
}

/// Try to refresh every identifier the table knows about. Never fails:
/// fetch problems come back as `Degraded` and leave both the table and the
/// database exactly as they were. Persisting the database after a
/// `Refreshed` outcome is the caller's decision.
pub fn refresh(
    db: &mut PricingDatabase,
    table: &mut PricingTable,
    url: &str,
    timeout: Duration,
    force: bool,
) -> RefreshOutcome {
    let now = Utc::now();
    if !force && !db.is_stale(now) {
        return RefreshOutcome::Skipped;
    }

    let wanted: BTreeSet<String> = table.identifiers().map(|s| s.to_string()).collect();
    match fetch_live_pricing(url, &wanted, timeout) {
        Ok(entries) => match table.merge(entries.clone()) {
            Ok(count) => {
                db.apply_refresh(&entries, now);
                RefreshOutcome::Refreshed { count }
            }
            Err(e) => RefreshOutcome::Degraded {
                reason: e.to_string(),
            },
        },
        Err(e) => RefreshOutcome::Degraded {
            reason: e.to_string(),
        },
    }
}
