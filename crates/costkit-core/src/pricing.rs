/// Pricing table and builtin catalog (USD, snapshot of early 2026 list
/// prices). Live refreshes overlay entries on top of this set.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CostError;
use crate::schema::{Confidence, PricingEntry, Unit, DEFAULT_CURRENCY};

// ── identifier conventions ────────────────────────────────────────────────────
//
// LLM usage resolves two entries, server usage up to three, tool usage one:
//   <model_id>-input / <model_id>-output        (per_1m_tokens)
//   <resource_id>-hourly                        (per_hour)
//   <resource_id>-storage / <resource_id>-egress (per_gb)
//   <tool_id>                                   (per_call)

pub fn input_price_id(model_id: &str) -> String {
    format!("{model_id}-input")
}

pub fn output_price_id(model_id: &str) -> String {
    format!("{model_id}-output")
}

pub fn hourly_price_id(resource_id: &str) -> String {
    format!("{resource_id}-hourly")
}

pub fn storage_price_id(resource_id: &str) -> String {
    format!("{resource_id}-storage")
}

pub fn egress_price_id(resource_id: &str) -> String {
    format!("{resource_id}-egress")
}

/// Identifier → price mapping. Backed by a `BTreeMap` so listings and
/// reports iterate in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingTable {
    entries: BTreeMap<String, PricingEntry>,
}

impl PricingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absence means "missing input" to the calculators, never zero cost.
    pub fn lookup(&self, identifier: &str) -> Option<&PricingEntry> {
        self.entries.get(identifier)
    }

    pub fn lookup_expect(&self, identifier: &str) -> Result<&PricingEntry, CostError> {
        self.lookup(identifier).ok_or_else(|| CostError::NotFound {
            identifier: identifier.to_string(),
        })
    }

    /// Insert or overwrite; the entry is validated first.
    pub fn upsert(&mut self, entry: PricingEntry) -> Result<(), CostError> {
        entry.validate()?;
        self.entries.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    /// Bulk upsert with all-or-nothing semantics: if any entry fails
    /// validation, the table is left untouched.
    pub fn merge(&mut self, entries: Vec<PricingEntry>) -> Result<usize, CostError> {
        for entry in &entries {
            entry.validate()?;
        }
        let count = entries.len();
        for entry in entries {
            self.entries.insert(entry.identifier.clone(), entry);
        }
        Ok(count)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &PricingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The static catalog shipped with the binary.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for entry in builtin_entries() {
            // Catalog entries are constructed valid.
            table.entries.insert(entry.identifier.clone(), entry);
        }
        table
    }
}

fn catalog_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
}

fn entry(identifier: &str, unit: Unit, unit_price: f64, source: &str) -> PricingEntry {
    PricingEntry {
        identifier: identifier.to_string(),
        unit,
        unit_price,
        currency: DEFAULT_CURRENCY.to_string(),
        source: source.to_string(),
        retrieved_at: catalog_date(),
        confidence: Confidence::Static,
    }
}

fn builtin_entries() -> Vec<PricingEntry> {
    use Unit::*;

    const OPENAI: &str = "openai.com/api/pricing";
    const ANTHROPIC: &str = "anthropic.com/pricing";
    const GOOGLE: &str = "ai.google.dev/gemini-api/docs/pricing";
    const DEEPSEEK: &str = "api-docs.deepseek.com/quick_start/pricing";
    const AWS: &str = "aws.amazon.com/ec2/pricing/on-demand";
    const DO: &str = "digitalocean.com/pricing/droplets";

    vec![
        // Model token rates, USD per 1M tokens
        entry("gpt-5-input", Per1mTokens, 1.25, OPENAI),
        entry("gpt-5-output", Per1mTokens, 10.0, OPENAI),
        entry("gpt-4o-input", Per1mTokens, 2.50, OPENAI),
        entry("gpt-4o-output", Per1mTokens, 10.0, OPENAI),
        entry("gpt-4o-mini-input", Per1mTokens, 0.15, OPENAI),
        entry("gpt-4o-mini-output", Per1mTokens, 0.60, OPENAI),
        entry("claude-opus-4-5-input", Per1mTokens, 5.0, ANTHROPIC),
        entry("claude-opus-4-5-output", Per1mTokens, 25.0, ANTHROPIC),
        entry("claude-sonnet-4-5-input", Per1mTokens, 3.0, ANTHROPIC),
        entry("claude-sonnet-4-5-output", Per1mTokens, 15.0, ANTHROPIC),
        entry("claude-haiku-4-5-input", Per1mTokens, 1.0, ANTHROPIC),
        entry("claude-haiku-4-5-output", Per1mTokens, 5.0, ANTHROPIC),
        entry("gemini-2.5-flash-input", Per1mTokens, 0.30, GOOGLE),
        entry("gemini-2.5-flash-output", Per1mTokens, 2.50, GOOGLE),
        entry("gemini-2.5-flash-lite-input", Per1mTokens, 0.10, GOOGLE),
        entry("gemini-2.5-flash-lite-output", Per1mTokens, 0.40, GOOGLE),
        entry("deepseek-chat-input", Per1mTokens, 0.14, DEEPSEEK),
        entry("deepseek-chat-output", Per1mTokens, 0.28, DEEPSEEK),
        // Hosting resources
        entry("aws-ec2-t2-micro-hourly", PerHour, 0.0116, AWS),
        entry("aws-ec2-t2-micro-storage", PerGb, 0.08, AWS),
        entry("aws-ec2-t2-micro-egress", PerGb, 0.09, AWS),
        entry("aws-ec2-t2-small-hourly", PerHour, 0.023, AWS),
        entry("aws-ec2-t2-small-storage", PerGb, 0.08, AWS),
        entry("aws-ec2-t2-small-egress", PerGb, 0.09, AWS),
        entry("digitalocean-basic-hourly", PerHour, 0.00893, DO),
        entry("digitalocean-basic-storage", PerGb, 0.10, DO),
        entry("digitalocean-basic-egress", PerGb, 0.01, DO),
        // Third-party tool APIs, USD per call
        entry(
            "google-search",
            PerCall,
            0.005,
            "developers.google.com/custom-search/v1/overview",
        ),
        entry("serpapi-search", PerCall, 0.01, "serpapi.com/pricing"),
        entry("firecrawl-scrape", PerCall, 0.001, "firecrawl.dev/pricing"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entry(id: &str, price: f64) -> PricingEntry {
        PricingEntry {
            identifier: id.to_string(),
            unit: Unit::PerCall,
            unit_price: price,
            currency: "USD".to_string(),
            source: "test".to_string(),
            retrieved_at: Utc::now(),
            confidence: Confidence::Live,
        }
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let table = PricingTable::builtin();
        assert!(table.lookup("no-such-model-input").is_none());
        let err = table.lookup_expect("no-such-model-input").unwrap_err();
        assert!(matches!(err, CostError::NotFound { .. }));
    }

    #[test]
    fn upsert_overwrites_and_validates() {
        let mut table = PricingTable::new();
        table.upsert(test_entry("my-api", 0.01)).unwrap();
        table.upsert(test_entry("my-api", 0.02)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("my-api").unwrap().unit_price, 0.02);

        assert!(table.upsert(test_entry("my-api", -0.02)).is_err());
        // Failed upsert left the previous entry in place.
        assert_eq!(table.lookup("my-api").unwrap().unit_price, 0.02);
    }

    #[test]
    fn merge_is_all_or_nothing() {
        let mut table = PricingTable::new();
        let err = table.merge(vec![test_entry("a", 0.01), test_entry("b", -1.0)]);
        assert!(err.is_err());
        assert!(table.is_empty());

        let count = table
            .merge(vec![test_entry("a", 0.01), test_entry("b", 0.02)])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn builtin_catalog_is_well_formed() {
        let table = PricingTable::builtin();
        assert!(!table.is_empty());
        for entry in table.entries() {
            entry.validate().unwrap();
            assert_eq!(entry.confidence, Confidence::Static);
            assert_eq!(entry.currency, "USD");
        }
        // Spot-check the identifier conventions.
        assert_eq!(
            table.lookup(&input_price_id("gpt-4o")).unwrap().unit,
            Unit::Per1mTokens
        );
        assert_eq!(
            table
                .lookup(&hourly_price_id("aws-ec2-t2-micro"))
                .unwrap()
                .unit,
            Unit::PerHour
        );
        assert_eq!(table.lookup("google-search").unwrap().unit, Unit::PerCall);
    }

    #[test]
    fn identifiers_iterate_in_sorted_order() {
        let table = PricingTable::builtin();
        let ids: Vec<&str> = table.identifiers().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
