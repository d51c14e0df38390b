use anyhow::Result;
use costkit_core::{CostReport, PricingEntry, PricingTable};

pub fn render_report(report: &CostReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_pricing(table: &PricingTable) -> Result<String> {
    let entries: Vec<&PricingEntry> = table.entries().collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn render_entry(entry: &PricingEntry) -> Result<String> {
    Ok(serde_json::to_string_pretty(entry)?)
}
