pub mod html;
pub mod json;
pub mod terminal;

use anyhow::Result;
use costkit_core::CostReport;

/// Machine-readable tree + human-readable narrative for one report.
#[derive(Debug)]
pub struct Formatted {
    pub structured: serde_json::Value,
    pub narrative: String,
}

/// Pure projection of a cost report into both output shapes. Performs no
/// computation of its own.
pub fn format_report(report: &CostReport) -> Result<Formatted> {
    Ok(Formatted {
        structured: serde_json::to_value(report)?,
        narrative: terminal::render_narrative(report),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use costkit_core::{aggregate, PricingTable, ProjectSpec};

    #[test]
    fn formatted_output_carries_both_shapes() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"components": [{"type": "tool", "tool_id": "google-search",
                "calls_per_month": 1000}]}"#,
        )
        .unwrap();
        let report = aggregate(&spec, &PricingTable::builtin()).unwrap();
        let formatted = format_report(&report).unwrap();

        assert_eq!(
            formatted.structured["total_cost"],
            serde_json::json!(report.total_cost)
        );
        assert!(formatted.narrative.contains("tool:google-search"));
        let _parse_check: costkit_core::CostReport =
            serde_json::from_value(formatted.structured).unwrap();
        assert!(report.generated_at <= Utc::now());
    }
}
