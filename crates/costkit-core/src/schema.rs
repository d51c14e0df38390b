use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::CostError;

/// Default report currency; the builtin catalog is priced in USD throughout.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Billing unit a pricing entry is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "per_1m_tokens")]
    Per1mTokens,
    #[serde(rename = "per_hour")]
    PerHour,
    #[serde(rename = "per_gb")]
    PerGb,
    #[serde(rename = "per_call")]
    PerCall,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Per1mTokens => write!(f, "per_1m_tokens"),
            Unit::PerHour => write!(f, "per_hour"),
            Unit::PerGb => write!(f, "per_gb"),
            Unit::PerCall => write!(f, "per_call"),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per_1m_tokens" | "per_mtok" => Ok(Unit::Per1mTokens),
            "per_hour" | "hourly" => Ok(Unit::PerHour),
            "per_gb" => Ok(Unit::PerGb),
            "per_call" => Ok(Unit::PerCall),
            _ => Err(anyhow::anyhow!("Unknown unit: {}", s)),
        }
    }
}

/// Provenance of a price: shipped with the binary vs fetched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Static,
    Live,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Static => write!(f, "static"),
            Confidence::Live => write!(f, "live"),
        }
    }
}

/// One priced unit: a model token rate, an instance-hour rate, a per-GB
/// rate, or a per-call API fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub identifier: String,
    pub unit: Unit,
    pub unit_price: f64,
    pub currency: String,
    pub source: String,
    pub retrieved_at: DateTime<Utc>,
    pub confidence: Confidence,
}

impl PricingEntry {
    /// Structural validation applied before a table accepts the entry.
    pub fn validate(&self) -> Result<(), CostError> {
        if self.identifier.is_empty() {
            return Err(CostError::EmptyIdentifier);
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(CostError::InvalidPrice {
                identifier: self.identifier.clone(),
                value: self.unit_price,
            });
        }
        Ok(())
    }
}

// ── usage components ──────────────────────────────────────────────────────────

/// Monthly token volumes for one model. Quantity fields are optional so an
/// absent field is reported as a missing input instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmUsage {
    pub model_id: String,
    #[serde(default)]
    pub input_tokens_per_month: Option<f64>,
    #[serde(default)]
    pub output_tokens_per_month: Option<f64>,
}

/// Monthly compute/storage/egress for one hosting resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerUsage {
    pub resource_id: String,
    #[serde(default)]
    pub hours_per_month: Option<f64>,
    #[serde(default)]
    pub storage_gb: Option<f64>,
    #[serde(default)]
    pub egress_gb: Option<f64>,
}

/// Monthly call volume against one third-party API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsage {
    pub tool_id: String,
    #[serde(default)]
    pub calls_per_month: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UsageComponent {
    Llm(LlmUsage),
    Server(ServerUsage),
    Tool(ToolUsage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Llm,
    Server,
    Tool,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Llm => write!(f, "llm"),
            ComponentKind::Server => write!(f, "server"),
            ComponentKind::Tool => write!(f, "tool"),
        }
    }
}

impl UsageComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            UsageComponent::Llm(_) => ComponentKind::Llm,
            UsageComponent::Server(_) => ComponentKind::Server,
            UsageComponent::Tool(_) => ComponentKind::Tool,
        }
    }

    /// The identifier the caller declared (model, resource, or tool ID).
    pub fn id(&self) -> &str {
        match self {
            UsageComponent::Llm(u) => &u.model_id,
            UsageComponent::Server(u) => &u.resource_id,
            UsageComponent::Tool(u) => &u.tool_id,
        }
    }

    /// Display label, e.g. `llm:gpt-4o`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.kind(), self.id())
    }

    fn quantities(&self) -> Vec<(String, Option<f64>)> {
        let id = self.id();
        match self {
            UsageComponent::Llm(u) => vec![
                (format!("{id}.input_tokens_per_month"), u.input_tokens_per_month),
                (format!("{id}.output_tokens_per_month"), u.output_tokens_per_month),
            ],
            UsageComponent::Server(u) => vec![
                (format!("{id}.hours_per_month"), u.hours_per_month),
                (format!("{id}.storage_gb"), u.storage_gb),
                (format!("{id}.egress_gb"), u.egress_gb),
            ],
            UsageComponent::Tool(u) => {
                vec![(format!("{id}.calls_per_month"), u.calls_per_month)]
            }
        }
    }
}

/// One cost-estimation request: the components of an AI project, in the
/// order the caller declared them. Never mutated after parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub components: Vec<UsageComponent>,
}

impl ProjectSpec {
    /// Reject malformed quantities before any computation. Absent fields
    /// are fine here; they surface later as missing inputs.
    pub fn validate(&self) -> Result<(), CostError> {
        for component in &self.components {
            for (field, quantity) in component.quantities() {
                if let Some(value) = quantity {
                    if !value.is_finite() || value < 0.0 {
                        return Err(CostError::InvalidQuantity { field, value });
                    }
                }
            }
        }
        Ok(())
    }
}

// ── report types ──────────────────────────────────────────────────────────────

/// One priced component of a cost report. `computed_cost` is `None` when
/// pricing or inputs were missing; the gaps are listed in `missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub label: String,
    pub kind: ComponentKind,
    pub computed_cost: Option<f64>,
    pub formula: String,
    pub pricing_source: Option<String>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub confidence: Confidence,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub project: Option<String>,
    pub line_items: Vec<CostLineItem>,
    /// Sum of the successfully computed line costs only.
    pub total_cost: f64,
    pub currency: String,
    pub generated_at: DateTime<Utc>,
    /// Field names and pricing identifiers that could not be resolved.
    pub missing_inputs: BTreeSet<String>,
}

impl CostReport {
    pub fn has_missing(&self) -> bool {
        !self.missing_inputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_parses_with_absent_quantity_fields() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"components": [{"type": "llm", "model_id": "gpt-4o"}]}"#,
        )
        .unwrap();
        match &spec.components[0] {
            UsageComponent::Llm(u) => {
                assert_eq!(u.model_id, "gpt-4o");
                assert!(u.input_tokens_per_month.is_none());
                assert!(u.output_tokens_per_month.is_none());
            }
            other => panic!("expected llm component, got {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"components": [{"type": "tool", "tool_id": "google-search",
                "calls_per_month": 100, "planner_notes": "from the UI"}],
                "revision": 7}"#,
        )
        .unwrap();
        assert_eq!(spec.components.len(), 1);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"components": [{"type": "server", "resource_id": "aws-ec2-t2-micro",
                "hours_per_month": -1.0}]}"#,
        )
        .unwrap();
        let err = spec.validate().unwrap_err();
        match err {
            CostError::InvalidQuantity { field, value } => {
                assert_eq!(field, "aws-ec2-t2-micro.hours_per_month");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn entry_validation_rejects_negative_and_nan_prices() {
        let mut entry = PricingEntry {
            identifier: "gpt-4o-input".to_string(),
            unit: Unit::Per1mTokens,
            unit_price: -2.5,
            currency: "USD".to_string(),
            source: "test".to_string(),
            retrieved_at: Utc::now(),
            confidence: Confidence::Static,
        };
        assert!(entry.validate().is_err());
        entry.unit_price = f64::NAN;
        assert!(entry.validate().is_err());
        entry.unit_price = 0.0;
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn unit_round_trips_through_strings() {
        for unit in [Unit::Per1mTokens, Unit::PerHour, Unit::PerGb, Unit::PerCall] {
            let parsed: Unit = unit.to_string().parse().unwrap();
            assert_eq!(parsed, unit);
        }
        assert!("per_fortnight".parse::<Unit>().is_err());
    }
}
