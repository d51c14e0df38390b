//! Per-component cost calculators.
//!
//! Each calculator resolves its usage fields against the pricing table one
//! term at a time and folds the terms into a single line item. Resolution
//! policy: an absent quantity flags the field and drops that term; a zero
//! quantity costs zero without needing a price; a missing (or wrong-unit)
//! pricing entry flags the derived identifier. LLM and tool lines go null
//! when any nonzero term lacks pricing; server lines keep their resolved
//! terms and only go null when no price resolved at all.

use chrono::{DateTime, Utc};

use crate::pricing::{
    egress_price_id, hourly_price_id, input_price_id, output_price_id, storage_price_id,
    PricingTable,
};
use crate::schema::{
    ComponentKind, Confidence, CostLineItem, LlmUsage, ServerUsage, ToolUsage, Unit,
    UsageComponent,
};

const TOKENS_PER_UNIT: f64 = 1_000_000.0;

#[derive(Clone, Copy)]
enum TermShape {
    InputTokens,
    OutputTokens,
    Hours,
    Storage,
    Egress,
    Calls,
}

impl TermShape {
    fn cost(self, quantity: f64, unit_price: f64) -> f64 {
        match self {
            TermShape::InputTokens | TermShape::OutputTokens => {
                (quantity / TOKENS_PER_UNIT) * unit_price
            }
            _ => quantity * unit_price,
        }
    }

    fn formula(self, quantity: f64, unit_price: f64) -> String {
        let q = fmt_qty(quantity);
        let p = fmt_price(unit_price);
        match self {
            TermShape::InputTokens => format!("({q} input tok / 1M) × ${p}"),
            TermShape::OutputTokens => format!("({q} output tok / 1M) × ${p}"),
            TermShape::Hours => format!("{q} h × ${p}/h"),
            TermShape::Storage => format!("{q} GB storage × ${p}/GB"),
            TermShape::Egress => format!("{q} GB egress × ${p}/GB"),
            TermShape::Calls => format!("{q} calls × ${p}/call"),
        }
    }

    fn zero_formula(self) -> &'static str {
        match self {
            TermShape::InputTokens => "0 input tok",
            TermShape::OutputTokens => "0 output tok",
            TermShape::Hours => "0 h",
            TermShape::Storage => "0 GB storage",
            TermShape::Egress => "0 GB egress",
            TermShape::Calls => "0 calls",
        }
    }
}

enum Term {
    Priced {
        cost: f64,
        formula: String,
        source: String,
        retrieved_at: DateTime<Utc>,
        confidence: Confidence,
    },
    Zero {
        formula: String,
    },
    MissingField {
        field: String,
    },
    MissingPricing {
        identifier: String,
    },
}

fn resolve_term(
    table: &PricingTable,
    shape: TermShape,
    field: String,
    identifier: String,
    expected_unit: Unit,
    quantity: Option<f64>,
) -> Term {
    let qty = match quantity {
        None => return Term::MissingField { field },
        Some(q) => q,
    };
    if qty == 0.0 {
        return Term::Zero {
            formula: shape.zero_formula().to_string(),
        };
    }
    match table.lookup(&identifier) {
        Some(entry) if entry.unit == expected_unit => Term::Priced {
            cost: shape.cost(qty, entry.unit_price),
            formula: shape.formula(qty, entry.unit_price),
            source: entry.source.clone(),
            retrieved_at: entry.retrieved_at,
            confidence: entry.confidence,
        },
        // A wrong-unit entry is as unusable as an absent one.
        _ => Term::MissingPricing { identifier },
    }
}

fn assemble(
    label: String,
    kind: ComponentKind,
    terms: Vec<Term>,
    null_on_missing_pricing: bool,
) -> CostLineItem {
    let mut cost_sum = 0.0;
    let mut any_priced = false;
    let mut any_zero = false;
    let mut missing_pricing = false;
    let mut all_live = true;
    let mut formulas: Vec<String> = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    let mut oldest: Option<DateTime<Utc>> = None;
    let mut missing: Vec<String> = Vec::new();

    for term in terms {
        match term {
            Term::Priced {
                cost,
                formula,
                source,
                retrieved_at,
                confidence,
            } => {
                any_priced = true;
                cost_sum += cost;
                formulas.push(formula);
                if !sources.contains(&source) {
                    sources.push(source);
                }
                oldest = Some(match oldest {
                    Some(t) => t.min(retrieved_at),
                    None => retrieved_at,
                });
                if confidence != Confidence::Live {
                    all_live = false;
                }
            }
            Term::Zero { formula } => {
                any_zero = true;
                formulas.push(formula);
            }
            Term::MissingField { field } => missing.push(field),
            Term::MissingPricing { identifier } => {
                missing_pricing = true;
                missing.push(identifier);
            }
        }
    }

    let computed_cost = if missing_pricing && (null_on_missing_pricing || !any_priced) {
        None
    } else if any_priced || any_zero {
        Some(cost_sum)
    } else {
        None
    };

    let formula = if computed_cost.is_none() {
        format!("no cost computed (missing: {})", missing.join(", "))
    } else {
        formulas.join(" + ")
    };

    let confidence = if any_priced && all_live {
        Confidence::Live
    } else {
        Confidence::Static
    };

    CostLineItem {
        label,
        kind,
        computed_cost,
        formula,
        pricing_source: if sources.is_empty() {
            None
        } else {
            Some(sources.join(", "))
        },
        retrieved_at: oldest,
        confidence,
        missing,
    }
}

/// cost = (input_tokens / 1M) × input_price + (output_tokens / 1M) × output_price
pub fn llm_line_item(usage: &LlmUsage, table: &PricingTable) -> CostLineItem {
    let id = &usage.model_id;
    let terms = vec![
        resolve_term(
            table,
            TermShape::InputTokens,
            format!("{id}.input_tokens_per_month"),
            input_price_id(id),
            Unit::Per1mTokens,
            usage.input_tokens_per_month,
        ),
        resolve_term(
            table,
            TermShape::OutputTokens,
            format!("{id}.output_tokens_per_month"),
            output_price_id(id),
            Unit::Per1mTokens,
            usage.output_tokens_per_month,
        ),
    ];
    assemble(format!("llm:{id}"), ComponentKind::Llm, terms, true)
}

/// cost = hours × hourly_price + storage_gb × storage_price + egress_gb × egress_price,
/// each term independently optional.
pub fn server_line_item(usage: &ServerUsage, table: &PricingTable) -> CostLineItem {
    let id = &usage.resource_id;
    let terms = vec![
        resolve_term(
            table,
            TermShape::Hours,
            format!("{id}.hours_per_month"),
            hourly_price_id(id),
            Unit::PerHour,
            usage.hours_per_month,
        ),
        resolve_term(
            table,
            TermShape::Storage,
            format!("{id}.storage_gb"),
            storage_price_id(id),
            Unit::PerGb,
            usage.storage_gb,
        ),
        resolve_term(
            table,
            TermShape::Egress,
            format!("{id}.egress_gb"),
            egress_price_id(id),
            Unit::PerGb,
            usage.egress_gb,
        ),
    ];
    assemble(format!("server:{id}"), ComponentKind::Server, terms, false)
}

/// cost = calls_per_month × per_call_price
pub fn tool_line_item(usage: &ToolUsage, table: &PricingTable) -> CostLineItem {
    let id = &usage.tool_id;
    let terms = vec![resolve_term(
        table,
        TermShape::Calls,
        format!("{id}.calls_per_month"),
        id.clone(),
        Unit::PerCall,
        usage.calls_per_month,
    )];
    assemble(format!("tool:{id}"), ComponentKind::Tool, terms, true)
}

/// Dispatch a usage component to the calculator matching its variant.
pub fn line_item(component: &UsageComponent, table: &PricingTable) -> CostLineItem {
    match component {
        UsageComponent::Llm(u) => llm_line_item(u, table),
        UsageComponent::Server(u) => server_line_item(u, table),
        UsageComponent::Tool(u) => tool_line_item(u, table),
    }
}

fn fmt_qty(q: f64) -> String {
    if q.fract() == 0.0 && q.abs() < 1e15 {
        format!("{:.0}", q)
    } else {
        format!("{:.2}", q)
    }
}

fn fmt_price(p: f64) -> String {
    format!("{:.4}", p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PricingEntry;
    use chrono::{TimeZone, Utc};

    fn entry(id: &str, unit: Unit, price: f64, confidence: Confidence) -> PricingEntry {
        PricingEntry {
            identifier: id.to_string(),
            unit,
            unit_price: price,
            currency: "USD".to_string(),
            source: format!("{id}-source"),
            retrieved_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            confidence,
        }
    }

    fn table_with(entries: Vec<PricingEntry>) -> PricingTable {
        let mut table = PricingTable::new();
        table.merge(entries).unwrap();
        table
    }

    #[test]
    fn llm_cost_matches_worked_example() {
        // 2M input @ $2/1M + 0.5M output @ $6/1M = 7.00
        let table = table_with(vec![
            entry("gpt-x-input", Unit::Per1mTokens, 2.0, Confidence::Static),
            entry("gpt-x-output", Unit::Per1mTokens, 6.0, Confidence::Static),
        ]);
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(2_000_000.0),
            output_tokens_per_month: Some(500_000.0),
        };
        let item = llm_line_item(&usage, &table);
        assert_eq!(item.computed_cost, Some(7.0));
        assert!(item.missing.is_empty());
        assert_eq!(item.confidence, Confidence::Static);
        assert!(item.formula.contains("2000000 input tok"));
        assert!(item.formula.contains("$6.0000"));
    }

    #[test]
    fn server_cost_matches_worked_example() {
        // 720*0.05 + 100*0.02 + 50*0.01 = 38.50
        let table = table_with(vec![
            entry("vps-hourly", Unit::PerHour, 0.05, Confidence::Static),
            entry("vps-storage", Unit::PerGb, 0.02, Confidence::Static),
            entry("vps-egress", Unit::PerGb, 0.01, Confidence::Static),
        ]);
        let usage = ServerUsage {
            resource_id: "vps".to_string(),
            hours_per_month: Some(720.0),
            storage_gb: Some(100.0),
            egress_gb: Some(50.0),
        };
        let item = server_line_item(&usage, &table);
        assert_eq!(item.computed_cost, Some(38.5));
        assert!(item.missing.is_empty());
    }

    #[test]
    fn zero_quantities_cost_exactly_zero_without_pricing() {
        // No entries at all: zero usage must not require a lookup.
        let table = PricingTable::new();
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(0.0),
            output_tokens_per_month: Some(0.0),
        };
        let item = llm_line_item(&usage, &table);
        assert_eq!(item.computed_cost, Some(0.0));
        assert!(item.missing.is_empty());

        let tool = ToolUsage {
            tool_id: "google-search".to_string(),
            calls_per_month: Some(0.0),
        };
        assert_eq!(tool_line_item(&tool, &table).computed_cost, Some(0.0));
    }

    #[test]
    fn llm_missing_pricing_nulls_the_line() {
        let table = table_with(vec![entry(
            "gpt-x-input",
            Unit::Per1mTokens,
            2.0,
            Confidence::Static,
        )]);
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(2_000_000.0),
            output_tokens_per_month: Some(500_000.0),
        };
        let item = llm_line_item(&usage, &table);
        assert_eq!(item.computed_cost, None);
        assert_eq!(item.missing, vec!["gpt-x-output".to_string()]);
        assert!(item.formula.contains("no cost computed"));
    }

    #[test]
    fn llm_missing_field_computes_partially() {
        let table = table_with(vec![
            entry("gpt-x-input", Unit::Per1mTokens, 2.0, Confidence::Static),
            entry("gpt-x-output", Unit::Per1mTokens, 6.0, Confidence::Static),
        ]);
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(2_000_000.0),
            output_tokens_per_month: None,
        };
        let item = llm_line_item(&usage, &table);
        assert_eq!(item.computed_cost, Some(4.0));
        assert_eq!(item.missing, vec!["gpt-x.output_tokens_per_month".to_string()]);
    }

    #[test]
    fn server_missing_price_fails_only_that_term() {
        let table = table_with(vec![
            entry("vps-hourly", Unit::PerHour, 0.05, Confidence::Static),
            entry("vps-egress", Unit::PerGb, 0.01, Confidence::Static),
        ]);
        let usage = ServerUsage {
            resource_id: "vps".to_string(),
            hours_per_month: Some(720.0),
            storage_gb: Some(100.0),
            egress_gb: Some(50.0),
        };
        let item = server_line_item(&usage, &table);
        // 36.00 + 0.50; the storage term is flagged, not zeroed.
        assert_eq!(item.computed_cost, Some(36.5));
        assert_eq!(item.missing, vec!["vps-storage".to_string()]);
    }

    #[test]
    fn server_with_all_prices_missing_is_null_not_zero() {
        let table = PricingTable::new();
        let usage = ServerUsage {
            resource_id: "vps".to_string(),
            hours_per_month: Some(720.0),
            storage_gb: Some(0.0),
            egress_gb: Some(0.0),
        };
        let item = server_line_item(&usage, &table);
        assert_eq!(item.computed_cost, None);
        assert_eq!(item.missing, vec!["vps-hourly".to_string()]);
    }

    #[test]
    fn wrong_unit_entry_is_treated_as_missing() {
        let table = table_with(vec![entry(
            "crawler",
            Unit::PerHour, // should be per_call
            1.0,
            Confidence::Static,
        )]);
        let usage = ToolUsage {
            tool_id: "crawler".to_string(),
            calls_per_month: Some(100.0),
        };
        let item = tool_line_item(&usage, &table);
        assert_eq!(item.computed_cost, None);
        assert_eq!(item.missing, vec!["crawler".to_string()]);
    }

    #[test]
    fn confidence_is_live_only_when_every_entry_is_live() {
        let live_both = table_with(vec![
            entry("gpt-x-input", Unit::Per1mTokens, 2.0, Confidence::Live),
            entry("gpt-x-output", Unit::Per1mTokens, 6.0, Confidence::Live),
        ]);
        let mixed = table_with(vec![
            entry("gpt-x-input", Unit::Per1mTokens, 2.0, Confidence::Live),
            entry("gpt-x-output", Unit::Per1mTokens, 6.0, Confidence::Static),
        ]);
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(1_000_000.0),
            output_tokens_per_month: Some(1_000_000.0),
        };
        assert_eq!(llm_line_item(&usage, &live_both).confidence, Confidence::Live);
        assert_eq!(llm_line_item(&usage, &mixed).confidence, Confidence::Static);
    }

    #[test]
    fn retrieved_at_is_the_oldest_entry_used() {
        let mut input = entry("gpt-x-input", Unit::Per1mTokens, 2.0, Confidence::Static);
        input.retrieved_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let output = entry("gpt-x-output", Unit::Per1mTokens, 6.0, Confidence::Static);
        let table = table_with(vec![input.clone(), output]);
        let usage = LlmUsage {
            model_id: "gpt-x".to_string(),
            input_tokens_per_month: Some(1_000_000.0),
            output_tokens_per_month: Some(1_000_000.0),
        };
        let item = llm_line_item(&usage, &table);
        assert_eq!(item.retrieved_at, Some(input.retrieved_at));
    }
}
