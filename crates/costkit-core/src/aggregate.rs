use chrono::Utc;
use std::collections::BTreeSet;

use crate::calc::line_item;
use crate::error::CostError;
use crate::pricing::PricingTable;
use crate::schema::{CostReport, ProjectSpec, DEFAULT_CURRENCY};

/// Compute a cost report for a project against a pricing table snapshot.
///
/// Validates quantities first (the only hard failure), then dispatches each
/// component in declaration order, collecting one line item per component
/// even when its cost could not be resolved. `total_cost` sums only the
/// resolved items; everything unresolved lands in `missing_inputs`.
///
/// Pure apart from `generated_at`: the same spec and table state always
/// produce identical report content.
pub fn aggregate(spec: &ProjectSpec, table: &PricingTable) -> Result<CostReport, CostError> {
    spec.validate()?;

    let mut line_items = Vec::with_capacity(spec.components.len());
    let mut missing_inputs = BTreeSet::new();

    for component in &spec.components {
        let item = line_item(component, table);
        missing_inputs.extend(item.missing.iter().cloned());
        line_items.push(item);
    }

    let total_cost: f64 = line_items.iter().filter_map(|li| li.computed_cost).sum();

    Ok(CostReport {
        project: spec.name.clone(),
        line_items,
        total_cost,
        currency: DEFAULT_CURRENCY.to_string(),
        generated_at: Utc::now(),
        missing_inputs,
    })
}
