use anyhow::Result;
use costkit_core::*;

use crate::terminal::{fmt_cost, fmt_ts};

/// Standalone HTML cost report.
pub fn render_report(report: &CostReport) -> Result<String> {
    let line_items_html = render_line_items(&report.line_items);
    let missing_html = render_missing(report);
    let resolved = report
        .line_items
        .iter()
        .filter(|li| li.computed_cost.is_some())
        .count();

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>costkit — {title}</title>
<style>
  :root {{
    --bg: #0f1117; --surface: #1a1d27; --border: #2a2d3a;
    --text: #e2e8f0; --muted: #64748b; --accent: #7c6af7;
    --green: #4ade80; --yellow: #facc15; --red: #f87171;
    --cyan: #22d3ee;
    font-family: 'Berkeley Mono', 'JetBrains Mono', 'Fira Code', monospace;
  }}
  * {{ box-sizing: border-box; margin: 0; padding: 0; }}
  body {{ background: var(--bg); color: var(--text); min-height: 100vh; }}
  .header {{ background: var(--surface); border-bottom: 1px solid var(--border);
    padding: 1.5rem 2rem; display: flex; align-items: center; gap: 1rem; }}
  .header h1 {{ font-size: 1.25rem; font-weight: 700; color: var(--accent); }}
  .header .currency-badge {{ background: var(--border); padding: 0.2rem 0.6rem;
    border-radius: 4px; font-size: 0.75rem; color: var(--cyan); }}
  .container {{ max-width: 1100px; margin: 0 auto; padding: 2rem; }}
  .kpi-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
    gap: 1rem; margin-bottom: 2rem; }}
  .kpi {{ background: var(--surface); border: 1px solid var(--border);
    border-radius: 8px; padding: 1.25rem; }}
  .kpi .label {{ font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.1em;
    color: var(--muted); margin-bottom: 0.4rem; }}
  .kpi .value {{ font-size: 1.5rem; font-weight: 700; }}
  .kpi .value.green {{ color: var(--green); }}
  .kpi .value.yellow {{ color: var(--yellow); }}
  .kpi .value.cyan {{ color: var(--cyan); }}
  .section {{ background: var(--surface); border: 1px solid var(--border);
    border-radius: 8px; margin-bottom: 1.5rem; overflow: hidden; }}
  .section-header {{ padding: 0.875rem 1.25rem; border-bottom: 1px solid var(--border);
    font-size: 0.8rem; font-weight: 600; text-transform: uppercase;
    letter-spacing: 0.08em; color: var(--muted); }}
  table {{ width: 100%; border-collapse: collapse; }}
  th, td {{ padding: 0.6rem 1.25rem; text-align: left; border-bottom: 1px solid var(--border);
    font-size: 0.85rem; }}
  th {{ font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.08em;
    color: var(--muted); }}
  tr:last-child td {{ border-bottom: none; }}
  tr:hover td {{ background: rgba(124,106,247,0.06); }}
  .formula {{ color: var(--muted); font-size: 0.75rem; }}
  .conf {{ display: inline-block; padding: 0.1rem 0.5rem; border-radius: 3px;
    font-size: 0.7rem; font-weight: 700; text-transform: uppercase; }}
  .conf.live {{ background: rgba(74,222,128,0.15); color: var(--green); }}
  .conf.static {{ background: rgba(100,116,139,0.2); color: var(--muted); }}
  .missing-item {{ padding: 0.75rem 1.25rem; border-bottom: 1px solid var(--border);
    color: var(--yellow); font-size: 0.85rem; }}
  .missing-item:last-child {{ border-bottom: none; }}
  .missing-item .prompt {{ color: var(--muted); font-size: 0.75rem; margin-top: 0.2rem; }}
  .all-resolved {{ padding: 1.25rem; color: var(--green); font-size: 0.9rem; }}
  footer {{ text-align: center; padding: 2rem; color: var(--muted); font-size: 0.75rem; }}
</style>
</head>
<body>
<div class="header">
  <h1>costkit</h1>
  <span class="currency-badge">{currency}</span>
  <span style="color:var(--muted);font-size:0.85rem">{title}</span>
</div>
<div class="container">

  <!-- KPIs -->
  <div class="kpi-grid">
    <div class="kpi"><div class="label">Total (resolved)</div><div class="value green">{total_cost}</div></div>
    <div class="kpi"><div class="label">Line Items</div><div class="value cyan">{item_count}</div></div>
    <div class="kpi"><div class="label">Resolved</div><div class="value">{resolved}</div></div>
    <div class="kpi"><div class="label">Missing Inputs</div><div class="value {missing_color}">{missing_count}</div></div>
  </div>

  <!-- Line Items -->
  <div class="section">
    <div class="section-header">Line Items</div>
    {line_items_html}
  </div>

  <!-- Missing Inputs -->
  <div class="section">
    <div class="section-header">Missing Inputs</div>
    {missing_html}
  </div>

</div>
<footer>Generated by costkit · {timestamp}</footer>
</body>
</html>"#,
        title = html_escape(report.project.as_deref().unwrap_or("cost estimate")),
        currency = html_escape(&report.currency),
        total_cost = fmt_cost(Some(report.total_cost)),
        item_count = report.line_items.len(),
        resolved = resolved,
        missing_count = report.missing_inputs.len(),
        missing_color = if report.has_missing() { "yellow" } else { "green" },
        line_items_html = line_items_html,
        missing_html = missing_html,
        timestamp = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
    ))
}

fn render_line_items(items: &[CostLineItem]) -> String {
    if items.is_empty() {
        return r#"<div style="padding:1.25rem;color:var(--muted)">No components declared.</div>"#
            .to_string();
    }

    let rows = items
        .iter()
        .map(|item| {
            let conf_class = match item.confidence {
                Confidence::Live => "live",
                Confidence::Static => "static",
            };
            format!(
                r#"<tr>
              <td>{label}</td>
              <td style="color:var(--green)">{cost}</td>
              <td class="formula">{formula}</td>
              <td>{source}</td>
              <td>{retrieved}</td>
              <td><span class="conf {conf_class}">{confidence}</span></td>
            </tr>"#,
                label = html_escape(&item.label),
                cost = fmt_cost(item.computed_cost),
                formula = html_escape(&item.formula),
                source = html_escape(item.pricing_source.as_deref().unwrap_or("-")),
                retrieved = fmt_ts(item.retrieved_at),
                conf_class = conf_class,
                confidence = item.confidence,
            )
        })
        .collect::<String>();

    format!(
        r#"<table>
          <thead><tr>
            <th>Component</th><th>Cost</th><th>Formula</th>
            <th>Source</th><th>Retrieved</th><th>Confidence</th>
          </tr></thead>
          <tbody>{}</tbody>
        </table>"#,
        rows
    )
}

fn render_missing(report: &CostReport) -> String {
    if !report.has_missing() {
        return r#"<div class="all-resolved">✓ All inputs resolved.</div>"#.to_string();
    }

    report
        .missing_inputs
        .iter()
        .map(|gap| {
            format!(
                r#"<div class="missing-item">{gap}
              <div class="prompt">apply industry-average pricing for {gap}?</div>
            </div>"#,
                gap = html_escape(gap),
            )
        })
        .collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use costkit_core::{aggregate, ProjectSpec};

    #[test]
    fn html_report_contains_costs_and_missing_prompts() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"name": "crawler", "components": [
                {"type": "tool", "tool_id": "firecrawl-scrape", "calls_per_month": 5000},
                {"type": "tool", "tool_id": "unlisted-api", "calls_per_month": 100}
            ]}"#,
        )
        .unwrap();
        let report = aggregate(&spec, &PricingTable::builtin()).unwrap();
        let html = render_report(&report).unwrap();

        assert!(html.starts_with("<!DOCTYPE"));
        assert!(html.contains("tool:firecrawl-scrape"));
        assert!(html.contains("$5.0000"));
        assert!(html.contains("apply industry-average pricing for unlisted-api?"));
    }

    #[test]
    fn html_escapes_caller_controlled_strings() {
        let spec: ProjectSpec = serde_json::from_str(
            r#"{"name": "<script>alert(1)</script>", "components": []}"#,
        )
        .unwrap();
        let report = aggregate(&spec, &PricingTable::builtin()).unwrap();
        let html = render_report(&report).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
