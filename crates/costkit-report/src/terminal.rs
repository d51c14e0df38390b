use colored::Colorize;
use costkit_core::*;
use std::fmt::Write as _;

// ── formatting helpers ────────────────────────────────────────────────────────

pub fn fmt_cost(cost: Option<f64>) -> String {
    match cost {
        Some(c) => format!("${:.4}", c),
        None => "-".to_string(),
    }
}

pub fn fmt_ts(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max.saturating_sub(1)])
    }
}

// ── cost report ───────────────────────────────────────────────────────────────

/// Plain-text narrative: per line item the cost, formula, source, retrieval
/// date and confidence tag, then the grand total and a missing-inputs
/// call-out. Used for file output and the structured+narrative contract.
pub fn render_narrative(report: &CostReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Cost estimate ({})", report.currency);
    if let Some(project) = &report.project {
        let _ = writeln!(out, "Project   : {}", project);
    }
    let _ = writeln!(out, "Generated : {}", fmt_ts(Some(report.generated_at)));
    let _ = writeln!(out);

    if report.line_items.is_empty() {
        let _ = writeln!(out, "No components declared.");
    }
    for (i, item) in report.line_items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}  {}  [{}]",
            i + 1,
            item.label,
            fmt_cost(item.computed_cost),
            item.confidence
        );
        let _ = writeln!(out, "   formula : {}", item.formula);
        if let Some(source) = &item.pricing_source {
            let _ = writeln!(
                out,
                "   source  : {} (retrieved {})",
                source,
                fmt_ts(item.retrieved_at)
            );
        }
        for gap in &item.missing {
            let _ = writeln!(out, "   missing : {}", gap);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total (resolved items) : {}",
        fmt_cost(Some(report.total_cost))
    );

    if report.has_missing() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Missing inputs:");
        for gap in &report.missing_inputs {
            let _ = writeln!(out, "  · {} — apply industry-average pricing for {}?", gap, gap);
        }
    }

    out
}

/// Colored version of the narrative for interactive use.
pub fn print_report(report: &CostReport) {
    println!(
        "\n{}",
        "── Cost Estimate ───────────────────────────────────────────────".bold()
    );
    if let Some(project) = &report.project {
        println!("  Project   : {}", project);
    }
    println!("  Generated : {}", fmt_ts(Some(report.generated_at)));
    println!("  Currency  : {}", report.currency);

    if report.line_items.is_empty() {
        println!("\n{}", "No components declared.".yellow());
    } else {
        println!(
            "\n{}",
            "── Line Items ──────────────────────────────────────────────────".bold()
        );
        for (i, item) in report.line_items.iter().enumerate() {
            let cost = match item.computed_cost {
                Some(c) => format!("${:.4}", c).green().to_string(),
                None => "-".yellow().to_string(),
            };
            let conf = match item.confidence {
                Confidence::Live => format!("[{}]", item.confidence).green().to_string(),
                Confidence::Static => format!("[{}]", item.confidence).dimmed().to_string(),
            };
            println!("\n  {}. {}  {}  {}", i + 1, item.label.cyan(), cost, conf);
            println!("     formula : {}", item.formula);
            if let Some(source) = &item.pricing_source {
                println!(
                    "     {}",
                    format!("source  : {} (retrieved {})", source, fmt_ts(item.retrieved_at))
                        .dimmed()
                );
            }
            for gap in &item.missing {
                println!("     {} {}", "missing :".yellow(), gap.yellow());
            }
        }
    }

    println!(
        "\n  Total (resolved items) : {}",
        fmt_cost(Some(report.total_cost)).green().bold().to_string()
    );

    if report.has_missing() {
        println!(
            "\n{}",
            "── Missing Inputs ──────────────────────────────────────────────".bold()
        );
        for gap in &report.missing_inputs {
            println!(
                "  {} {} — apply industry-average pricing for {}?",
                "·".yellow(),
                gap.yellow(),
                gap
            );
        }
    }

    println!();
}

// ── pricing table ─────────────────────────────────────────────────────────────

pub fn print_pricing_list(table: &PricingTable) {
    if table.is_empty() {
        println!("{}", "No pricing entries.".yellow());
        return;
    }

    let (w_id, w_unit, w_price, w_conf, w_ts) = (34, 14, 12, 7, 17);
    println!(
        "{:<w0$}  {:<w1$}  {:>w2$}  {:<w3$}  {:<w4$}  {}",
        "IDENTIFIER".bold(),
        "UNIT".bold(),
        "PRICE".bold(),
        "CONF".bold(),
        "RETRIEVED".bold(),
        "SOURCE".bold(),
        w0 = w_id,
        w1 = w_unit,
        w2 = w_price,
        w3 = w_conf,
        w4 = w_ts,
    );
    println!("{}", "─".repeat(w_id + w_unit + w_price + w_conf + w_ts + 40));

    for entry in table.entries() {
        let conf = match entry.confidence {
            Confidence::Live => entry.confidence.to_string().green().to_string(),
            Confidence::Static => entry.confidence.to_string().dimmed().to_string(),
        };
        println!(
            "{:<w0$}  {:<w1$}  {:>w2$}  {:<w3$}  {:<w4$}  {}",
            truncate(&entry.identifier, w_id),
            entry.unit.to_string(),
            format!("${:.4}", entry.unit_price),
            conf,
            fmt_ts(Some(entry.retrieved_at)),
            truncate(&entry.source, 40).dimmed(),
            w0 = w_id,
            w1 = w_unit,
            w2 = w_price,
            w3 = w_conf,
            w4 = w_ts,
        );
    }
    println!("\n{} entries", table.len());
}

pub fn print_entry(entry: &PricingEntry) {
    println!("\n  Identifier : {}", entry.identifier.cyan());
    println!("  Unit       : {}", entry.unit);
    println!("  Price      : {}", format!("${:.4}", entry.unit_price).green());
    println!("  Currency   : {}", entry.currency);
    println!("  Confidence : {}", entry.confidence);
    println!("  Source     : {}", entry.source);
    println!("  Retrieved  : {}\n", fmt_ts(Some(entry.retrieved_at)));
}
