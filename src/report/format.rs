//! Formatted terminal output for `gd report`.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::CycleOutput;
use crate::config::DashboardConfig;
use crate::domain::{PivotBasis, PivotLevels};
use crate::report::{Card, alert_label, build_cards, commentary, headline, regime_label};

/// Format the full cycle summary: cards, regime, alerts, commentary, pivots.
pub fn format_report(output: &CycleOutput, config: &DashboardConfig) -> String {
    let mut out = String::new();

    out.push_str("=== gd - Gold Macro Dashboard ===\n");
    out.push_str(&format!(
        "Lookback: {} | Rows: {} ({} .. {})\n",
        output.plan.lookback.label(),
        output.table.len(),
        output.plan.display_start,
        output.plan.fetch_end,
    ));

    let Some(signal) = &output.signal else {
        out.push_str("\nNo classification available.\n");
        return out;
    };
    out.push_str(&format!("As-of: {}\n\n", signal.as_of));

    out.push_str(&format_cards(&build_cards(&output.table, signal, &config.thresholds)));
    out.push('\n');

    out.push_str(&format!("Signal: {}\n", headline(signal)));
    if signal.caution.is_some() {
        out.push_str(&format!("  (regime: {})\n", regime_label(signal.regime)));
    }
    if !signal.alerts.is_empty() {
        let labels: Vec<&str> = signal.alerts.iter().map(|a| alert_label(*a)).collect();
        out.push_str(&format!("Alerts: {}\n", labels.join(", ")));
    }

    out.push_str("\nCommentary:\n");
    for line in commentary(signal, &config.thresholds) {
        out.push_str(&format!("- {line}\n"));
    }

    if let Some(pivots) = &output.pivots {
        out.push('\n');
        out.push_str(&format_pivots(pivots));
    }

    if !output.fetch_failures.is_empty() {
        out.push_str("\nUnavailable series:\n");
        for f in &output.fetch_failures {
            out.push_str(&format!("  {:<20} {:<10} {}\n", f.series.key(), truncate(&f.symbol, 10), f.reason));
        }
    }

    out
}

/// One card per line: title, value, delta.
pub fn format_cards(cards: &[Card]) -> String {
    let mut out = String::new();
    for c in cards {
        let value = c.value.as_deref().unwrap_or("n/a");
        let delta = c.delta.as_deref().unwrap_or("");
        let flag = if c.warn { " !" } else { "" };
        out.push_str(format!("{:<22} {:>12} {:<10}{flag}", c.title, value, delta).trim_end());
        out.push('\n');
    }
    out
}

pub fn format_pivots(p: &PivotLevels) -> String {
    let basis = match p.basis {
        PivotBasis::Ohlc => "high/low/close",
        PivotBasis::CloseOnly => "close only",
    };
    format!(
        "Pivots ({}, {basis}): S2 {:.2} | S1 {:.2} | P {:.2} | R1 {:.2} | R2 {:.2}\n",
        p.session, p.s2, p.s1, p.pivot, p.r1, p.r2
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
