//! Presentation data: metric cards, label mapping and commentary.
//!
//! Nothing here feeds back into the pipeline. Every display string for a
//! regime, caution or alert lives in this module.

use crate::align::AlignedTable;
use crate::config::Thresholds;
use crate::domain::{Alert, Caution, Regime, RegimeSignal, Series};

pub mod format;

pub use format::format_report;

/// Liquidity spread status shown on its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityStatus {
    Normal,
    Stressed,
}

impl LiquidityStatus {
    pub fn label(self) -> &'static str {
        match self {
            LiquidityStatus::Normal => "normal",
            LiquidityStatus::Stressed => "stressed",
        }
    }
}

/// Normal strictly inside the band, stressed on or beyond it.
pub fn liquidity_status(spread: f64, band: f64) -> LiquidityStatus {
    if spread.abs() < band {
        LiquidityStatus::Normal
    } else {
        LiquidityStatus::Stressed
    }
}

/// One headline metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: &'static str,
    /// `None` when the inputs were not available this cycle.
    pub value: Option<String>,
    pub delta: Option<String>,
    /// Highlighted in the TUI.
    pub warn: bool,
}

impl Card {
    fn missing(title: &'static str) -> Self {
        Self {
            title,
            value: None,
            delta: None,
            warn: false,
        }
    }
}

pub fn regime_label(regime: Regime) -> &'static str {
    match regime {
        Regime::MacroHeadwind => "Macro Headwind",
        Regime::DivergenceAlert => "Divergence Alert",
        Regime::StrongTailwind => "Strong Tailwind",
        Regime::Neutral => "Neutral",
    }
}

pub fn caution_label(caution: Caution) -> &'static str {
    match caution {
        Caution::RiskOffResonance => "Risk-Off Resonance",
        Caution::OverheatedLongCaution => "Overheated Long Caution",
    }
}

pub fn alert_label(alert: Alert) -> &'static str {
    match alert {
        Alert::FlowDivergence => "Flow Divergence",
        Alert::CrowdedLong => "Crowded Long",
        Alert::LiquidityVacuum => "Liquidity Vacuum",
        Alert::Arbitrage => "Arbitrage",
    }
}

/// Displayed headline: a caution replaces the regime label.
pub fn headline(signal: &RegimeSignal) -> &'static str {
    match signal.caution {
        Some(c) => caution_label(c),
        None => regime_label(signal.regime),
    }
}

fn signed_pct(pct: Option<f64>) -> Option<String> {
    pct.map(|p| format!("{p:+.2}%"))
}

/// The four headline cards: gold, real yield, liquidity spread, dollar index.
pub fn build_cards(table: &AlignedTable, signal: &RegimeSignal, thresholds: &Thresholds) -> Vec<Card> {
    let m = &signal.metrics;

    let gold = Card {
        title: "Gold (USD)",
        value: Some(format!("${:.2}", m.price)),
        delta: signed_pct(m.price_change_pct),
        warn: false,
    };

    // Fisher estimate first, the published TIPS yield when the inputs are missing.
    let published = table.last_row().and_then(|row| table.value(Series::Real10y, row));
    let real_value = if table.has(Series::Nominal10y) && table.has(Series::Breakeven10y) {
        Some(m.real_yield)
    } else {
        published
    };
    let real_yield = match real_value {
        Some(v) => Card {
            title: "10Y Real Yield",
            value: Some(format!("{v:.2}%")),
            delta: None,
            warn: false,
        },
        None => Card::missing("10Y Real Yield"),
    };

    let liquidity = if table.has(Series::Sofr) && table.has(Series::FedFunds) {
        let status = liquidity_status(m.liquidity_spread, thresholds.liquidity_alert);
        Card {
            title: "Liquidity (SOFR-FF)",
            value: Some(format!("{:.3}%", m.liquidity_spread)),
            delta: Some(status.label().to_string()),
            warn: status == LiquidityStatus::Stressed,
        }
    } else {
        Card::missing("Liquidity (SOFR-FF)")
    };

    let dxy = match m.dxy {
        Some(v) => Card {
            title: "Dollar Index",
            value: Some(format!("{v:.2}")),
            delta: signed_pct(m.dxy_change_pct),
            warn: false,
        },
        None => Card::missing("Dollar Index"),
    };

    vec![gold, real_yield, liquidity, dxy]
}

fn missing_rate_inputs(no_probability: bool, no_spread: bool) -> &'static str {
    match (no_probability, no_spread) {
        (true, true) => "easing score and 2y-policy spread",
        (true, false) => "easing score",
        _ => "2y-policy spread",
    }
}

/// One sentence for the regime, then any caution, then each alert.
pub fn commentary(signal: &RegimeSignal, thresholds: &Thresholds) -> Vec<String> {
    let m = &signal.metrics;
    let mut lines = Vec::new();

    let regime = match (signal.regime, m.easing_probability, m.rate_expectation_spread) {
        (Regime::MacroHeadwind, Some(p), Some(spread)) => format!(
            "Futures price little easing (score {p:.0}) and the 2y yield sits near policy ({spread:+.2}): rates are a headwind for gold."
        ),
        (Regime::DivergenceAlert, Some(p), Some(spread)) => format!(
            "Futures price little easing (score {p:.0}) but the 2y yield trades {:.2} below policy: bonds and futures disagree.",
            spread.abs()
        ),
        (Regime::StrongTailwind, Some(p), Some(spread)) => format!(
            "Easing is being priced (score {p:.0}) and the 2y yield is {:.2} below policy: the rate backdrop supports gold.",
            spread.abs()
        ),
        (_, Some(p), Some(spread)) => format!("No decisive rate signal (score {p:.0}, 2y-policy spread {spread:+.2})."),
        (_, probability, spread) => format!(
            "No rate call: {} unavailable this cycle.",
            missing_rate_inputs(probability.is_none(), spread.is_none())
        ),
    };
    lines.push(regime);

    match signal.caution {
        Some(Caution::RiskOffResonance) => lines.push(format!(
            "VIX at {:.1} with gold trending up: safe-haven demand, expect wide swings.",
            m.vix.unwrap_or_default()
        )),
        Some(Caution::OverheatedLongCaution) => lines.push(format!(
            "Gold volatility at {:.1} with price above its moving average ({:.2}): longs look stretched.",
            m.asset_volatility.unwrap_or_default(),
            m.moving_average.unwrap_or_default()
        )),
        None => {}
    }

    for alert in &signal.alerts {
        let line = match alert {
            Alert::FlowDivergence => {
                "Price is rising while tracked holdings fall: the move is not confirmed by fund flows.".to_string()
            }
            Alert::CrowdedLong => format!(
                "Speculative net longs at {:.0} exceed the crowding threshold ({:.0}).",
                m.spec_positioning.unwrap_or_default(),
                thresholds.crowded_positioning
            ),
            Alert::LiquidityVacuum => format!(
                "Price {:.2} is within {:.2} of the pivot {:.2}: watch for a break either way.",
                m.price,
                thresholds.pivot_proximity,
                m.pivot.unwrap_or_default()
            ),
            Alert::Arbitrage => format!(
                "Domestic premium of {:.2} per gram exceeds {:.2}: cross-market arbitrage pressure.",
                m.domestic_premium, thresholds.premium_alert
            ),
        };
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalMetrics;
    use chrono::NaiveDate;

    fn signal(regime: Regime, caution: Option<Caution>, alerts: Vec<Alert>) -> RegimeSignal {
        RegimeSignal {
            as_of: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            regime,
            caution,
            alerts,
            metrics: SignalMetrics {
                price: 2400.0,
                ..SignalMetrics::default()
            },
        }
    }

    #[test]
    fn liquidity_band_edges() {
        assert_eq!(liquidity_status(0.05, 0.10), LiquidityStatus::Normal);
        assert_eq!(liquidity_status(-0.099, 0.10), LiquidityStatus::Normal);
        assert_eq!(liquidity_status(0.10, 0.10), LiquidityStatus::Stressed);
        assert_eq!(liquidity_status(-0.25, 0.10), LiquidityStatus::Stressed);
    }

    #[test]
    fn caution_replaces_headline_only() {
        let s = signal(Regime::MacroHeadwind, Some(Caution::RiskOffResonance), vec![]);
        assert_eq!(headline(&s), "Risk-Off Resonance");
        assert_eq!(regime_label(s.regime), "Macro Headwind");

        let plain = signal(Regime::StrongTailwind, None, vec![]);
        assert_eq!(headline(&plain), "Strong Tailwind");
    }

    #[test]
    fn cards_fall_back_and_mark_missing_inputs() {
        use crate::align::align;
        use crate::domain::RawSeries;

        let d = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let table = align(
            &[
                RawSeries::new(Series::Gold, vec![(d, Some(2400.0))]),
                RawSeries::new(Series::Real10y, vec![(d, Some(1.87))]),
            ],
            Series::Gold,
        )
        .unwrap();
        let s = signal(Regime::Neutral, None, vec![]);
        let cards = build_cards(&table, &s, &Thresholds::default());

        assert_eq!(cards[0].value.as_deref(), Some("$2400.00"));
        assert_eq!(cards[1].value.as_deref(), Some("1.87%"));
        assert_eq!(cards[2].value, None);
        assert_eq!(cards[3].value, None);
    }

    #[test]
    fn missing_easing_score_is_not_read_as_zero() {
        let mut s = signal(Regime::Neutral, None, vec![]);
        s.metrics.rate_expectation_spread = Some(-0.53);
        let lines = commentary(&s, &Thresholds::default());
        assert_eq!(lines[0], "No rate call: easing score unavailable this cycle.");
        assert!(!lines[0].contains("score 0"));
    }

    #[test]
    fn commentary_has_one_line_per_item() {
        let mut s = signal(
            Regime::Neutral,
            Some(Caution::OverheatedLongCaution),
            vec![Alert::FlowDivergence, Alert::Arbitrage],
        );
        s.metrics.easing_probability = Some(60.0);
        s.metrics.rate_expectation_spread = Some(-0.05);
        let lines = commentary(&s, &Thresholds::default());
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("No decisive rate signal"));
        assert!(lines[3].contains("arbitrage"));
    }
}
