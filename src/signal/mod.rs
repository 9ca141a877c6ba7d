//! Regime classification from the latest rows of the display table.
//!
//! The classifier has no memory between cycles. It evaluates:
//!
//! 1. the primary regime, an ordered decision list (first match wins)
//! 2. an optional caution that overrides the headline, never the regime
//! 3. independent alert flags
//!
//! Display strings live in `report`; this module only returns data.

use crate::align::AlignedTable;
use crate::config::{DeriveConfig, Thresholds};
use crate::derive::stats;
use crate::domain::{Alert, Caution, Field, PivotLevels, Regime, RegimeSignal, Series, SignalMetrics};

/// Ordered decision list over the policy score and the rate-expectation spread.
pub fn classify_regime(probability: f64, spread: f64, t: &Thresholds) -> Regime {
    if probability > t.headwind_probability && spread > t.headwind_spread {
        Regime::MacroHeadwind
    } else if probability > t.headwind_probability && spread < t.divergence_spread {
        Regime::DivergenceAlert
    } else if probability < t.tailwind_probability && spread < t.tailwind_spread {
        Regime::StrongTailwind
    } else {
        Regime::Neutral
    }
}

/// First caution that fires, risk-off before overheating.
pub fn caution(m: &SignalMetrics, t: &Thresholds) -> Option<Caution> {
    let rising = m.price_momentum.is_some_and(|v| v > 0.0);
    if m.vix.is_some_and(|v| v > t.high_vix) && rising {
        return Some(Caution::RiskOffResonance);
    }

    let above_ma = m.moving_average.is_some_and(|ma| m.price > ma);
    if m.asset_volatility.is_some_and(|v| v > t.high_asset_vol) && above_ma {
        return Some(Caution::OverheatedLongCaution);
    }

    None
}

/// Alert flags in fixed order.
pub fn alerts(m: &SignalMetrics, t: &Thresholds) -> Vec<Alert> {
    let mut out = Vec::new();

    let price_up = m.price_momentum.is_some_and(|v| v > 0.0);
    let holdings_down = m.holdings_momentum.is_some_and(|v| v < 0.0);
    if price_up && holdings_down {
        out.push(Alert::FlowDivergence);
    }
    if m.spec_positioning.is_some_and(|v| v > t.crowded_positioning) {
        out.push(Alert::CrowdedLong);
    }
    if m.pivot.is_some_and(|p| (m.price - p).abs() <= t.pivot_proximity) {
        out.push(Alert::LiquidityVacuum);
    }
    if m.domestic_premium > t.premium_alert {
        out.push(Alert::Arbitrage);
    }

    out
}

/// Read the numeric inputs off the last row (and its trailing rows).
pub fn collect_metrics(
    table: &AlignedTable,
    pivots: Option<&PivotLevels>,
    thresholds: &Thresholds,
    derive: &DeriveConfig,
) -> Option<SignalMetrics> {
    let last = table.last_row()?;
    let price = table.value(table.anchor(), last)?;
    // Trailing statistics run over the days each series actually reported.
    let prices = table.observed_values(table.anchor());
    let field = |f: Field| table.derived_value(f, last).unwrap_or(0.0);

    let dxy = table.observed_values(Series::Dxy);
    let asset_volatility = table
        .value(Series::GoldVol, last)
        .or_else(|| stats::realized_vol_pct(&prices, derive.realized_vol_window));

    Some(SignalMetrics {
        price,
        price_change_pct: stats::pct_change(&prices),
        real_yield: field(Field::RealYield),
        rate_expectation_spread: field_with_inputs(
            table,
            last,
            Field::RateExpectationSpread,
            &[Series::Treasury2y, Series::FedFunds],
        ),
        liquidity_spread: field(Field::LiquiditySpread),
        easing_probability: field_with_inputs(
            table,
            last,
            Field::EasingProbability,
            &[Series::FedFunds, Series::FedFundsFutures],
        ),
        moving_average: table.derived_value(Field::MovingAverage, last),
        pivot: pivots.map(|p| p.pivot),
        domestic_premium: field(Field::DomesticPremium),
        vix: table.value(Series::Vix, last),
        asset_volatility,
        price_momentum: stats::trend_slope(&prices, thresholds.momentum_window),
        holdings_momentum: stats::trend_slope(&table.observed_values(Series::Gld), thresholds.momentum_window),
        spec_positioning: table.value(Series::SpecPositioning, last),
        dxy: table.value(Series::Dxy, last),
        dxy_change_pct: stats::pct_change(&dxy),
    })
}

/// Derived value on `row`, or `None` when any input series has no value there.
fn field_with_inputs(table: &AlignedTable, row: usize, field: Field, inputs: &[Series]) -> Option<f64> {
    inputs
        .iter()
        .all(|s| table.value(*s, row).is_some())
        .then(|| table.derived_value(field, row).unwrap_or(0.0))
}

/// Regime from the rate inputs, `Neutral` when either is unavailable.
pub fn regime_for(m: &SignalMetrics, t: &Thresholds) -> Regime {
    match (m.easing_probability, m.rate_expectation_spread) {
        (Some(probability), Some(spread)) => classify_regime(probability, spread, t),
        _ => {
            tracing::debug!("rate inputs missing, regime held neutral");
            Regime::Neutral
        }
    }
}

/// Full classification of the latest row.
pub fn evaluate(
    table: &AlignedTable,
    pivots: Option<&PivotLevels>,
    thresholds: &Thresholds,
    derive: &DeriveConfig,
) -> Option<RegimeSignal> {
    let metrics = collect_metrics(table, pivots, thresholds, derive)?;
    let as_of = *table.dates().last()?;

    let regime = regime_for(&metrics, thresholds);
    let caution = caution(&metrics, thresholds);
    let alerts = alerts(&metrics, thresholds);

    tracing::info!(%as_of, ?regime, ?caution, alerts = alerts.len(), "classified latest row");

    Some(RegimeSignal {
        as_of,
        regime,
        caution,
        alerts,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn regime_ordering() {
        assert_eq!(classify_regime(85.0, -0.10, &t()), Regime::MacroHeadwind);
        assert_eq!(classify_regime(85.0, -0.35, &t()), Regime::DivergenceAlert);
        assert_eq!(classify_regime(40.0, -0.45, &t()), Regime::StrongTailwind);
        assert_eq!(classify_regime(60.0, -0.05, &t()), Regime::Neutral);
    }

    #[test]
    fn gap_between_headwind_and_divergence_is_neutral() {
        assert_eq!(classify_regime(85.0, -0.20, &t()), Regime::Neutral);
    }

    #[test]
    fn sentinel_inputs_are_neutral() {
        assert_eq!(classify_regime(0.0, 0.0, &t()), Regime::Neutral);
    }

    #[test]
    fn missing_rate_inputs_hold_neutral() {
        let tailwind = SignalMetrics {
            easing_probability: Some(40.0),
            rate_expectation_spread: Some(-0.53),
            ..SignalMetrics::default()
        };
        assert_eq!(regime_for(&tailwind, &t()), Regime::StrongTailwind);

        let no_futures = SignalMetrics { easing_probability: None, ..tailwind.clone() };
        assert_eq!(regime_for(&no_futures, &t()), Regime::Neutral);

        let no_two_year = SignalMetrics { rate_expectation_spread: None, ..tailwind };
        assert_eq!(regime_for(&no_two_year, &t()), Regime::Neutral);
    }

    #[test]
    fn statistics_skip_rows_the_anchor_did_not_trade() {
        use crate::align::align;
        use crate::domain::RawSeries;
        use chrono::NaiveDate;

        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        let table = align(
            &[
                RawSeries::new(
                    Series::Gold,
                    vec![(d(6), Some(2000.0)), (d(7), Some(2010.0)), (d(10), Some(2020.0))],
                ),
                RawSeries::new(Series::FedFunds, vec![(d(9), Some(4.33))]),
            ],
            Series::Gold,
        )
        .unwrap();
        let thresholds = Thresholds { momentum_window: 3, ..t() };
        let m = collect_metrics(&table, None, &thresholds, &DeriveConfig::default()).unwrap();

        // 2010 -> 2020 across the weekend row, not 2010 -> 2010.
        assert!((m.price_change_pct.unwrap() - 10.0 / 2010.0 * 100.0).abs() < 1e-9);
        assert!((m.price_momentum.unwrap() - 10.0 / 2010.0).abs() < 1e-9);
        assert_eq!(m.easing_probability, None);
        assert_eq!(m.rate_expectation_spread, None);
    }

    fn metrics() -> SignalMetrics {
        SignalMetrics {
            price: 2400.0,
            ..SignalMetrics::default()
        }
    }

    #[test]
    fn risk_off_wins_over_overheating() {
        let m = SignalMetrics {
            vix: Some(30.0),
            price_momentum: Some(0.002),
            asset_volatility: Some(30.0),
            moving_average: Some(2300.0),
            ..metrics()
        };
        assert_eq!(caution(&m, &t()), Some(Caution::RiskOffResonance));

        let calm = SignalMetrics { vix: Some(15.0), ..m.clone() };
        assert_eq!(caution(&calm, &t()), Some(Caution::OverheatedLongCaution));

        let below_ma = SignalMetrics { moving_average: Some(2500.0), ..calm };
        assert_eq!(caution(&below_ma, &t()), None);
    }

    #[test]
    fn absent_inputs_never_fire() {
        assert_eq!(caution(&metrics(), &t()), None);
        assert!(alerts(&metrics(), &t()).is_empty());
    }

    #[test]
    fn alerts_are_independent_and_ordered() {
        let m = SignalMetrics {
            price_momentum: Some(0.001),
            holdings_momentum: Some(-0.001),
            spec_positioning: Some(300_000.0),
            pivot: Some(2395.0),
            domestic_premium: 8.0,
            ..metrics()
        };
        assert_eq!(
            alerts(&m, &t()),
            vec![Alert::FlowDivergence, Alert::CrowdedLong, Alert::LiquidityVacuum, Alert::Arbitrage]
        );

        let only_pivot = SignalMetrics { pivot: Some(2409.0), ..metrics() };
        assert_eq!(alerts(&only_pivot, &t()), vec![Alert::LiquidityVacuum]);

        let far = SignalMetrics { pivot: Some(2450.0), ..metrics() };
        assert!(alerts(&far, &t()).is_empty());
    }
}
