//! Shared "evaluation cycle" used by the report, export and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! plan -> fetch -> align -> derive -> display cut -> pivots -> classify
//!
//! The front-ends then only deal with presentation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::align::{self, AlignedTable};
use crate::config::{DashboardConfig, SeriesSpec};
use crate::data::{FetchError, MacroSource, MarketSource};
use crate::derive;
use crate::domain::{Lookback, PivotLevels, RawSeries, RegimeSignal, Series};
use crate::error::PipelineError;
use crate::signal;
use crate::window::{self, WindowPlan};

/// A series that was requested but contributed nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub series: Series,
    pub symbol: String,
    pub reason: String,
}

/// All computed outputs of one cycle.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub plan: WindowPlan,
    /// Display-window rows with derived columns attached.
    pub table: AlignedTable,
    pub pivots: Option<PivotLevels>,
    pub signal: Option<RegimeSignal>,
    pub fetch_failures: Vec<FetchFailure>,
}

/// Run one full cycle against the given providers.
///
/// Individual fetch failures degrade to absent series. Only a missing anchor or
/// an empty display window abort the cycle.
pub fn run_cycle(
    config: &DashboardConfig,
    lookback: Lookback,
    today: NaiveDate,
    market: &dyn MarketSource,
    macro_source: &dyn MacroSource,
) -> Result<CycleOutput, PipelineError> {
    // 1) Window.
    let plan = window::plan(lookback, today, config);
    tracing::debug!(
        lookback = lookback.label(),
        fetch_start = %plan.fetch_start,
        display_start = %plan.display_start,
        "planned window"
    );

    // 2) Fetch. Every configured series is attempted; failures are recorded, not raised.
    let mut raw = Vec::new();
    let mut fetch_failures = Vec::new();
    for spec in &config.market {
        let result = market.fetch(spec.series, &spec.symbol, plan.fetch_start, plan.fetch_end);
        record_fetch(spec, market.name(), result, &mut raw, &mut fetch_failures);
    }
    for spec in &config.macro_series {
        let result = macro_source.fetch(spec.series, &spec.symbol, plan.macro_start(spec));
        record_fetch(spec, macro_source.name(), result, &mut raw, &mut fetch_failures);
    }

    // 3) Align on the full fetched span.
    let mut table = align::align(&raw, config.anchor)?;

    // 4) Derive before cutting so windowed fields see their warm-up history.
    derive::derive_all(&mut table, &config.derive);

    // 5) Display cut.
    table.truncate_before(plan.display_start);
    if table.is_empty() {
        return Err(PipelineError::EmptyDisplayWindow {
            series: config.anchor,
            display_start: plan.display_start,
        });
    }

    // 6) Pivots from the prior session's bar, if the provider has bars.
    let pivots = fetch_pivots(config, &table, &plan, market);

    // 7) Classify the latest row.
    let signal = signal::evaluate(&table, pivots.as_ref(), &config.thresholds, &config.derive);

    tracing::info!(
        rows = table.len(),
        series = table.series().count(),
        failures = fetch_failures.len(),
        "cycle complete"
    );

    Ok(CycleOutput {
        plan,
        table,
        pivots,
        signal,
        fetch_failures,
    })
}

fn record_fetch(
    spec: &SeriesSpec,
    provider: &str,
    result: Result<RawSeries, FetchError>,
    raw: &mut Vec<RawSeries>,
    failures: &mut Vec<FetchFailure>,
) {
    let reason = match result {
        Ok(series) if !series.is_empty() => {
            tracing::debug!(series = spec.series.key(), points = series.points.len(), "fetched");
            raw.push(series);
            return;
        }
        Ok(_) => "no observations in window".to_string(),
        Err(err) => err.to_string(),
    };

    tracing::warn!(series = spec.series.key(), symbol = %spec.symbol, provider, %reason, "series unavailable");
    failures.push(FetchFailure {
        series: spec.series,
        symbol: spec.symbol.clone(),
        reason,
    });
}

fn fetch_pivots(
    config: &DashboardConfig,
    table: &AlignedTable,
    plan: &WindowPlan,
    market: &dyn MarketSource,
) -> Option<PivotLevels> {
    let session = table.dates()[table.prior_session_row()?];

    let bars = match config.market.iter().find(|s| s.series == config.anchor) {
        Some(spec) => market
            .fetch_ohlc(spec.series, &spec.symbol, session, plan.fetch_end)
            .unwrap_or_else(|err| {
                tracing::warn!(symbol = %spec.symbol, error = %err, "no bars for pivots, using closes");
                Vec::new()
            }),
        None => Vec::new(),
    };

    derive::pivot::prior_session_pivots(table, &bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticSource;
    use crate::domain::{Field, PivotBasis};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn synthetic_cycle_produces_signal_and_pivots() {
        let src = SyntheticSource::new(42, today());
        let out = run_cycle(&DashboardConfig::default(), Lookback::ThreeMonths, today(), &src, &src).unwrap();

        assert!(out.fetch_failures.is_empty(), "{:?}", out.fetch_failures);
        assert!(out.table.dates()[0] >= out.plan.display_start);
        assert_eq!(*out.table.dates().last().unwrap(), today());
        // The 200-row average is warm on the very first display row.
        assert!(out.table.derived_value(Field::MovingAverage, 0).is_some());

        let pivots = out.pivots.unwrap();
        assert_eq!(pivots.basis, PivotBasis::Ohlc);
        assert!(out.signal.is_some());
    }

    #[test]
    fn lookback_does_not_change_latest_values() {
        let src = SyntheticSource::new(9, today());
        let config = DashboardConfig::default();
        let short = run_cycle(&config, Lookback::OneMonth, today(), &src, &src).unwrap();
        let long = run_cycle(&config, Lookback::TwoYears, today(), &src, &src).unwrap();

        let last_short = short.table.last_row().unwrap();
        let last_long = long.table.last_row().unwrap();
        for field in Field::ALL {
            assert_eq!(
                short.table.derived_value(field, last_short),
                long.table.derived_value(field, last_long),
                "{field:?}"
            );
        }
        assert!(long.table.len() > short.table.len());
    }
}
