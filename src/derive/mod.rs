//! Derivation engine: secondary fields computed from the aligned table.
//!
//! Every field is a total function of the table. Missing inputs degrade to the
//! `0.0` sentinel; the only field that can be legitimately empty on a row is
//! the moving average during its warm-up.

pub mod easing;
pub mod moving_average;
pub mod pivot;
pub mod premium;
pub mod rates;
pub mod stats;

use crate::align::AlignedTable;
use crate::config::DeriveConfig;
use crate::domain::Field;

/// Attach every derived column to `table`.
///
/// Must run on the full fetched history, before the display cut.
pub fn derive_all(table: &mut AlignedTable, config: &DeriveConfig) {
    let real_yield = rates::real_yield(table);
    let rate_spread = rates::rate_expectation_spread(table);
    let liquidity = rates::liquidity_spread(table);
    let ma = moving_average::session_mean(table, config.ma_window);
    let (fair_value, premium) = premium::premium_columns(table, config);
    let easing = easing::easing_column(table);

    table.set_derived(Field::RealYield, real_yield);
    table.set_derived(Field::RateExpectationSpread, rate_spread);
    table.set_derived(Field::LiquiditySpread, liquidity);
    table.set_derived(Field::MovingAverage, ma);
    table.set_derived(Field::FairValueLocal, fair_value);
    table.set_derived(Field::DomesticPremium, premium);
    table.set_derived(Field::EasingProbability, easing);

    tracing::debug!(rows = table.len(), ma_window = config.ma_window, "derived fields attached");
}
