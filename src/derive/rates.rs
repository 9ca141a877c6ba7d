//! Rate differentials: real yield and the two policy spreads.
//!
//! Each is a row-wise difference of two columns. When either input column is
//! absent (or not yet observed on a row) the result is the `0.0` sentinel.

use crate::align::AlignedTable;
use crate::domain::Series;

/// `a - b` per row, `0.0` where either side is missing.
pub fn difference(table: &AlignedTable, a: Series, b: Series) -> Vec<Option<f64>> {
    (0..table.len())
        .map(|row| match (table.value(a, row), table.value(b, row)) {
            (Some(x), Some(y)) => Some(x - y),
            _ => Some(0.0),
        })
        .collect()
}

/// Fisher approximation: nominal 10y yield minus 10y breakeven inflation.
pub fn real_yield(table: &AlignedTable) -> Vec<Option<f64>> {
    difference(table, Series::Nominal10y, Series::Breakeven10y)
}

/// Short-term nominal yield minus the policy rate.
///
/// Negative values mean the bond market prices cuts below the current policy rate.
pub fn rate_expectation_spread(table: &AlignedTable) -> Vec<Option<f64>> {
    difference(table, Series::Treasury2y, Series::FedFunds)
}

/// Overnight repo rate minus the policy rate.
pub fn liquidity_spread(table: &AlignedTable) -> Vec<Option<f64>> {
    difference(table, Series::Sofr, Series::FedFunds)
}
