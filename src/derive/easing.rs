//! Policy probability heuristic from a rate-futures quote.
//!
//! The futures quote implies a rate of `100 - quote`. The gap is
//! `policy_rate - implied_rate`:
//!
//! - gap <= 0: futures price nothing below the policy rate -> 95
//! - gap >= 0.25: a full 25bp move is priced -> 10
//! - in between: linear from 95 down to 10, floored to an integer
//!
//! The score is high while the policy rate is expected to stay put, which is
//! how the classifier reads it. It is a heuristic in [10, 95], not a
//! calibrated probability.

use crate::align::AlignedTable;
use crate::domain::Series;

const SCORE_AT_ZERO_GAP: f64 = 95.0;
const SCORE_AT_FULL_STEP: f64 = 10.0;
const FULL_STEP: f64 = 0.25;

/// Rate implied by a futures quote.
pub fn implied_rate(quote: f64) -> f64 {
    100.0 - quote
}

/// Map a policy-vs-implied gap to the heuristic score.
pub fn score_from_gap(gap: f64) -> u8 {
    if gap <= 0.0 {
        return SCORE_AT_ZERO_GAP as u8;
    }
    if gap >= FULL_STEP {
        return SCORE_AT_FULL_STEP as u8;
    }
    let score = SCORE_AT_ZERO_GAP - (gap / FULL_STEP) * (SCORE_AT_ZERO_GAP - SCORE_AT_FULL_STEP);
    score.floor() as u8
}

/// Score for one row; `None` when either input is missing or non-finite.
pub fn policy_easing_probability(policy_rate: Option<f64>, futures_quote: Option<f64>) -> Option<u8> {
    let gap = policy_rate? - implied_rate(futures_quote?);
    gap.is_finite().then(|| score_from_gap(gap))
}

/// Column over the table, `0.0` sentinel where inputs are missing.
pub fn easing_column(table: &AlignedTable) -> Vec<Option<f64>> {
    (0..table.len())
        .map(|row| {
            let score = policy_easing_probability(
                table.value(Series::FedFunds, row),
                table.value(Series::FedFundsFutures, row),
            );
            Some(score.map(f64::from).unwrap_or(0.0))
        })
        .collect()
}
