//! Trailing simple moving average over the anchor column.
//!
//! Computed on the full fetched history before the table is cut to the display
//! window, so the first displayed rows already have a value. The window counts
//! anchor sessions; rows added by other series carry the last session's mean.

use crate::align::AlignedTable;

/// Trailing mean of the last `window` values.
///
/// Rows with fewer than `window` observations so far have no value (warm-up).
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = vec![None; values.len()];
    for (end, chunk) in values.windows(window).enumerate() {
        let mean = chunk.iter().sum::<f64>() / window as f64;
        out[end + window - 1] = mean.is_finite().then_some(mean);
    }
    out
}

/// Trailing mean over anchor sessions, spread back onto every table row.
pub fn session_mean(table: &AlignedTable, window: usize) -> Vec<Option<f64>> {
    let anchor = table.anchor();
    let means = trailing_mean(&table.observed_values(anchor), window);

    let mut out = vec![None; table.len()];
    for (row, mean) in table.session_rows().into_iter().zip(means) {
        out[row] = mean;
    }
    for row in 1..out.len() {
        if !table.is_observed(anchor, row) {
            out[row] = out[row - 1];
        }
    }
    out
}
