//! Classic floor-trader pivot levels.
//!
//! ```text
//! pivot = (H + L + C) / 3
//! R1 = 2*pivot - L      S1 = 2*pivot - H
//! R2 = pivot + (H - L)  S2 = pivot - (H - L)
//! ```
//!
//! Levels come from the most recent completed session: the latest row before
//! the last one on which the anchor actually traded. Rows that exist only
//! because another series reported that day are skipped. If the market fetcher
//! supplied a real bar for that session it is used; otherwise the session
//! close stands in for high and low (`PivotBasis::CloseOnly`), which collapses
//! every level onto the close. Callers should surface that basis.

use chrono::NaiveDate;

use crate::align::AlignedTable;
use crate::domain::{OhlcBar, PivotBasis, PivotLevels};

/// Apply the pivot formula to one (H, L, C) triple.
pub fn pivot_levels(session: NaiveDate, basis: PivotBasis, high: f64, low: f64, close: f64) -> PivotLevels {
    let pivot = (high + low + close) / 3.0;
    let range = high - low;
    PivotLevels {
        session,
        basis,
        pivot,
        r1: 2.0 * pivot - low,
        s1: 2.0 * pivot - high,
        r2: pivot + range,
        s2: pivot - range,
    }
}

/// Levels for the anchor session before the table's last row.
///
/// A table with a single session uses that row. `bars` may be empty.
pub fn prior_session_pivots(table: &AlignedTable, bars: &[OhlcBar]) -> Option<PivotLevels> {
    let row = table.prior_session_row()?;
    let session = table.dates()[row];

    let bar = bars
        .iter()
        .filter(|b| b.date == session)
        .find(|b| b.high.is_finite() && b.low.is_finite() && b.close.is_finite() && b.high >= b.low);
    if let Some(bar) = bar {
        return Some(pivot_levels(session, PivotBasis::Ohlc, bar.high, bar.low, bar.close));
    }

    let close = table.value(table.anchor(), row)?;
    Some(pivot_levels(session, PivotBasis::CloseOnly, close, close, close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::domain::{RawSeries, Series};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    #[test]
    fn formula_is_exact() {
        let p = pivot_levels(d(1), PivotBasis::Ohlc, 2050.0, 2020.0, 2035.0);
        assert_eq!(p.pivot, 2035.0);
        assert_eq!(p.r1, 2050.0);
        assert_eq!(p.s1, 2020.0);
        assert_eq!(p.r2, 2065.0);
        assert_eq!(p.s2, 2005.0);
    }

    fn table() -> AlignedTable {
        align(
            &[RawSeries::new(
                Series::Gold,
                vec![(d(3), Some(2030.0)), (d(4), Some(2035.0)), (d(5), Some(2041.0))],
            )],
            Series::Gold,
        )
        .unwrap()
    }

    #[test]
    fn uses_prior_session_bar_when_available() {
        let bars = vec![
            OhlcBar { date: d(4), high: 2050.0, low: 2020.0, close: 2035.0 },
            OhlcBar { date: d(5), high: 2060.0, low: 2030.0, close: 2041.0 },
        ];
        let p = prior_session_pivots(&table(), &bars).unwrap();
        assert_eq!(p.basis, PivotBasis::Ohlc);
        assert_eq!(p.session, d(4));
        assert_eq!(p.pivot, 2035.0);
    }

    #[test]
    fn falls_back_to_close_only() {
        let p = prior_session_pivots(&table(), &[]).unwrap();
        assert_eq!(p.basis, PivotBasis::CloseOnly);
        assert_eq!(p.session, d(4));
        for level in [p.pivot, p.r1, p.s1, p.r2, p.s2] {
            assert_eq!(level, 2035.0);
        }
    }

    #[test]
    fn weekend_macro_row_is_not_a_session() {
        let t = align(
            &[
                RawSeries::new(
                    Series::Gold,
                    vec![
                        (d(27), Some(2030.0)),
                        (d(28), Some(2035.0)),
                        (NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), Some(2041.0)),
                    ],
                ),
                // 2025-03-01 is a Saturday.
                RawSeries::new(
                    Series::FedFunds,
                    vec![(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), Some(4.33))],
                ),
            ],
            Series::Gold,
        )
        .unwrap();
        let bars = vec![OhlcBar { date: d(28), high: 2050.0, low: 2020.0, close: 2035.0 }];

        let p = prior_session_pivots(&t, &bars).unwrap();
        assert_eq!(p.session, d(28));
        assert_eq!(p.basis, PivotBasis::Ohlc);
        assert_eq!(p.pivot, 2035.0);
        assert_eq!(p.r1, 2050.0);
    }

    #[test]
    fn single_row_uses_that_row() {
        let t = align(&[RawSeries::new(Series::Gold, vec![(d(9), Some(1990.0))])], Series::Gold).unwrap();
        let p = prior_session_pivots(&t, &[]).unwrap();
        assert_eq!(p.session, d(9));
        assert_eq!(p.pivot, 1990.0);
    }
}
