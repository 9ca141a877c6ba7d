//! Temporal alignment of irregularly sampled series.
//!
//! Steps, in order:
//!
//! 1. dedup each raw series by date (last arrival wins)
//! 2. outer-join on the date union
//! 3. sort ascending
//! 4. forward-fill every column independently
//! 5. drop leading rows where the anchor is still missing
//!
//! Derived columns are attached later by `derive` and share the same index.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{Field, RawSeries, Series};
use crate::error::PipelineError;

/// Date-indexed table of forward-filled raw columns plus derived columns.
///
/// Invariants:
/// - `dates` strictly increasing
/// - every column has `dates.len()` entries
/// - the anchor column has no `None`
/// - `observed` marks the rows a series was actually reported on, before fill
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    anchor: Series,
    dates: Vec<NaiveDate>,
    raw: BTreeMap<Series, Vec<Option<f64>>>,
    observed: BTreeMap<Series, Vec<bool>>,
    derived: BTreeMap<Field, Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn anchor(&self) -> Series {
        self.anchor
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// True when the series was fetched and carried at least one value.
    pub fn has(&self, series: Series) -> bool {
        self.raw.contains_key(&series)
    }

    /// Raw (filled) column, if the series was present.
    pub fn column(&self, series: Series) -> Option<&[Option<f64>]> {
        self.raw.get(&series).map(Vec::as_slice)
    }

    /// The anchor column with the no-missing invariant made explicit.
    pub fn anchor_values(&self) -> Vec<f64> {
        self.raw
            .get(&self.anchor)
            .map(|col| col.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .unwrap_or_default()
    }

    /// True when `series` was reported on `row` rather than forward-filled.
    pub fn is_observed(&self, series: Series, row: usize) -> bool {
        self.observed
            .get(&series)
            .and_then(|mask| mask.get(row).copied())
            .unwrap_or(false)
    }

    /// Rows on which the anchor traded.
    pub fn session_rows(&self) -> Vec<usize> {
        (0..self.len()).filter(|&row| self.is_observed(self.anchor, row)).collect()
    }

    /// Values of `series` on the rows it was reported on, oldest first.
    pub fn observed_values(&self, series: Series) -> Vec<f64> {
        let Some(col) = self.raw.get(&series) else {
            return Vec::new();
        };
        col.iter()
            .enumerate()
            .filter(|&(row, _)| self.is_observed(series, row))
            .filter_map(|(_, v)| *v)
            .collect()
    }

    /// Latest anchor session strictly before the last row, or the last row
    /// when no earlier session is left in the table.
    pub fn prior_session_row(&self) -> Option<usize> {
        let last = self.last_row()?;
        Some(
            (0..last)
                .rev()
                .find(|&row| self.is_observed(self.anchor, row))
                .unwrap_or(last),
        )
    }

    pub fn derived(&self, field: Field) -> Option<&[Option<f64>]> {
        self.derived.get(&field).map(Vec::as_slice)
    }

    /// Present raw series, in column order.
    pub fn series(&self) -> impl Iterator<Item = Series> + '_ {
        self.raw.keys().copied()
    }

    /// Value of `series` on row `row`, forward-filled, if the series is present.
    pub fn value(&self, series: Series, row: usize) -> Option<f64> {
        self.raw.get(&series).and_then(|col| col.get(row).copied().flatten())
    }

    pub fn derived_value(&self, field: Field, row: usize) -> Option<f64> {
        self.derived.get(&field).and_then(|col| col.get(row).copied().flatten())
    }

    pub fn last_row(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    /// Attach a derived column computed over this table's index.
    ///
    /// Panics in debug builds when the length does not match the index.
    pub fn set_derived(&mut self, field: Field, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len(), "derived column length mismatch");
        self.derived.insert(field, values);
    }

    /// Keep rows dated on or after `start`.
    pub fn truncate_before(&mut self, start: NaiveDate) {
        let cut = self.dates.partition_point(|d| *d < start);
        if cut == 0 {
            return;
        }
        self.dates.drain(..cut);
        for col in self.raw.values_mut() {
            col.drain(..cut);
        }
        for mask in self.observed.values_mut() {
            mask.drain(..cut);
        }
        for col in self.derived.values_mut() {
            col.drain(..cut);
        }
    }
}

/// Collapse duplicate dates, keeping the last-arriving observation.
///
/// Non-finite values are treated as missing.
pub fn dedup_last_wins(points: &[(NaiveDate, Option<f64>)]) -> BTreeMap<NaiveDate, Option<f64>> {
    let mut out = BTreeMap::new();
    for &(date, value) in points {
        out.insert(date, value.filter(|v| v.is_finite()));
    }
    out
}

/// Forward-fill a column in place. Leading gaps stay missing.
pub fn forward_fill(column: &mut [Option<f64>]) {
    let mut last = None;
    for slot in column.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

/// Merge raw series into one aligned, forward-filled table.
///
/// Series that carry no usable value are omitted. Several `RawSeries` with the
/// same name are concatenated in arrival order before dedup.
pub fn align(inputs: &[RawSeries], anchor: Series) -> Result<AlignedTable, PipelineError> {
    let mut merged: BTreeMap<Series, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
    for raw in inputs {
        merged.entry(raw.name).or_default().extend(raw.points.iter().copied());
    }

    let deduped: BTreeMap<Series, BTreeMap<NaiveDate, Option<f64>>> = merged
        .into_iter()
        .map(|(name, points)| (name, dedup_last_wins(&points)))
        .filter(|(_, points)| points.values().any(Option::is_some))
        .collect();

    if !deduped.contains_key(&anchor) {
        return Err(PipelineError::MissingAnchor { series: anchor });
    }

    let index: BTreeSet<NaiveDate> = deduped.values().flat_map(|p| p.keys().copied()).collect();
    let dates: Vec<NaiveDate> = index.into_iter().collect();

    let mut raw = BTreeMap::new();
    let mut observed = BTreeMap::new();
    for (name, points) in &deduped {
        let mut col: Vec<Option<f64>> = dates.iter().map(|d| points.get(d).copied().flatten()).collect();
        observed.insert(*name, col.iter().map(Option::is_some).collect::<Vec<bool>>());
        forward_fill(&mut col);
        raw.insert(*name, col);
    }

    let first_anchor = raw
        .get(&anchor)
        .and_then(|col: &Vec<Option<f64>>| col.iter().position(Option::is_some))
        .ok_or(PipelineError::MissingAnchor { series: anchor })?;

    let mut table = AlignedTable {
        anchor,
        dates,
        raw,
        observed,
        derived: BTreeMap::new(),
    };
    if first_anchor > 0 {
        let start = table.dates[first_anchor];
        table.truncate_before(start);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn series(name: Series, points: &[(u32, Option<f64>)]) -> RawSeries {
        RawSeries::new(name, points.iter().map(|&(day, v)| (d(day), v)).collect())
    }

    #[test]
    fn forward_fill_keeps_leading_gap() {
        let mut col = vec![None, Some(1.0), None, None, Some(2.0), None];
        forward_fill(&mut col);
        assert_eq!(col, vec![None, Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn duplicate_dates_keep_last_arrival() {
        let points = vec![(d(1), Some(1.0)), (d(2), Some(2.0)), (d(1), Some(9.0))];
        let out = dedup_last_wins(&points);
        assert_eq!(out.get(&d(1)), Some(&Some(9.0)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn missing_anchor_is_a_hard_stop() {
        let inputs = vec![series(Series::Sofr, &[(1, Some(4.3))])];
        let err = align(&inputs, Series::Gold).unwrap_err();
        assert_eq!(err, PipelineError::MissingAnchor { series: Series::Gold });

        let all_missing = vec![series(Series::Gold, &[(1, None), (2, None)])];
        assert!(matches!(
            align(&all_missing, Series::Gold),
            Err(PipelineError::MissingAnchor { .. })
        ));
    }

    #[test]
    fn rows_before_first_anchor_observation_are_dropped() {
        let inputs = vec![
            series(Series::Gold, &[(3, Some(2000.0)), (5, Some(2010.0))]),
            series(Series::FedFunds, &[(1, Some(4.33)), (4, Some(4.08))]),
        ];
        let table = align(&inputs, Series::Gold).unwrap();
        assert_eq!(table.dates(), &[d(3), d(4), d(5)]);
        // Policy rate observed before the first anchor row still fills forward into it.
        assert_eq!(table.value(Series::FedFunds, 0), Some(4.33));
        assert_eq!(table.value(Series::Gold, 1), Some(2000.0));
        assert_eq!(table.value(Series::FedFunds, 2), Some(4.08));
    }

    #[test]
    fn empty_non_anchor_series_is_omitted() {
        let inputs = vec![
            series(Series::Gold, &[(1, Some(2000.0))]),
            RawSeries::empty(Series::Sofr),
            series(Series::Vix, &[(1, None)]),
        ];
        let table = align(&inputs, Series::Gold).unwrap();
        assert!(!table.has(Series::Sofr));
        assert!(!table.has(Series::Vix));
        assert_eq!(table.series().collect::<Vec<_>>(), vec![Series::Gold]);
    }

    #[test]
    fn unordered_input_is_sorted() {
        let inputs = vec![series(
            Series::Gold,
            &[(5, Some(3.0)), (1, Some(1.0)), (3, Some(2.0))],
        )];
        let table = align(&inputs, Series::Gold).unwrap();
        assert_eq!(table.dates(), &[d(1), d(3), d(5)]);
        assert_eq!(table.anchor_values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn truncate_cuts_every_column() {
        let inputs = vec![
            series(Series::Gold, &[(1, Some(1.0)), (2, Some(2.0)), (3, Some(3.0))]),
            series(Series::Sofr, &[(2, Some(4.0))]),
        ];
        let mut table = align(&inputs, Series::Gold).unwrap();
        table.set_derived(Field::RealYield, vec![Some(0.1), Some(0.2), Some(0.3)]);
        table.truncate_before(d(2));
        assert_eq!(table.dates(), &[d(2), d(3)]);
        assert_eq!(table.column(Series::Sofr).unwrap(), &[Some(4.0), Some(4.0)]);
        assert_eq!(table.derived(Field::RealYield).unwrap(), &[Some(0.2), Some(0.3)]);
    }

    #[test]
    fn filled_rows_are_not_sessions() {
        let inputs = vec![
            series(Series::Gold, &[(6, Some(2000.0)), (7, Some(2010.0)), (10, Some(2020.0))]),
            // Policy rate released on a weekend.
            series(Series::FedFunds, &[(9, Some(4.33))]),
        ];
        let table = align(&inputs, Series::Gold).unwrap();
        assert_eq!(table.dates(), &[d(6), d(7), d(9), d(10)]);
        assert_eq!(table.session_rows(), vec![0, 1, 3]);
        assert!(!table.is_observed(Series::Gold, 2));
        assert!(table.is_observed(Series::FedFunds, 2));
        assert_eq!(table.observed_values(Series::Gold), vec![2000.0, 2010.0, 2020.0]);
        assert_eq!(table.prior_session_row(), Some(1));

        let mut cut = table.clone();
        cut.truncate_before(d(9));
        assert_eq!(cut.session_rows(), vec![1]);
        // Only the last row is a session once the cut drops the earlier ones.
        assert_eq!(cut.prior_session_row(), Some(1));
    }

    fn arb_series(name: Series) -> impl Strategy<Value = RawSeries> {
        prop::collection::vec((1u32..=28, prop::option::weighted(0.8, 1.0f64..3000.0)), 0..40)
            .prop_map(move |pts| series(name, &pts))
    }

    fn arb_inputs() -> impl Strategy<Value = Vec<RawSeries>> {
        (
            arb_series(Series::Gold),
            arb_series(Series::Sofr),
            arb_series(Series::FedFunds),
        )
            .prop_map(|(a, b, c)| vec![a, b, c])
    }

    proptest! {
        #[test]
        fn alignment_is_deterministic(inputs in arb_inputs()) {
            let a = align(&inputs, Series::Gold);
            let b = align(&inputs, Series::Gold);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn dedup_is_idempotent(inputs in arb_inputs()) {
            let deduped: Vec<RawSeries> = inputs
                .iter()
                .map(|s| RawSeries::new(s.name, dedup_last_wins(&s.points).into_iter().collect()))
                .collect();
            prop_assert_eq!(align(&inputs, Series::Gold), align(&deduped, Series::Gold));
        }

        #[test]
        fn anchor_never_missing(inputs in arb_inputs()) {
            if let Ok(table) = align(&inputs, Series::Gold) {
                prop_assert!(table.column(Series::Gold).unwrap().iter().all(Option::is_some));
                prop_assert!(table.dates().windows(2).all(|w| w[0] < w[1]));
            }
        }

        #[test]
        fn forward_fill_matches_latest_observation(inputs in arb_inputs()) {
            let Ok(table) = align(&inputs, Series::Gold) else { return Ok(()); };
            for raw in &inputs {
                let Some(col) = table.column(raw.name) else { continue; };
                let observed = dedup_last_wins(&raw.points);
                for (row, date) in table.dates().iter().enumerate() {
                    let expected = observed
                        .range(..=*date)
                        .rev()
                        .find_map(|(_, v)| *v);
                    prop_assert_eq!(col[row], expected);
                }
            }
        }
    }
}
