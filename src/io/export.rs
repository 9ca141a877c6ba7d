//! Export the display table to CSV and the classifier output to JSON.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::align::AlignedTable;
use crate::app::pipeline::{CycleOutput, FetchFailure};
use crate::domain::{Alert, Caution, Field, Lookback, PivotLevels, Regime, SignalMetrics};
use crate::error::AppError;

/// Write every row of `table` with one column per present series and per derived field.
///
/// Missing values are written as empty cells.
pub fn write_table_csv(path: &Path, table: &AlignedTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let series: Vec<_> = table.series().collect();
    let fields: Vec<Field> = Field::ALL.into_iter().filter(|f| table.derived(*f).is_some()).collect();

    let mut header = vec!["date".to_string()];
    header.extend(series.iter().map(|s| s.key().to_string()));
    header.extend(fields.iter().map(|f| f.key().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(series.iter().map(|s| cell(table.value(*s, row))));
        record.extend(fields.iter().map(|f| cell(table.derived_value(*f, row))));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    tracing::info!(path = %path.display(), rows = table.len(), "wrote table CSV");
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// JSON document written by `gd export --signal`.
#[derive(Debug, Serialize)]
pub struct SignalFile<'a> {
    pub tool: &'static str,
    pub as_of: NaiveDate,
    pub lookback: Lookback,
    pub display_start: NaiveDate,
    pub headline: &'static str,
    pub regime: Regime,
    pub caution: Option<Caution>,
    pub alerts: &'a [Alert],
    pub metrics: &'a SignalMetrics,
    pub pivots: Option<&'a PivotLevels>,
    pub fetch_failures: &'a [FetchFailure],
}

/// Write the latest classification.
pub fn write_signal_json(path: &Path, output: &CycleOutput) -> Result<(), AppError> {
    let signal = output
        .signal
        .as_ref()
        .ok_or_else(|| AppError::new(4, "No classification available for this cycle."))?;

    let doc = SignalFile {
        tool: "gd",
        as_of: signal.as_of,
        lookback: output.plan.lookback,
        display_start: output.plan.display_start,
        headline: crate::report::headline(signal),
        regime: signal.regime,
        caution: signal.caution,
        alerts: &signal.alerts,
        metrics: &signal.metrics,
        pivots: output.pivots.as_ref(),
        fetch_failures: &output.fetch_failures,
    };

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create signal JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write signal JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote signal JSON");
    Ok(())
}
