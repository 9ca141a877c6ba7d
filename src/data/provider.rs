//! Fetcher traits and structured fetch errors.
//!
//! The pipeline only needs "give me this series over this window". Providers
//! own transport, parsing and any retry policy; the pipeline treats every
//! `FetchError` (and every empty result) as an absent series.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{OhlcBar, RawSeries, Series};

/// Structured error types for fetch operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("HTTP {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    Parse(String),

    #[error("missing {0} in environment (.env)")]
    MissingApiKey(&'static str),

    #[error("provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },
}

/// Daily market quotes (one close per date).
pub trait MarketSource {
    fn name(&self) -> &str;

    /// Closing values for `symbol` over `[start, end]`.
    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate, end: NaiveDate)
    -> Result<RawSeries, FetchError>;

    /// Daily bars for pivot levels. Providers without bar data keep the default.
    fn fetch_ohlc(
        &self,
        _series: Series,
        _symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<OhlcBar>, FetchError> {
        Ok(Vec::new())
    }
}

/// Macroeconomic releases (possibly slower than daily).
pub trait MacroSource {
    fn name(&self) -> &str;

    /// Observations for `symbol` from `start` onwards.
    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate) -> Result<RawSeries, FetchError>;
}
