//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - series/column keys (`Series`, `Field`) and release cadences (`Cadence`)
//! - fetcher payloads (`RawSeries`, `OhlcBar`)
//! - classifier outputs (`Regime`, `Caution`, `Alert`, `RegimeSignal`)

pub mod types;

pub use types::*;
