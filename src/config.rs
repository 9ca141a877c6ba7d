//! Immutable dashboard configuration.
//!
//! Ticker mappings, window sizing, derivation constants and classifier
//! thresholds are plain values handed to the pipeline. Every field has a
//! default, so a TOML file only needs to name what it overrides:
//!
//! ```toml
//! [thresholds]
//! high_vix = 30.0
//!
//! [[macro]]
//! series = "spec_positioning"
//! symbol = "MY_COT_SERIES"
//! cadence = "weekly"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Cadence, Series};
use crate::error::AppError;

/// Grams per troy ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1034768;

/// A logical series and the provider symbol it is fetched under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub series: Series,
    pub symbol: String,
    #[serde(default = "default_cadence")]
    pub cadence: Cadence,
}

fn default_cadence() -> Cadence {
    Cadence::Daily
}

impl SeriesSpec {
    pub fn new(series: Series, symbol: &str, cadence: Cadence) -> Self {
        Self {
            series,
            symbol: symbol.to_string(),
            cadence,
        }
    }
}

/// Fetch-window sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Minimum calendar span fetched regardless of the display lookback.
    pub baseline_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { baseline_days: 730 }
    }
}

/// Constants used by the derivation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Moving-average window in observations.
    pub ma_window: usize,
    pub troy_ounce_grams: f64,
    /// Fixed offset added to fair value to stand in for a domestic quote
    /// (local currency per gram). Only used when no `DomesticQuote` series is present.
    pub domestic_quote_offset: f64,
    /// Rows used for realized volatility when no implied asset volatility is fetched.
    pub realized_vol_window: usize,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            ma_window: 200,
            troy_ounce_grams: TROY_OUNCE_GRAMS,
            domestic_quote_offset: 2.0,
            realized_vol_window: 20,
        }
    }
}

/// Classifier calibration knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub headwind_probability: f64,
    pub headwind_spread: f64,
    pub divergence_spread: f64,
    pub tailwind_probability: f64,
    pub tailwind_spread: f64,
    pub high_vix: f64,
    pub high_asset_vol: f64,
    pub crowded_positioning: f64,
    /// Absolute price distance from the pivot that counts as "on the pivot".
    pub pivot_proximity: f64,
    pub premium_alert: f64,
    /// Rows used for the momentum slope.
    pub momentum_window: usize,
    /// |SOFR - policy| band treated as normal by commentary.
    pub liquidity_alert: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            headwind_probability: 80.0,
            headwind_spread: -0.15,
            divergence_spread: -0.30,
            tailwind_probability: 50.0,
            tailwind_spread: -0.40,
            high_vix: 25.0,
            high_asset_vol: 25.0,
            crowded_positioning: 250_000.0,
            pivot_proximity: 10.0,
            premium_alert: 5.0,
            momentum_window: 5,
            liquidity_alert: 0.10,
        }
    }
}

/// Everything one evaluation cycle needs besides the fetchers and the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Series whose presence gates row retention.
    pub anchor: Series,
    pub market: Vec<SeriesSpec>,
    #[serde(rename = "macro")]
    pub macro_series: Vec<SeriesSpec>,
    pub window: WindowConfig,
    pub derive: DeriveConfig,
    pub thresholds: Thresholds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        use Cadence::*;
        Self {
            anchor: Series::Gold,
            market: vec![
                SeriesSpec::new(Series::Gold, "GC=F", Daily),
                SeriesSpec::new(Series::Dxy, "DX-Y.NYB", Daily),
                SeriesSpec::new(Series::Nominal10y, "^TNX", Daily),
                SeriesSpec::new(Series::Gld, "GLD", Daily),
                SeriesSpec::new(Series::Vix, "^VIX", Daily),
                SeriesSpec::new(Series::FedFundsFutures, "ZQ=F", Daily),
                SeriesSpec::new(Series::UsdCny, "CNY=X", Daily),
            ],
            macro_series: vec![
                SeriesSpec::new(Series::Real10y, "DFII10", Daily),
                SeriesSpec::new(Series::Breakeven10y, "T10YIE", Daily),
                SeriesSpec::new(Series::Treasury2y, "DGS2", Daily),
                SeriesSpec::new(Series::FedFunds, "FEDFUNDS", Monthly),
                SeriesSpec::new(Series::Sofr, "SOFR", Daily),
                SeriesSpec::new(Series::GoldVol, "GVZCLS", Daily),
            ],
            window: WindowConfig::default(),
            derive: DeriveConfig::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from an optional TOML file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
        let config = Self::from_toml(&raw)?;
        tracing::info!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, AppError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| AppError::new(2, format!("Invalid config TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.derive.ma_window == 0 {
            return Err(AppError::new(2, "derive.ma_window must be > 0."));
        }
        if !(self.derive.troy_ounce_grams.is_finite() && self.derive.troy_ounce_grams > 0.0) {
            return Err(AppError::new(2, "derive.troy_ounce_grams must be positive."));
        }
        if self.thresholds.momentum_window < 2 {
            return Err(AppError::new(2, "thresholds.momentum_window must be >= 2."));
        }
        if self.window.baseline_days < 730 {
            return Err(AppError::new(2, "window.baseline_days must be at least 730 (two years)."));
        }
        if !self.specs().any(|s| s.series == self.anchor) {
            return Err(AppError::new(
                2,
                format!("Anchor series '{}' has no configured symbol.", self.anchor.key()),
            ));
        }
        Ok(())
    }

    /// All configured series, market first.
    pub fn specs(&self) -> impl Iterator<Item = &SeriesSpec> {
        self.market.iter().chain(self.macro_series.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_names_every_core_input() {
        let config = DashboardConfig::default();
        for series in [
            Series::Gold,
            Series::Nominal10y,
            Series::Breakeven10y,
            Series::Treasury2y,
            Series::FedFunds,
            Series::Sofr,
            Series::FedFundsFutures,
            Series::UsdCny,
        ] {
            assert!(config.specs().any(|s| s.series == series), "{series:?} missing");
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let raw = r#"
            [thresholds]
            high_vix = 30.0

            [[macro]]
            series = "spec_positioning"
            symbol = "COT_GOLD_NET"
            cadence = "weekly"
        "#;
        let config = DashboardConfig::from_toml(raw).unwrap();
        assert_eq!(config.thresholds.high_vix, 30.0);
        assert_eq!(config.thresholds.headwind_probability, 80.0);
        assert_eq!(config.derive.ma_window, 200);
        // Market list untouched, macro list replaced.
        assert_eq!(config.market.len(), DashboardConfig::default().market.len());
        assert_eq!(config.macro_series.len(), 1);
        assert_eq!(config.macro_series[0].cadence, Cadence::Weekly);
    }

    #[test]
    fn rejects_short_baseline() {
        let err = DashboardConfig::from_toml("[window]\nbaseline_days = 90\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_unmapped_anchor() {
        let raw = r#"
            market = []
        "#;
        assert!(DashboardConfig::from_toml(raw).is_err());
    }
}
