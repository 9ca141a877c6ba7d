//! Seeded synthetic provider for offline runs and tests.
//!
//! Each series is a mean-reverting random walk around a plausible level,
//! generated day by day from a fixed origin so that the value on a given date
//! does not depend on the requested window. Only dates matching the series
//! cadence are emitted (weekdays for daily data, Fridays for weekly, the 1st of
//! the month or quarter for slower releases).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::provider::{FetchError, MacroSource, MarketSource};
use crate::domain::{Cadence, OhlcBar, RawSeries, Series};

/// Calendar days of history generated before `as_of`.
const HISTORY_DAYS: i64 = 1500;
/// Pull towards the long-run level per day.
const MEAN_REVERSION: f64 = 0.02;
/// Intraday range as a multiple of daily sigma.
const RANGE_SCALE: f64 = 0.6;

/// How a series evolves.
#[derive(Debug, Clone, Copy)]
struct Profile {
    level: f64,
    sigma: f64,
    /// Walk in log space (prices) or levels (rates).
    log: bool,
    cadence: Cadence,
}

fn profile(series: Series) -> Option<Profile> {
    use Cadence::*;
    let p = |level, sigma, log, cadence| Some(Profile { level, sigma, log, cadence });
    match series {
        Series::Gold => p(2350.0, 0.009, true, Daily),
        Series::Dxy => p(104.0, 0.004, true, Daily),
        Series::Nominal10y => p(4.2, 0.04, false, Daily),
        Series::Gld => p(217.0, 0.009, true, Daily),
        Series::Vix => p(16.0, 0.06, true, Daily),
        Series::FedFundsFutures => p(95.7, 0.01, false, Daily),
        Series::UsdCny => p(7.2, 0.002, true, Daily),
        Series::Real10y => p(1.9, 0.04, false, Daily),
        Series::Breakeven10y => p(2.3, 0.02, false, Daily),
        Series::Treasury2y => p(4.0, 0.04, false, Daily),
        Series::FedFunds => p(4.33, 0.01, false, Monthly),
        Series::Sofr => p(4.31, 0.01, false, Daily),
        Series::GoldVol => p(17.0, 0.04, true, Daily),
        Series::SpecPositioning => p(220_000.0, 0.03, true, Weekly),
        // No stand-in for a live domestic quote: the premium approximation applies.
        Series::DomesticQuote => None,
    }
}

fn emits_on(cadence: Cadence, date: NaiveDate) -> bool {
    let weekday = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    match cadence {
        Cadence::Daily => weekday,
        Cadence::Weekly => date.weekday() == Weekday::Fri,
        Cadence::Monthly => date.day() == 1,
        Cadence::Quarterly => date.day() == 1 && matches!(date.month(), 1 | 4 | 7 | 10),
    }
}

/// Deterministic offline provider implementing both fetcher traits.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    as_of: NaiveDate,
}

impl SyntheticSource {
    pub fn new(seed: u64, as_of: NaiveDate) -> Self {
        Self { seed, as_of }
    }

    fn series_seed(&self, symbol: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        symbol.hash(&mut hasher);
        hasher.finish()
    }

    /// Generate `(date, close, range)` for every emitted date up to `as_of`.
    fn generate(&self, series: Series, symbol: &str) -> Result<Vec<(NaiveDate, f64, f64)>, FetchError> {
        let Some(profile) = profile(series) else {
            return Ok(Vec::new());
        };
        let mut rng = StdRng::seed_from_u64(self.series_seed(symbol));
        let normal = Normal::new(0.0, 1.0).map_err(|e| FetchError::Provider {
            symbol: symbol.to_string(),
            message: format!("noise distribution error: {e}"),
        })?;

        let target = if profile.log { profile.level.ln() } else { profile.level };
        let mut state = target;
        let mut out = Vec::new();

        let origin = self.as_of - Duration::days(HISTORY_DAYS);
        let mut date = origin;
        while date <= self.as_of {
            let z: f64 = normal.sample(&mut rng);
            let range_draw: f64 = normal.sample(&mut rng);
            state += MEAN_REVERSION * (target - state) + profile.sigma * z;

            if emits_on(profile.cadence, date) {
                let value = if profile.log { state.exp() } else { state };
                let range = value.abs() * profile.sigma * RANGE_SCALE * range_draw.abs();
                out.push((date, value, range));
            }
            date += Duration::days(1);
        }

        Ok(out)
    }
}

impl MarketSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<RawSeries, FetchError> {
        let points = self
            .generate(series, symbol)?
            .into_iter()
            .filter(|(d, _, _)| *d >= start && *d <= end)
            .map(|(d, v, _)| (d, Some(v)))
            .collect();
        Ok(RawSeries::new(series, points))
    }

    fn fetch_ohlc(
        &self,
        series: Series,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcBar>, FetchError> {
        Ok(self
            .generate(series, symbol)?
            .into_iter()
            .filter(|(d, _, _)| *d >= start && *d <= end)
            .map(|(date, close, range)| OhlcBar {
                date,
                high: close + range,
                low: close - range,
                close,
            })
            .collect())
    }
}

impl MacroSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate) -> Result<RawSeries, FetchError> {
        MarketSource::fetch(self, series, symbol, start, self.as_of)
    }
}
