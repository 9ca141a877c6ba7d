//! Fetch/display window planning.
//!
//! Derived fields such as the 200-observation moving average need much more
//! history than a one-month display shows. The plan therefore separates the
//! span we *fetch* (always wide) from the span we *display* (the lookback),
//! and the table is only cut to the display span after derivation.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::{DashboardConfig, SeriesSpec};
use crate::domain::Lookback;

/// Concrete dates for one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPlan {
    pub lookback: Lookback,
    pub today: NaiveDate,
    /// First date requested from market providers.
    pub fetch_start: NaiveDate,
    pub fetch_end: NaiveDate,
    /// First date kept after derivation.
    pub display_start: NaiveDate,
}

impl WindowPlan {
    /// Start date for a macro series, widened by its release cadence.
    pub fn macro_start(&self, spec: &SeriesSpec) -> NaiveDate {
        self.fetch_start - Duration::days(spec.cadence.buffer_days())
    }
}

/// Calendar days needed to warm up a moving average of `window` trading observations.
pub fn warmup_days(window: usize) -> i64 {
    let trading = window as i64;
    (trading * 7 + 4) / 5 + 10
}

/// Map a lookback choice to fetch and display boundaries.
pub fn plan(lookback: Lookback, today: NaiveDate, config: &DashboardConfig) -> WindowPlan {
    let baseline = config.window.baseline_days.max(730);
    let span = baseline.max(lookback.days() + warmup_days(config.derive.ma_window));

    WindowPlan {
        lookback,
        today,
        fetch_start: today - Duration::days(span),
        fetch_end: today,
        display_start: today - Duration::days(lookback.days()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cadence, Series};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn display_start_is_today_minus_lookback() {
        let config = DashboardConfig::default();
        let p = plan(Lookback::OneMonth, today(), &config);
        assert_eq!(p.display_start, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        assert_eq!(p.fetch_end, today());
    }

    #[test]
    fn fetch_window_is_at_least_two_years_for_every_lookback() {
        let config = DashboardConfig::default();
        for lookback in Lookback::ALL {
            let p = plan(lookback, today(), &config);
            assert!(today() - p.fetch_start >= Duration::days(730), "{lookback:?}");
            assert!(p.fetch_start < p.display_start);
        }
    }

    #[test]
    fn two_year_lookback_gets_moving_average_warmup() {
        let config = DashboardConfig::default();
        let p = plan(Lookback::TwoYears, today(), &config);
        let warmup = p.display_start - p.fetch_start;
        // 200 trading days is roughly 280 calendar days.
        assert!(warmup >= Duration::days(280), "warmup only {warmup}");
    }

    #[test]
    fn quarterly_series_get_extra_buffer_at_fetch_step() {
        let config = DashboardConfig::default();
        let p = plan(Lookback::OneYear, today(), &config);
        let quarterly = SeriesSpec::new(Series::FedFunds, "X", Cadence::Quarterly);
        let daily = SeriesSpec::new(Series::Sofr, "Y", Cadence::Daily);
        assert_eq!(p.fetch_start - p.macro_start(&quarterly), Duration::days(150));
        assert_eq!(p.fetch_start - p.macro_start(&daily), Duration::days(7));
        // The display boundary is untouched by the buffer.
        assert_eq!(p.display_start, today() - Duration::days(365));
    }

    #[test]
    fn warmup_rounds_trading_days_up() {
        assert_eq!(warmup_days(5), 17);
        assert_eq!(warmup_days(200), 290);
    }
}
