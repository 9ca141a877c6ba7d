//! Domestic premium over international fair value.
//!
//! `fair_value_local = price / grams_per_troy_ounce * fx_rate`
//!
//! Without a live domestic quote the "domestic quote" is modelled as fair value
//! plus a fixed offset, so the premium collapses to that offset. This is a known
//! approximation, not a market feed. When a `DomesticQuote` series is present
//! on a row, the real quote is used instead.

use crate::align::AlignedTable;
use crate::config::DeriveConfig;
use crate::domain::Series;

/// Fair value in local currency per gram. `0.0` when the FX rate is missing
/// or the conversion is degenerate.
pub fn fair_value_local(price: f64, fx_rate: Option<f64>, grams_per_ounce: f64) -> f64 {
    let Some(fx) = fx_rate else {
        return 0.0;
    };
    if grams_per_ounce <= 0.0 {
        return 0.0;
    }
    let value = price / grams_per_ounce * fx;
    if value.is_finite() { value } else { 0.0 }
}

/// Premium of the domestic quote over fair value. `0.0` when fair value is unavailable.
pub fn domestic_premium(fair_value: f64, domestic_quote: Option<f64>, offset: f64) -> f64 {
    if fair_value == 0.0 {
        return 0.0;
    }
    let quote = domestic_quote.unwrap_or(fair_value + offset);
    quote - fair_value
}

/// Fair value and premium columns for the whole table.
pub fn premium_columns(table: &AlignedTable, config: &DeriveConfig) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let prices = table.anchor_values();
    let mut fair = Vec::with_capacity(prices.len());
    let mut premium = Vec::with_capacity(prices.len());

    for (row, &price) in prices.iter().enumerate() {
        let fv = fair_value_local(price, table.value(Series::UsdCny, row), config.troy_ounce_grams);
        let quote = table.value(Series::DomesticQuote, row);
        fair.push(Some(fv));
        premium.push(Some(domestic_premium(fv, quote, config.domestic_quote_offset)));
    }

    (fair, premium)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TROY_OUNCE_GRAMS;

    #[test]
    fn converts_ounce_price_to_local_gram_price() {
        let fv = fair_value_local(3110.34768, Some(7.2), TROY_OUNCE_GRAMS);
        assert!((fv - 720.0).abs() < 1e-9);
    }

    #[test]
    fn approximation_premium_is_the_offset() {
        let fv = fair_value_local(2400.0, Some(7.1), TROY_OUNCE_GRAMS);
        assert!((domestic_premium(fv, None, 2.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn live_quote_replaces_approximation() {
        assert!((domestic_premium(700.0, Some(712.5), 2.0) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn missing_fx_degrades_to_zero() {
        assert_eq!(fair_value_local(2400.0, None, TROY_OUNCE_GRAMS), 0.0);
        assert_eq!(domestic_premium(0.0, None, 2.0), 0.0);
        assert_eq!(fair_value_local(2400.0, Some(7.0), 0.0), 0.0);
    }
}
