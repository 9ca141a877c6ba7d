//! Yahoo Finance market quotes.
//!
//! Fetches daily bars from Yahoo's v8 chart API and reduces them to one closing
//! value per date. Yahoo has no official API and is subject to unannounced
//! format changes; every failure surfaces as a `FetchError` for that symbol.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::provider::{FetchError, MarketSource};
use crate::domain::{OhlcBar, RawSeries, Series};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// One parsed row of the chart response.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChartRow {
    date: NaiveDate,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
}

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = (end + chrono::Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!("{BASE_URL}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d")
    }

    fn fetch_rows(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<ChartRow>, FetchError> {
        let url = Self::chart_url(symbol, start, end);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| FetchError::Parse(format!("failed to parse response for {symbol}: {e}")))?;

        parse_chart(symbol, chart)
    }
}

impl MarketSource for YahooClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<RawSeries, FetchError> {
        let rows = self.fetch_rows(symbol, start, end)?;
        let points = rows.into_iter().map(|r| (r.date, r.close)).collect();
        Ok(RawSeries::new(series, points))
    }

    fn fetch_ohlc(
        &self,
        _series: Series,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcBar>, FetchError> {
        let rows = self.fetch_rows(symbol, start, end)?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                Some(OhlcBar {
                    date: r.date,
                    high: r.high?,
                    low: r.low?,
                    close: r.close?,
                })
            })
            .collect())
    }
}

fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<ChartRow>, FetchError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) => FetchError::Provider {
            symbol: symbol.to_string(),
            message: format!("{}: {}", err.code, err.description),
        },
        None => FetchError::Parse("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("result array is empty".into()))?;

    // A symbol with no trading in range has no timestamps at all.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("no quote data".into()))?;

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| FetchError::Parse(format!("invalid timestamp: {ts}")))?;

        rows.push(ChartRow {
            date,
            high: quote.high.get(i).copied().flatten(),
            low: quote.low.get(i).copied().flatten(),
            close: quote.close.get(i).copied().flatten(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"chart":{"result":[{
        "meta":{"symbol":"GC=F"},
        "timestamp":[1735837200,1735923600,1736182800],
        "indicators":{"quote":[{
            "open":[2640.0,2660.0,null],
            "high":[2665.5,2671.0,null],
            "low":[2633.1,2650.2,null],
            "close":[2658.9,2645.0,null],
            "volume":[100,200,null]
        }]}
    }],"error":null}}"#;

    #[test]
    fn parses_closes_and_bars() {
        let chart: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let rows = parse_chart("GC=F", chart).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(rows[0].close, Some(2658.9));
        assert_eq!(rows[1].high, Some(2671.0));
        // Null close is kept as a missing observation for the aligner.
        assert_eq!(rows[2].close, None);
    }

    #[test]
    fn provider_error_is_reported() {
        let chart: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        )
        .unwrap();
        let err = parse_chart("NOPE", chart).unwrap_err();
        assert!(matches!(err, FetchError::Provider { .. }));
    }

    #[test]
    fn chart_url_covers_end_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let url = YahooClient::chart_url("GC=F", start, end);
        assert!(url.contains("period1=1735689600"));
        assert!(url.contains("period2=1735862400"));
    }
}
