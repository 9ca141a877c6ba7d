//! FRED API integration for macro release series.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::provider::{FetchError, MacroSource};
use crate::domain::{RawSeries, Series};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 10000;
const API_KEY_VAR: &str = "FRED_API_KEY";

pub struct FredClient {
    client: Client,
    api_key: Option<String>,
}

impl FredClient {
    /// Build a client from `FRED_API_KEY` (a `.env` file is honoured).
    ///
    /// A missing key is not an error here: every fetch then fails with
    /// `FetchError::MissingApiKey`, which the pipeline treats as absent data.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("{API_KEY_VAR} not set; macro series will be unavailable");
        }
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn fetch_series(&self, symbol: &str, start: NaiveDate) -> Result<Vec<(NaiveDate, Option<f64>)>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey(API_KEY_VAR))?;

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", symbol),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", &start.to_string()),
                ("limit", &OBS_LIMIT.to_string()),
            ])
            .send()
            .map_err(|e| FetchError::Network(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| FetchError::Parse(format!("Failed to parse FRED response: {e}")))?;

        parse_observations(body)
    }
}

impl MacroSource for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series: Series, symbol: &str, start: NaiveDate) -> Result<RawSeries, FetchError> {
        let points = self.fetch_series(symbol, start)?;
        Ok(RawSeries::new(series, points))
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(body: ObservationsResponse) -> Result<Vec<(NaiveDate, Option<f64>)>, FetchError> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| FetchError::Parse(format!("Invalid FRED date '{}': {e}", obs.date)))?;
        // "." marks a missing observation (e.g. a market holiday).
        out.push((date, parse_value(&obs.value)));
    }
    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
