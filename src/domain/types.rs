//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the aligner, the derivation engine and the classifier
//! - exported to JSON/CSV
//! - read from a TOML configuration file

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Logical name of a raw input series.
///
/// The symbol each series is fetched under lives in configuration; this enum is
/// the stable column key of the aligned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Gold,
    Dxy,
    Nominal10y,
    Gld,
    Vix,
    FedFundsFutures,
    UsdCny,
    DomesticQuote,
    Real10y,
    Breakeven10y,
    Treasury2y,
    FedFunds,
    Sofr,
    GoldVol,
    SpecPositioning,
}

impl Series {
    pub const ALL: [Series; 15] = [
        Series::Gold,
        Series::Dxy,
        Series::Nominal10y,
        Series::Gld,
        Series::Vix,
        Series::FedFundsFutures,
        Series::UsdCny,
        Series::DomesticQuote,
        Series::Real10y,
        Series::Breakeven10y,
        Series::Treasury2y,
        Series::FedFunds,
        Series::Sofr,
        Series::GoldVol,
        Series::SpecPositioning,
    ];

    /// Column name used in exports and log fields.
    pub fn key(self) -> &'static str {
        match self {
            Series::Gold => "gold",
            Series::Dxy => "dxy",
            Series::Nominal10y => "nominal_10y",
            Series::Gld => "gld",
            Series::Vix => "vix",
            Series::FedFundsFutures => "fed_funds_futures",
            Series::UsdCny => "usd_cny",
            Series::DomesticQuote => "domestic_quote",
            Series::Real10y => "real_10y",
            Series::Breakeven10y => "breakeven_10y",
            Series::Treasury2y => "treasury_2y",
            Series::FedFunds => "fed_funds",
            Series::Sofr => "sofr",
            Series::GoldVol => "gold_vol",
            Series::SpecPositioning => "spec_positioning",
        }
    }
}

/// Derived columns computed by the derivation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RealYield,
    RateExpectationSpread,
    LiquiditySpread,
    MovingAverage,
    FairValueLocal,
    DomesticPremium,
    EasingProbability,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::RealYield,
        Field::RateExpectationSpread,
        Field::LiquiditySpread,
        Field::MovingAverage,
        Field::FairValueLocal,
        Field::DomesticPremium,
        Field::EasingProbability,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::RealYield => "real_yield",
            Field::RateExpectationSpread => "rate_expectation_spread",
            Field::LiquiditySpread => "liquidity_spread",
            Field::MovingAverage => "moving_average",
            Field::FairValueLocal => "fair_value_local",
            Field::DomesticPremium => "domestic_premium",
            Field::EasingProbability => "easing_probability",
        }
    }
}

/// Release cadence of a macro series.
///
/// Slower cadences need a wider fetch buffer so that at least one observation
/// precedes the window start and can be forward-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Cadence {
    /// Extra calendar days fetched before the nominal window start.
    pub fn buffer_days(self) -> i64 {
        match self {
            Cadence::Daily => 7,
            Cadence::Weekly => 14,
            Cadence::Monthly => 45,
            Cadence::Quarterly => 150,
        }
    }
}

/// User-selected display lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Lookback {
    #[serde(rename = "1m")]
    #[value(name = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    #[value(name = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    #[value(name = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    #[value(name = "2y")]
    TwoYears,
}

impl Lookback {
    pub const ALL: [Lookback; 4] = [
        Lookback::OneMonth,
        Lookback::ThreeMonths,
        Lookback::OneYear,
        Lookback::TwoYears,
    ];

    /// Calendar days covered by the display window.
    pub fn days(self) -> i64 {
        match self {
            Lookback::OneMonth => 30,
            Lookback::ThreeMonths => 90,
            Lookback::OneYear => 365,
            Lookback::TwoYears => 730,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lookback::OneMonth => "1m",
            Lookback::ThreeMonths => "3m",
            Lookback::OneYear => "1y",
            Lookback::TwoYears => "2y",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Lookback::OneMonth => Lookback::ThreeMonths,
            Lookback::ThreeMonths => Lookback::OneYear,
            Lookback::OneYear => Lookback::TwoYears,
            Lookback::TwoYears => Lookback::OneMonth,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Lookback::OneMonth => Lookback::TwoYears,
            Lookback::ThreeMonths => Lookback::OneMonth,
            Lookback::OneYear => Lookback::ThreeMonths,
            Lookback::TwoYears => Lookback::OneYear,
        }
    }
}

/// A named, time-indexed sequence of nullable observations as returned by a fetcher.
///
/// Points are kept in arrival order; duplicates are resolved by the aligner
/// (last arrival wins).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub name: Series,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl RawSeries {
    pub fn new(name: Series, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        Self { name, points }
    }

    /// The "empty result" a fetcher reports when it has nothing to return.
    pub fn empty(name: Series) -> Self {
        Self::new(name, Vec::new())
    }

    /// True when no point carries a usable value.
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|(_, v)| v.is_none())
    }
}

/// One daily bar of the anchor instrument, used for pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Where the pivot inputs came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotBasis {
    /// True prior-session high/low/close.
    Ohlc,
    /// Only a close was available; high and low collapse onto it.
    CloseOnly,
}

/// Classic floor-trader pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    /// Session the levels were derived from.
    pub session: NaiveDate,
    pub basis: PivotBasis,
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,
    pub r2: f64,
    pub s2: f64,
}

/// Primary regime, evaluated as an ordered decision list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    MacroHeadwind,
    DivergenceAlert,
    StrongTailwind,
    Neutral,
}

/// Display override layered on top of the regime.
///
/// A caution replaces the headline label; it never changes `Regime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Caution {
    RiskOffResonance,
    OverheatedLongCaution,
}

/// Independent, non-exclusive alert flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    /// Price rising while tracked holdings fall.
    FlowDivergence,
    /// Speculative positioning above the crowding threshold.
    CrowdedLong,
    /// Price sitting on the pivot.
    LiquidityVacuum,
    /// Domestic premium above the arbitrage threshold.
    Arbitrage,
}

/// Numeric values read off the latest row(s), kept for commentary and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub price: f64,
    pub price_change_pct: Option<f64>,
    pub real_yield: f64,
    /// `None` when the 2y yield or the policy rate is missing on the last row.
    pub rate_expectation_spread: Option<f64>,
    pub liquidity_spread: f64,
    /// `None` when the policy rate or the futures quote is missing on the last row.
    pub easing_probability: Option<f64>,
    pub moving_average: Option<f64>,
    pub pivot: Option<f64>,
    pub domestic_premium: f64,
    pub vix: Option<f64>,
    pub asset_volatility: Option<f64>,
    pub price_momentum: Option<f64>,
    pub holdings_momentum: Option<f64>,
    pub spec_positioning: Option<f64>,
    pub dxy: Option<f64>,
    pub dxy_change_pct: Option<f64>,
}

/// Classifier output for one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSignal {
    pub as_of: NaiveDate,
    pub regime: Regime,
    pub caution: Option<Caution>,
    pub alerts: Vec<Alert>,
    pub metrics: SignalMetrics,
}
