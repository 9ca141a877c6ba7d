//! Data providers.
//!
//! - `yahoo`: daily market quotes and bars
//! - `fred`: macro release series
//! - `sample`: seeded synthetic data for offline runs

pub mod fred;
pub mod provider;
pub mod sample;
pub mod yahoo;

pub use fred::FredClient;
pub use provider::{FetchError, MacroSource, MarketSource};
pub use sample::SyntheticSource;
pub use yahoo::YahooClient;
