//! Output helpers.
//!
//! - aligned table export (CSV)
//! - regime signal export (JSON)

pub mod export;

pub use export::*;
