//! `gold-dash` library crate.
//!
//! The binary (`gd`) is a thin wrapper around this library so that:
//!
//! - the alignment/derivation/classification core is testable without
//!   spawning processes or touching the network
//! - providers are swappable behind the `data` traits
//! - presentation (report, plot, tui) only consumes pipeline output

pub mod align;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod derive;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod signal;
pub mod tui;
pub mod window;
