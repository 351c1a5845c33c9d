//! Core types for the tracker time report.
//!
//! Duration parsing, tag extraction, the normalized [`models::Record`],
//! display formatting helpers, errors and command-line settings shared by the
//! data, UI and runtime crates.

pub mod duration;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod tags;

pub use error::{ReportError, Result};
