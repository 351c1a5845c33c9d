//! Runtime layer for the tracker time report.
//!
//! Serves a finished report snapshot over HTTP; the ingest pass always
//! completes before the first request is accepted.

pub mod server;

pub use report_core as core;
pub use report_data as data;
