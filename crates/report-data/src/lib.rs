//! Data ingestion layer for the tracker time report.
//!
//! Reads CSV exports, normalizes rows into records, aggregates time per tag
//! and assignee and wraps the result in an immutable [`ingest::ReportSnapshot`].

pub mod aggregator;
pub mod ingest;
pub mod normalizer;
pub mod reader;

pub use report_core as core;
