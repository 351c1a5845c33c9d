//! Presentation layer for the tracker time report.
//!
//! Builds a sorted, placeholder-filled [`view::ReportView`] from an aggregate
//! and renders it as console text or a standalone HTML page, plus a JSON
//! export of the raw snapshot.

pub mod console;
pub mod html;
pub mod json;
pub mod view;

pub use report_core as core;
