//! The ingest pipeline: CSV file → records → aggregate snapshot.
//!
//! Ingest either completes fully or fails; a malformed row abandons the whole
//! pass so no partial totals ever reach a presenter.

use std::io::Read;
use std::path::Path;

use chrono::Utc;
use report_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::{ReportAggregate, TimeAggregator};
use crate::normalizer::RecordNormalizer;
use crate::reader::{read_csv, read_csv_file, CsvTable};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestMetadata {
    /// Where the rows came from (file path or a caller-chosen label).
    pub source: String,
    /// ISO-8601 timestamp when the snapshot was built.
    pub generated_at: String,
    /// Number of data rows read from the CSV.
    pub rows_read: usize,
    /// Expected columns absent from the header.
    pub missing_columns: Vec<String>,
    /// Wall-clock seconds spent reading and aggregating.
    pub load_time_seconds: f64,
}

/// Immutable result of one ingest pass, shared read-only by all presenters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub metadata: IngestMetadata,
    #[serde(flatten)]
    pub aggregate: ReportAggregate,
}

impl ReportSnapshot {
    /// `true` when the file parsed but produced no records.
    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Read, normalize and aggregate the CSV at `path`.
pub fn ingest_file(path: &Path, normalizer: &RecordNormalizer) -> Result<ReportSnapshot> {
    let start = std::time::Instant::now();
    let table = read_csv_file(path)?;
    build_snapshot(table, &path.display().to_string(), normalizer, start)
}

/// Same as [`ingest_file`] for an in-memory or streamed source.
pub fn ingest_reader<R: Read>(
    source: R,
    label: &str,
    normalizer: &RecordNormalizer,
) -> Result<ReportSnapshot> {
    let start = std::time::Instant::now();
    let table = read_csv(source)?;
    build_snapshot(table, label, normalizer, start)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn build_snapshot(
    table: CsvTable,
    source: &str,
    normalizer: &RecordNormalizer,
    start: std::time::Instant,
) -> Result<ReportSnapshot> {
    let missing_columns: Vec<String> = table
        .missing_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    if !missing_columns.is_empty() {
        warn!(
            "{} is missing columns {:?}; defaults will be used",
            source, missing_columns
        );
    }

    let records = normalizer.normalize_all(&table.rows)?;
    let aggregate = TimeAggregator::aggregate(records)?;

    info!(
        "Ingested {} rows into {} tags from {}",
        table.rows.len(),
        aggregate.tag_items.len(),
        source
    );

    Ok(ReportSnapshot {
        metadata: IngestMetadata {
            source: source.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            rows_read: table.rows.len(),
            missing_columns,
            load_time_seconds: start.elapsed().as_secs_f64(),
        },
        aggregate,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
