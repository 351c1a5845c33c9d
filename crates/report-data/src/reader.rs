//! CSV loading for tracker exports.
//!
//! Reads the header row and turns every data line into a [`RawRow`]. Short
//! rows are accepted; their missing trailing cells are simply absent from the
//! row and fall back to defaults during normalization.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use report_core::error::{ReportError, Result};
use report_core::models::{columns, RawRow};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Rows read from one export, with the header as found in the file.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl CsvTable {
    /// Expected columns that the header does not contain.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        columns::EXPECTED
            .iter()
            .copied()
            .filter(|c| !self.headers.iter().any(|h| h == c))
            .collect()
    }
}

/// Open `path` and read all rows.
pub fn read_csv_file(path: &Path) -> Result<CsvTable> {
    let file = File::open(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_csv(file)?;
    debug!("Read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Read all rows from any UTF-8 CSV source with a header line.
pub fn read_csv<R: Read>(source: R) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > headers.len() {
            warn!(
                "Line {} has {} fields but the header has {}; extra fields ignored",
                record.position().map_or(0, |p| p.line()),
                record.len(),
                headers.len()
            );
        }
        let row: RawRow = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
