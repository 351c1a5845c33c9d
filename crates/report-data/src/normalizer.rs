//! Conversion of raw CSV rows into [`Record`]s.

use report_core::duration::{parse_duration, parse_duration_opt, parse_minutes_seconds};
use report_core::error::Result;
use report_core::formatting::format_percentage;
use report_core::models::{columns, Estimate, RawRow, Record, MISSING, PLACEHOLDER, UNKNOWN_ASSIGNEE};
use report_core::settings::DEFAULT_ISSUE_BASE_URL;
use report_core::tags::split_title;
use tracing::debug;

/// Builds one [`Record`] per row.
///
/// Absent columns get their defaults; only malformed duration tokens fail.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    issue_base_url: String,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUE_BASE_URL)
    }
}

impl RecordNormalizer {
    pub fn new(issue_base_url: impl Into<String>) -> Self {
        Self {
            issue_base_url: issue_base_url.into(),
        }
    }

    /// Normalize `row`; `row_number` is the 1-based data row used in errors.
    pub fn normalize(&self, row_number: usize, row: &RawRow) -> Result<Record> {
        let tagged = split_title(row.get(columns::TITLE).unwrap_or(""));

        let assignee = match row.get(columns::ASSIGNEE).map(str::trim) {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => {
                debug!("Row {}: no assignee, using {:?}", row_number, UNKNOWN_ASSIGNEE);
                UNKNOWN_ASSIGNEE.to_string()
            }
        };

        let time_spent_minutes = parse_duration(row.get(columns::TIME_SPENT).unwrap_or(""))
            .map_err(|e| e.in_row(row_number, columns::TIME_SPENT))?;

        let original_estimate = self
            .estimate(row)
            .map_err(|e| e.in_row(row_number, columns::ORIGINAL_ESTIMATE))?;

        let work_ratio = work_ratio(row.get(columns::WORK_RATIO))
            .map_err(|e| e.in_row(row_number, columns::WORK_RATIO))?;

        let issue_id = text_or_missing(row, columns::ISSUE);
        let issue_url = match row.get(columns::ISSUE).map(str::trim) {
            Some(id) if !id.is_empty() => Some(format!("{}{}", self.issue_base_url, id)),
            _ => None,
        };

        Ok(Record {
            tag: tagged.tag,
            assignee,
            title: tagged.title,
            time_spent_minutes,
            original_estimate,
            work_ratio,
            status: text_or_missing(row, columns::STATUS),
            issue_id,
            issue_url,
            sprint: text_or_missing(row, columns::SPRINT),
        })
    }

    /// Normalize every row in order, stopping at the first malformed one.
    pub fn normalize_all(&self, rows: &[RawRow]) -> Result<Vec<Record>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.normalize(i + 1, row))
            .collect()
    }

    fn estimate(&self, row: &RawRow) -> Result<Estimate> {
        let Some(raw) = row.get(columns::ORIGINAL_ESTIMATE) else {
            return Ok(Estimate::unknown(MISSING));
        };
        Ok(match parse_duration_opt(raw)? {
            Some(minutes) => Estimate::known(minutes),
            None => Estimate::unknown(raw.trim()),
        })
    }
}

/// `"<m>m <s>s"` → `"<m*60+s>.00%"`; empty or absent → `"-"`.
fn work_ratio(raw: Option<&str>) -> Result<String> {
    let value = raw.map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Ok(PLACEHOLDER.to_string());
    }
    Ok(match parse_minutes_seconds(value)? {
        Some(seconds) => format_percentage(seconds),
        None => value.to_string(),
    })
}

fn text_or_missing(row: &RawRow, column: &str) -> String {
    row.get(column)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
