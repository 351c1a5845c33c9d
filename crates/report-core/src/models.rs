use serde::{Deserialize, Serialize};

/// Value substituted for a column that is absent from the export.
pub const MISSING: &str = "N/A";

/// Assignee used when the column is absent or empty.
pub const UNKNOWN_ASSIGNEE: &str = "Unknown";

/// What presenters show for empty or missing values.
pub const PLACEHOLDER: &str = "-";

/// Header names used by the tracker export.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const ASSIGNEE: &str = "Assignee";
    pub const TIME_SPENT: &str = "Time spent";
    pub const ORIGINAL_ESTIMATE: &str = "Original estimate";
    pub const WORK_RATIO: &str = "Work Ratio";
    pub const STATUS: &str = "Status";
    pub const ISSUE: &str = "Issue";
    pub const SPRINT: &str = "Sprint";

    /// Columns the report expects; `Work Ratio` is optional.
    pub const EXPECTED: [&str; 7] = [
        TITLE,
        ASSIGNEE,
        TIME_SPENT,
        ORIGINAL_ESTIMATE,
        STATUS,
        ISSUE,
        SPRINT,
    ];
}

/// One input line as an ordered header → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing an earlier value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Value of `column`, or `None` when the row has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Column names in input order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// An original estimate: the summable minutes plus what to display.
///
/// `minutes` is `None` when the export holds a placeholder such as `"N/A"`
/// instead of a duration. Such estimates count as zero in totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub minutes: Option<u64>,
    pub display: String,
}

impl Estimate {
    pub fn known(minutes: u64) -> Self {
        Self {
            minutes: Some(minutes),
            display: crate::duration::format_minutes(minutes),
        }
    }

    pub fn unknown(display: impl Into<String>) -> Self {
        Self {
            minutes: None,
            display: display.into(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.minutes.is_some()
    }

    /// Minutes contributed to estimate totals.
    pub fn summable_minutes(&self) -> u64 {
        self.minutes.unwrap_or(0)
    }
}

/// One normalized issue row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Upper-cased grouping tag, `"Other"` when the title has none.
    pub tag: String,
    pub assignee: String,
    /// Title with the `[TAG]:` prefix removed.
    pub title: String,
    pub time_spent_minutes: u64,
    pub original_estimate: Estimate,
    /// `"<n>.nn%"`, the raw value when it is not a duration, or `"-"`.
    pub work_ratio: String,
    pub status: String,
    pub issue_id: String,
    /// Browse URL, present only when the row carries an issue id.
    pub issue_url: Option<String>,
    pub sprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_get_and_missing() {
        let row: RawRow = [("Title", "[A]: x"), ("Assignee", "Al")]
            .into_iter()
            .collect();
        assert_eq!(row.get("Title"), Some("[A]: x"));
        assert_eq!(row.get("Sprint"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_raw_row_insert_replaces_and_keeps_order() {
        let mut row = RawRow::new();
        row.insert("B", "1");
        row.insert("A", "2");
        row.insert("B", "3");
        assert_eq!(row.get("B"), Some("3"));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_estimate_known_and_unknown() {
        let known = Estimate::known(150);
        assert_eq!(known.display, "2h 30m");
        assert_eq!(known.summable_minutes(), 150);
        assert!(known.is_known());

        let unknown = Estimate::unknown(MISSING);
        assert_eq!(unknown.display, "N/A");
        assert_eq!(unknown.summable_minutes(), 0);
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_record_serializes_issue_url_as_null_when_absent() {
        let record = Record {
            tag: "PVA".into(),
            assignee: "Al".into(),
            title: "Do X".into(),
            time_spent_minutes: 60,
            original_estimate: Estimate::unknown(MISSING),
            work_ratio: PLACEHOLDER.into(),
            status: "Done".into(),
            issue_id: MISSING.into(),
            issue_url: None,
            sprint: MISSING.into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["issue_url"], serde_json::Value::Null);
        assert_eq!(value["original_estimate"]["display"], "N/A");
        assert_eq!(value["time_spent_minutes"], 60);
    }
}
