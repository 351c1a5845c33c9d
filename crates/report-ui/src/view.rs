//! Presentation model shared by the console and HTML renderers.
//!
//! All sorting, placeholder substitution and duration formatting happens
//! here, once, so the two outputs can only differ in markup.

use report_core::duration::format_minutes;
use report_core::error::Result;
use report_core::formatting::{display_width, format_time_spent, or_placeholder};
use report_core::models::{Record, PLACEHOLDER};
use report_data::aggregator::{ReportAggregate, TimeAggregator};

/// One task line, every field ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub assignee: String,
    pub title: String,
    /// `"  1h 30m"` or `"-"` when nothing was logged.
    pub time_spent: String,
    pub original_estimate: String,
    pub work_ratio: String,
    pub status: String,
    pub issue_id: String,
    pub issue_url: Option<String>,
    pub sprint: String,
}

impl DetailRow {
    fn from_record(record: &Record) -> Self {
        Self {
            assignee: record.assignee.clone(),
            title: record.title.clone(),
            time_spent: format_time_spent(record.time_spent_minutes),
            original_estimate: match record.original_estimate.minutes {
                Some(0) => PLACEHOLDER.to_string(),
                _ => or_placeholder(&record.original_estimate.display).to_string(),
            },
            work_ratio: or_placeholder(&record.work_ratio).to_string(),
            status: or_placeholder(&record.status).to_string(),
            issue_id: or_placeholder(&record.issue_id).to_string(),
            issue_url: record.issue_url.clone(),
            sprint: or_placeholder(&record.sprint).to_string(),
        }
    }

    /// The issue as shown in plain text: the URL when known, else the id.
    pub fn issue_text(&self) -> &str {
        self.issue_url.as_deref().unwrap_or(&self.issue_id)
    }
}

/// Per-assignee total inside a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeTotal {
    pub assignee: String,
    pub time_spent: String,
    pub original_estimate: String,
}

/// Everything shown for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSection {
    pub tag: String,
    /// Widest title in the section plus two columns of padding.
    pub title_width: usize,
    /// Sorted by upper-cased assignee, then upper-cased title.
    pub rows: Vec<DetailRow>,
    pub totals: Vec<AssigneeTotal>,
}

/// `"<assignee>"` and `"<H>h <M>m"` summed over all tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrandTotal {
    pub assignee: String,
    pub total: String,
}

/// The complete report as presenters see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub grand_totals: Vec<GrandTotal>,
    pub sections: Vec<TagSection>,
}

impl ReportView {
    pub fn build(aggregate: &ReportAggregate) -> Result<Self> {
        let time_totals = aggregate.formatted_time_totals();
        let estimate_totals = aggregate.formatted_estimate_totals();

        let grand_totals = TimeAggregator::grand_totals(&time_totals)?
            .into_iter()
            .map(|(assignee, minutes)| GrandTotal {
                assignee,
                total: format_minutes(minutes),
            })
            .collect();

        let sections = aggregate
            .tag_items
            .iter()
            .map(|(tag, records)| {
                let mut rows: Vec<DetailRow> = records.iter().map(DetailRow::from_record).collect();
                rows.sort_by_cached_key(sort_key);

                let title_width = rows
                    .iter()
                    .map(|r| display_width(&r.title))
                    .max()
                    .unwrap_or(0)
                    + 2;

                let totals = time_totals
                    .get(tag)
                    .into_iter()
                    .flatten()
                    .map(|(assignee, time_spent)| AssigneeTotal {
                        assignee: assignee.clone(),
                        time_spent: time_spent.clone(),
                        original_estimate: estimate_totals
                            .get(tag)
                            .and_then(|e| e.get(assignee))
                            .cloned()
                            .unwrap_or_else(|| format_minutes(0)),
                    })
                    .collect();

                TagSection {
                    tag: tag.clone(),
                    title_width,
                    rows,
                    totals,
                }
            })
            .collect();

        Ok(Self {
            grand_totals,
            sections,
        })
    }
}

fn sort_key(row: &DetailRow) -> (String, String) {
    (row.assignee.to_uppercase(), row.title.to_uppercase())
}
