//! Time aggregation per tag and assignee.

use std::collections::BTreeMap;

use report_core::duration::{format_minutes, parse_hm};
use report_core::error::{ReportError, Result};
use report_core::models::{columns, Record};
use serde::{Deserialize, Serialize};

/// `assignee -> minutes`.
pub type AssigneeTotals = BTreeMap<String, u64>;

/// `tag -> assignee -> minutes`.
pub type TagTotals = BTreeMap<String, AssigneeTotals>;

/// `tag -> assignee -> "<H>h <M>m"`.
pub type FormattedTotals = BTreeMap<String, BTreeMap<String, String>>;

// ── ReportAggregate ───────────────────────────────────────────────────────────

/// Totals and per-tag record lists built from one ingest.
///
/// All three maps share the same tag keys. Records inside a tag keep their
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAggregate {
    pub time_totals: TagTotals,
    pub estimate_totals: TagTotals,
    pub tag_items: BTreeMap<String, Vec<Record>>,
}

impl ReportAggregate {
    /// Accumulate the record read from data row `row`. Fails when a running
    /// total would overflow.
    fn add_record(&mut self, row: usize, record: Record) -> Result<()> {
        accumulate(
            &mut self.time_totals,
            &record.tag,
            &record.assignee,
            record.time_spent_minutes,
        )
        .map_err(|e| e.in_row(row, columns::TIME_SPENT))?;
        accumulate(
            &mut self.estimate_totals,
            &record.tag,
            &record.assignee,
            record.original_estimate.summable_minutes(),
        )
        .map_err(|e| e.in_row(row, columns::ORIGINAL_ESTIMATE))?;

        self.tag_items
            .entry(record.tag.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tag_items.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.tag_items.values().map(Vec::len).sum()
    }

    /// Time spent per tag and assignee as display strings.
    pub fn formatted_time_totals(&self) -> FormattedTotals {
        TimeAggregator::format_totals(&self.time_totals)
    }

    /// Original estimates per tag and assignee as display strings.
    pub fn formatted_estimate_totals(&self) -> FormattedTotals {
        TimeAggregator::format_totals(&self.estimate_totals)
    }
}

// ── TimeAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that folds records into a [`ReportAggregate`].
pub struct TimeAggregator;

impl TimeAggregator {
    /// Fold `records` in order.
    ///
    /// `records` are numbered from 1 in errors, matching the data rows they
    /// were normalized from.
    pub fn aggregate(records: impl IntoIterator<Item = Record>) -> Result<ReportAggregate> {
        let mut aggregate = ReportAggregate::default();
        for (index, record) in records.into_iter().enumerate() {
            aggregate.add_record(index + 1, record)?;
        }
        Ok(aggregate)
    }

    /// Render every leaf as `"<H>h <M>m"`.
    pub fn format_totals(totals: &TagTotals) -> FormattedTotals {
        totals
            .iter()
            .map(|(tag, assignees)| {
                let formatted = assignees
                    .iter()
                    .map(|(assignee, minutes)| (assignee.clone(), format_minutes(*minutes)))
                    .collect();
                (tag.clone(), formatted)
            })
            .collect()
    }

    /// Sum display totals across tags per assignee.
    ///
    /// Values are read back with [`parse_hm`]; the empty-string assignee is
    /// skipped.
    pub fn grand_totals(formatted: &FormattedTotals) -> Result<AssigneeTotals> {
        let mut totals = AssigneeTotals::new();
        for assignees in formatted.values() {
            for (assignee, display) in assignees {
                if assignee.is_empty() {
                    continue;
                }
                let minutes = parse_hm(display)?;
                let slot = totals.entry(assignee.clone()).or_insert(0);
                *slot = slot.checked_add(minutes).ok_or_else(|| {
                    ReportError::invalid_duration(display, format!("total for {assignee} is too large"))
                })?;
            }
        }
        Ok(totals)
    }
}

/// Add `minutes` to `totals[tag][assignee]` without wrapping.
fn accumulate(totals: &mut TagTotals, tag: &str, assignee: &str, minutes: u64) -> Result<()> {
    let slot = totals
        .entry(tag.to_string())
        .or_default()
        .entry(assignee.to_string())
        .or_insert(0);
    *slot = slot.checked_add(minutes).ok_or_else(|| {
        ReportError::invalid_duration(
            &format_minutes(minutes),
            format!("total for {assignee} in {tag} is too large"),
        )
    })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::models::{Estimate, MISSING, PLACEHOLDER};

    fn make_record(tag: &str, assignee: &str, title: &str, spent: u64, estimate: Option<u64>) -> Record {
        Record {
            tag: tag.to_string(),
            assignee: assignee.to_string(),
            title: title.to_string(),
            time_spent_minutes: spent,
            original_estimate: estimate.map_or_else(|| Estimate::unknown(MISSING), Estimate::known),
            work_ratio: PLACEHOLDER.to_string(),
            status: "Done".to_string(),
            issue_id: MISSING.to_string(),
            issue_url: None,
            sprint: MISSING.to_string(),
        }
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_same_tag_and_assignee_are_summed() {
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("PVA", "Al", "a", 90, None),
            make_record("PVA", "Al", "b", 30, None),
        ])
        .unwrap();
        assert_eq!(aggregate.time_totals["PVA"]["Al"], 120);
        assert_eq!(aggregate.formatted_time_totals()["PVA"]["Al"], "2h 0m");
    }

    #[test]
    fn test_estimates_sum_known_values_only() {
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("PVA", "Al", "a", 0, Some(60)),
            make_record("PVA", "Al", "b", 0, None),
            make_record("PVA", "Al", "c", 0, Some(45)),
        ])
        .unwrap();
        assert_eq!(aggregate.estimate_totals["PVA"]["Al"], 105);
        assert_eq!(aggregate.formatted_estimate_totals()["PVA"]["Al"], "1h 45m");
    }

    #[test]
    fn test_tag_items_keep_input_order() {
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("PVA", "Zed", "second", 1, None),
            make_record("OPS", "Al", "other", 1, None),
            make_record("PVA", "Al", "first", 1, None),
        ])
        .unwrap();
        let titles: Vec<&str> = aggregate.tag_items["PVA"]
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(aggregate.record_count(), 3);
    }

    #[test]
    fn test_maps_share_tag_keys() {
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("PVA", "Al", "a", 0, None),
            make_record("Other", "Bo", "b", 10, Some(5)),
        ])
        .unwrap();
        let items: Vec<&String> = aggregate.tag_items.keys().collect();
        let time: Vec<&String> = aggregate.time_totals.keys().collect();
        let estimate: Vec<&String> = aggregate.estimate_totals.keys().collect();
        assert_eq!(items, time);
        assert_eq!(items, estimate);
    }

    #[test]
    fn test_empty_input_is_empty_aggregate() {
        let aggregate = TimeAggregator::aggregate(Vec::new()).unwrap();
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.record_count(), 0);
    }

    // ── grand_totals ──────────────────────────────────────────────────────────

    #[test]
    fn test_grand_totals_across_tags() {
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("A", "Al", "a", 60, None),
            make_record("B", "Al", "b", 45, None),
            make_record("B", "Bo", "c", 5, None),
        ])
        .unwrap();
        let grand = TimeAggregator::grand_totals(&aggregate.formatted_time_totals()).unwrap();
        assert_eq!(format_minutes(grand["Al"]), "1h 45m");
        assert_eq!(grand["Bo"], 5);
    }

    #[test]
    fn test_grand_totals_skip_empty_assignee() {
        let mut formatted = FormattedTotals::new();
        formatted
            .entry("A".to_string())
            .or_default()
            .insert(String::new(), "3h 0m".to_string());
        formatted
            .entry("A".to_string())
            .or_default()
            .insert("Al".to_string(), "0h 10m".to_string());

        let grand = TimeAggregator::grand_totals(&formatted).unwrap();
        assert!(!grand.contains_key(""));
        assert_eq!(grand["Al"], 10);
    }

    #[test]
    fn test_grand_totals_reject_malformed_display() {
        let mut formatted = FormattedTotals::new();
        formatted
            .entry("A".to_string())
            .or_default()
            .insert("Al".to_string(), "ten minutes".to_string());
        assert!(TimeAggregator::grand_totals(&formatted).is_err());
    }

    #[test]
    fn test_overflowing_total_is_an_error_not_a_wrap() {
        let huge = u64::MAX / 60 * 60;
        let err = TimeAggregator::aggregate(vec![
            make_record("A", "Al", "x", huge, None),
            make_record("A", "Al", "y", huge, None),
        ])
        .unwrap_err();
        match err {
            ReportError::InvalidRow { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Time spent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflowing_estimate_total_names_estimate_column() {
        let huge = u64::MAX - 10;
        let err = TimeAggregator::aggregate(vec![
            make_record("A", "Al", "x", 0, Some(huge)),
            make_record("A", "Al", "y", 0, Some(huge)),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Original estimate"), "{err}");
    }

    #[test]
    fn test_grand_totals_overflow_across_tags_is_an_error() {
        let huge = u64::MAX - 10;
        let aggregate = TimeAggregator::aggregate(vec![
            make_record("A", "Al", "x", huge, None),
            make_record("B", "Al", "y", huge, None),
        ])
        .unwrap();
        let err = TimeAggregator::grand_totals(&aggregate.formatted_time_totals()).unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }
}
