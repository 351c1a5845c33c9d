//! Plain-text console report.
//!
//! Three blocks: grand totals per person, totals per tag, then one detail
//! block per tag with fixed-width columns.

use std::fmt::Write;

use report_core::formatting::{fit_to_width, pad_to_width};

use crate::view::{DetailRow, ReportView, TagSection};

/// Default column width for assignee names.
pub const DEFAULT_ASSIGNEE_WIDTH: usize = 12;

/// Column layout for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub assignee_width: usize,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            assignee_width: DEFAULT_ASSIGNEE_WIDTH,
        }
    }
}

/// Render the whole report as text.
pub fn render_console(view: &ReportView, options: &ConsoleOptions) -> String {
    let mut out = String::new();

    out.push_str("### Total time per person ###\n");
    for total in &view.grand_totals {
        let _ = writeln!(out, "{}: {}", total.assignee, total.total);
    }

    for section in &view.sections {
        let _ = writeln!(out, "\n### Total time for {} ###", section.tag);
        for total in &section.totals {
            let _ = writeln!(out, "{}: {}", total.assignee, total.time_spent);
        }
    }

    for section in &view.sections {
        render_section(&mut out, section, options);
    }

    out
}

fn render_section(out: &mut String, section: &TagSection, options: &ConsoleOptions) {
    let _ = writeln!(out, "\n### {} ###", section.tag);
    for row in &section.rows {
        out.push_str(&detail_line(row, section.title_width, options));
        out.push('\n');
    }
}

/// One fixed-width detail line, trailing padding removed.
pub fn detail_line(row: &DetailRow, title_width: usize, options: &ConsoleOptions) -> String {
    let line = format!(
        "- {} | {} | Time spent: {} | Original estimate: {} | Work ratio: {} | Status: {} | Issue: {} | Sprint: {}",
        pad_to_width(&row.assignee, options.assignee_width),
        fit_to_width(&row.title, title_width),
        pad_to_width(&row.time_spent, 10),
        pad_to_width(&row.original_estimate, 15),
        pad_to_width(&row.work_ratio, 10),
        pad_to_width(&row.status, 12),
        row.issue_text(),
        pad_to_width(&row.sprint, 20),
    );
    line.trim_end().to_string()
}
