//! Self-contained HTML report.
//!
//! Renders the same [`ReportView`] as the console: grand totals, then one
//! collapsible section per tag with its detail table and per-person totals.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Datelike, Local};
use report_data::ingest::IngestMetadata;

use crate::view::{ReportView, TagSection};

const STYLE: &str = r#"
body { font-family: 'Myriad Pro', sans-serif; background: #f4f5f7; margin: 0; color: #172b4d; }
h1, h2, h3 { color: #357de8; font-weight: normal; }
h1 { text-align: center; margin-top: 40px; font-size: 32px; }
h2 { font-size: 24px; cursor: pointer; display: flex; justify-content: space-between; }
h3 { margin-top: 20px; font-size: 20px; }
.section { background: #fff; border-radius: 8px; margin: 20px auto; padding: 20px;
           box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1); width: 95%; max-width: 1200px; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #e1e4e8; }
th { background: #f4f5f7; font-weight: normal; }
td { color: #6b778c; white-space: pre; }
td:first-child { font-weight: bold; color: #357de8; }
tr:hover { background: #f1f3f5; }
.toggle-icon { font-size: 18px; }
.toggle-content { display: none; }
footer { text-align: center; margin: 40px 0; font-size: 14px; color: #6b778c; }
"#;

const SCRIPT: &str = r#"
function toggleSection(id) {
    var content = document.getElementById(id + "-content");
    var icon = document.getElementById(id + "-icon");
    var open = content.style.display === "block";
    content.style.display = open ? "none" : "block";
    icon.innerHTML = open ? "&#9654;" : "&#9660;";
}
"#;

/// A renderable HTML page; use `to_string()` to obtain the markup.
pub struct HtmlReport<'a> {
    view: &'a ReportView,
    metadata: &'a IngestMetadata,
    rendered_at: DateTime<Local>,
}

impl<'a> HtmlReport<'a> {
    pub fn new(view: &'a ReportView, metadata: &'a IngestMetadata) -> Self {
        Self {
            view,
            metadata,
            rendered_at: Local::now(),
        }
    }

    fn write_grand_totals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<div class=\"section\">")?;
        writeln!(f, "<h2>Total time per person</h2>")?;
        writeln!(f, "<table>\n<tr><th>Assignee</th><th>Total time</th></tr>")?;
        for total in &self.view.grand_totals {
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&total.assignee),
                escape_html(&total.total)
            )?;
        }
        writeln!(f, "</table>\n</div>")
    }

    fn write_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        section: &TagSection,
    ) -> fmt::Result {
        let id = format!("tag-{index}");
        let tag = escape_html(&section.tag);

        writeln!(f, "<div class=\"section\">")?;
        writeln!(
            f,
            "<h2 onclick=\"toggleSection('{id}')\">{tag} \
             <span class=\"toggle-icon\" id=\"{id}-icon\">&#9654;</span></h2>"
        )?;
        writeln!(f, "<div class=\"toggle-content\" id=\"{id}-content\">")?;

        writeln!(
            f,
            "<table>\n<tr><th>Assignee</th><th>Title</th><th>Time Spent</th>\
             <th>Original Estimate</th><th>Work Ratio</th><th>Status</th>\
             <th>Issue</th><th>Sprint</th></tr>"
        )?;
        for row in &section.rows {
            let issue = match &row.issue_url {
                Some(url) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(&row.issue_id)
                ),
                None => escape_html(&row.issue_id).into_owned(),
            };
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.assignee),
                escape_html(&row.title),
                escape_html(row.time_spent.trim()),
                escape_html(&row.original_estimate),
                escape_html(&row.work_ratio),
                escape_html(&row.status),
                issue,
                escape_html(&row.sprint),
            )?;
        }
        writeln!(f, "</table>")?;

        writeln!(f, "<h3>Total time per person for {tag}</h3>")?;
        writeln!(
            f,
            "<table>\n<tr><th>Assignee</th><th>Time spent</th><th>Original estimate</th></tr>"
        )?;
        for total in &section.totals {
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&total.assignee),
                escape_html(&total.time_spent),
                escape_html(&total.original_estimate)
            )?;
        }
        writeln!(f, "</table>\n</div>\n</div>")
    }
}

impl fmt::Display for HtmlReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>")?;
        writeln!(f, "<meta charset=\"UTF-8\">")?;
        writeln!(
            f,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(f, "<title>Jira Report</title>")?;
        writeln!(f, "<style>{STYLE}</style>\n<script>{SCRIPT}</script>")?;
        writeln!(f, "</head>\n<body>\n<h1>Jira Report</h1>")?;

        self.write_grand_totals(f)?;
        for (index, section) in self.view.sections.iter().enumerate() {
            self.write_section(f, index, section)?;
        }

        writeln!(
            f,
            "<footer><p>&copy; {} Jira Report &middot; {} &middot; generated {}</p></footer>",
            self.rendered_at.year(),
            escape_html(&self.metadata.source),
            escape_html(&self.metadata.generated_at)
        )?;
        writeln!(f, "</body>\n</html>")
    }
}

/// Render the page in one call.
pub fn render_html(view: &ReportView, metadata: &IngestMetadata) -> String {
    HtmlReport::new(view, metadata).to_string()
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
