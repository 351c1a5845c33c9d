//! JSON export of a report snapshot.

use report_core::error::Result;
use report_data::ingest::ReportSnapshot;

/// Pretty-printed JSON: metadata, numeric minute totals and per-tag records.
pub fn render_json(snapshot: &ReportSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_data::ingest::ingest_reader;
    use report_data::normalizer::RecordNormalizer;

    #[test]
    fn test_render_json_parses_back() {
        let csv = "Title,Assignee,Time spent\n[A]: x,Al,1h 15m\n";
        let snapshot = ingest_reader(csv.as_bytes(), "inline", &RecordNormalizer::default()).unwrap();

        let text = render_json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["time_totals"]["A"]["Al"], 75);
        assert_eq!(value["estimate_totals"]["A"]["Al"], 0);
        assert_eq!(value["tag_items"]["A"][0]["original_estimate"]["display"], "N/A");
    }
}
