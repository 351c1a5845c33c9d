//! Tag extraction from issue titles.
//!
//! Titles are prefixed with a bracketed tag followed by a colon, e.g.
//! `"[PVA]: Fix login bug"`. Tags group issues in the report.

use std::sync::OnceLock;

use regex::Regex;

/// Tag used for titles without a bracketed prefix.
pub const DEFAULT_TAG: &str = "Other";

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]:").expect("regex is valid"))
}

/// A title split into its grouping tag and the remaining display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedTitle {
    pub tag: String,
    pub title: String,
}

/// Return the upper-cased tag of `title`, or [`DEFAULT_TAG`].
///
/// ```
/// use report_core::tags::extract_tag;
///
/// assert_eq!(extract_tag("[PVA]: Fix bug"), "PVA");
/// assert_eq!(extract_tag("[pva]: Fix bug"), "PVA");
/// assert_eq!(extract_tag("No tag here"), "Other");
/// ```
pub fn extract_tag(title: &str) -> String {
    split_title(title).tag
}

/// Split `title` into tag and display title.
///
/// The display title is everything after the first `[tag]:` marker, trimmed.
/// Untagged titles are returned whole.
pub fn split_title(title: &str) -> TaggedTitle {
    let Some(caps) = tag_regex().captures(title) else {
        return TaggedTitle {
            tag: DEFAULT_TAG.to_string(),
            title: title.trim().to_string(),
        };
    };

    let token = caps[1].trim();
    let rest = caps.get(0).map_or("", |m| &title[m.end()..]);

    TaggedTitle {
        tag: if token.is_empty() {
            DEFAULT_TAG.to_string()
        } else {
            token.to_uppercase()
        },
        title: rest.trim().to_string(),
    }
}
