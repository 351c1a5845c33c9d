use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::{MISSING, PLACEHOLDER};

/// Format a whole number as a percentage with two decimal places.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_percentage;
///
/// assert_eq!(format_percentage(150), "150.00%");
/// assert_eq!(format_percentage(0), "0.00%");
/// ```
pub fn format_percentage(value: u64) -> String {
    format!("{:.2}%", value as f64)
}

/// Format time spent for a detail line.
///
/// * `0` minutes → `"-"`
/// * otherwise → hours right-aligned in 3 columns, minutes in 2: `"  1h 30m"`
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_time_spent;
///
/// assert_eq!(format_time_spent(0), "-");
/// assert_eq!(format_time_spent(90), "  1h 30m");
/// assert_eq!(format_time_spent(605), " 10h  5m");
/// ```
pub fn format_time_spent(minutes: u64) -> String {
    if minutes == 0 {
        PLACEHOLDER.to_string()
    } else {
        format!("{:>3}h {:>2}m", minutes / 60, minutes % 60)
    }
}

/// Return `value`, or `"-"` when it is empty or the missing-column default.
pub fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == MISSING {
        PLACEHOLDER
    } else {
        value
    }
}

/// Terminal display width of `s`.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Right-pad `s` with spaces to `width` display columns. Longer strings are
/// returned unchanged.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - current));
    out
}

/// Pad or truncate `s` to exactly `width` display columns.
pub fn fit_to_width(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return pad_to_width(s, width);
    }
    pad_to_width(&truncate_to_width(s, width), width)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Longest prefix of `s` whose display width fits in `width`.
fn truncate_to_width(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
