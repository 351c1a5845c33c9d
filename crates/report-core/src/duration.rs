//! Parsing of the human-readable durations found in tracker exports.
//!
//! The export writes time spent and estimates as `"1h 30m"`, `"45m"` or
//! `"2h"`, and the work ratio as `"<m>m <s>s"`. Every matched number must be a
//! whole, representable value; anything else is an input error.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReportError, Result};

fn hours_minutes_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?)(\d+(?:[.,]\d+)?)([hm])").expect("regex is valid"))
}

fn minutes_seconds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?)(\d+(?:[.,]\d+)?)([ms])").expect("regex is valid"))
}

/// Convert a duration such as `"1h 30m"` to whole minutes.
///
/// Tokens may appear in either order and repeated tokens are summed. An empty
/// string, or one without any `h`/`m` token, is zero minutes.
///
/// # Examples
///
/// ```
/// use report_core::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h 30m").unwrap(), 90);
/// assert_eq!(parse_duration("45m").unwrap(), 45);
/// assert_eq!(parse_duration("").unwrap(), 0);
/// assert!(parse_duration("1.5h").is_err());
/// assert!(parse_duration("-30m").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<u64> {
    Ok(parse_duration_opt(value)?.unwrap_or(0))
}

/// Like [`parse_duration`], but returns `None` when the string holds no
/// duration token at all, so placeholders such as `"N/A"` can be told apart
/// from an explicit `"0m"`.
pub fn parse_duration_opt(value: &str) -> Result<Option<u64>> {
    sum_tokens(value, hours_minutes_regex(), |unit| match unit {
        "h" => 60,
        _ => 1,
    })
}

/// Convert a `"<m>m <s>s"` duration to whole seconds.
///
/// Returns `None` when neither an `m` nor an `s` token is present.
pub fn parse_minutes_seconds(value: &str) -> Result<Option<u64>> {
    sum_tokens(value, minutes_seconds_regex(), |unit| match unit {
        "m" => 60,
        _ => 1,
    })
}

/// Render whole minutes as `"<H>h <M>m"`.
///
/// ```
/// use report_core::duration::format_minutes;
///
/// assert_eq!(format_minutes(90), "1h 30m");
/// assert_eq!(format_minutes(0), "0h 0m");
/// ```
pub fn format_minutes(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Inverse of [`format_minutes`]: split on `h`, strip the trailing `m`.
///
/// Unlike [`parse_duration`] this only accepts the exact `"<H>h <M>m"` shape
/// produced by the aggregator.
pub fn parse_hm(display: &str) -> Result<u64> {
    let (hours, rest) = display
        .split_once('h')
        .ok_or_else(|| ReportError::invalid_duration(display, "missing 'h' separator"))?;
    let minutes = rest
        .trim()
        .strip_suffix('m')
        .ok_or_else(|| ReportError::invalid_duration(display, "missing trailing 'm'"))?;

    let hours: u64 = hours
        .trim()
        .parse()
        .map_err(|_| ReportError::invalid_duration(display, "hours are not a whole number"))?;
    let minutes: u64 = minutes
        .trim()
        .parse()
        .map_err(|_| ReportError::invalid_duration(display, "minutes are not a whole number"))?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(|| ReportError::invalid_duration(display, "value too large"))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn sum_tokens(
    value: &str,
    re: &Regex,
    unit_factor: impl Fn(&str) -> u64,
) -> Result<Option<u64>> {
    let mut total: Option<u64> = None;

    for caps in re.captures_iter(value) {
        if !caps[1].is_empty() {
            return Err(ReportError::invalid_duration(
                value,
                "negative values are not allowed",
            ));
        }
        let number = &caps[2];
        if number.contains(|c| c == '.' || c == ',') {
            return Err(ReportError::invalid_duration(
                value,
                "fractional values are not allowed",
            ));
        }

        let amount: u64 = number
            .parse()
            .map_err(|_| ReportError::invalid_duration(value, "number too large"))?;
        let scaled = amount
            .checked_mul(unit_factor(&caps[3]))
            .ok_or_else(|| ReportError::invalid_duration(value, "value too large"))?;

        total = Some(
            total
                .unwrap_or(0)
                .checked_add(scaled)
                .ok_or_else(|| ReportError::invalid_duration(value, "value too large"))?,
        );
    }

    Ok(total)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
