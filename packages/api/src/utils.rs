//! Utility functions for the API

use chrono::{
    DateTime,
    NaiveDateTime,
    SecondsFormat,
    Utc,
};

/// RFC 3339 with a numeric offset. `%.f` also matches when no fractional
/// part is present.
const RFC3339_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// RFC 3339 date and time before a trailing `Z`
const RFC3339_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Offset-less layouts accepted after RFC 3339, interpreted as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a device supplied timestamp.
///
/// Tries RFC 3339 (with or without fractional seconds), then
/// `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`. The first format that
/// parses wins; `None` when none do.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(parsed) = parse_rfc3339(raw) {
        return Some(parsed);
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Strict RFC 3339: upper-case `T` separator, then `Z` or `+HH:MM`.
/// chrono's own RFC 3339 parser also takes a space or lower-case letters.
fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(utc_text) = raw.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc_text, RFC3339_UTC_FORMAT)
            .ok()
            .map(|naive| naive.and_utc());
    }

    DateTime::parse_from_str(raw, RFC3339_OFFSET_FORMAT)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Canonical rendering used when no raw timestamp text is available
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Timestamp shown to clients: the raw text when present, else the parsed
/// value, else the server creation time.
pub fn display_timestamp(
    raw: Option<&str>,
    parsed: Option<&DateTime<Utc>>,
    created_at: &DateTime<Utc>,
) -> String {
    match (raw.filter(|text| !text.trim().is_empty()), parsed) {
        (Some(text), _) => text.to_string(),
        (None, Some(parsed)) => format_timestamp(parsed),
        (None, None) => format_timestamp(created_at),
    }
}

/// Trim a string, turning blank values into `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}
