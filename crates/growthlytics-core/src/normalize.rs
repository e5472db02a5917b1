use chrono::{Datelike, Duration, NaiveDate};

/// Source label used when a rest-table row has no `media_channel`.
pub const DEFAULT_REST_SOURCE: &str = "rest";

/// Lowercase and trim a channel label.
///
/// Applying it twice yields the same value, so the union stage re-runs it
/// after the merge without changing anything that ingestion already cleaned.
pub fn normalize_source(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Source label for a rest-table row: the channel, or `rest` when the cell is
/// NULL or blank.
pub fn rest_source(channel: Option<&str>) -> String {
    channel
        .map(normalize_source)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REST_SOURCE.to_string())
}

/// Normalize an identifier cell.
///
/// Returns `None` for blank cells. Integral floats such as `"17.0"` (what a
/// numeric id column looks like once it has held a NULL) collapse to `"17"` so
/// mapping ids and revenue user ids join.
pub fn normalize_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(int_part) = trimmed.strip_suffix(".0") {
        let digits = int_part.strip_prefix('-').unwrap_or(int_part);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(int_part.to_string());
        }
    }
    Some(trimmed.to_string())
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Round to two decimals, mapping non-finite results to `None`.
pub fn round2(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some((value * 100.0).round() / 100.0)
    } else {
        None
    }
}
