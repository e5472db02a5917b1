//! Cell parsers. Every parser maps bad input to `None` instead of failing the run.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::schema::DAY_MONTH_YEAR_FORMAT;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%y", "%d-%b-%Y", "%m/%d/%Y", "%Y/%m/%d"];

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// `05-Jan-24` → 2024-01-05 00:00.
pub fn parse_install_time(raw: Option<&str>) -> Option<NaiveDateTime> {
    parse_cost_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn parse_cost_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(non_blank(raw)?, DAY_MONTH_YEAR_FORMAT).ok()
}

/// Generic date-time parsing for revenue periods and mapping timestamps.
pub fn parse_datetime_lenient(raw: Option<&str>) -> Option<NaiveDateTime> {
    let value = non_blank(raw)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Revenue or spend amount. Blank, non-numeric, and non-finite cells are NULL.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    non_blank(raw)?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
