//! Lenient calendar-date parsing for the `date` column.
//!
//! The upstream exports write months in a handful of shapes depending on the
//! tool that produced them (`2022-01-01`, `2022-01`, `2022-01-01 00:00:00`,
//! `2022-01-01T00:00:00+00:00`). Only the calendar date is kept.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Parse a `date` cell into a calendar date.
///
/// Returns `None` when the cell matches none of the accepted shapes.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_data::dates::parse_date;
///
/// let jan = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// assert_eq!(parse_date("2022-01-01"), Some(jan));
/// assert_eq!(parse_date("2022-01"), Some(jan));
/// assert_eq!(parse_date("2022-01-01T00:00:00+00:00"), Some(jan));
/// assert_eq!(parse_date("last month"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Year-month only: pin to the first of the month.
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}
