//! Calendar-day parsing and range helpers shared by the diary client and handlers.

use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use crate::error::DashError;

/// `YYYY-MM-DD`, the only date shape accepted on input and produced on output.
pub const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) fn is_valid_day_format(value: &str) -> bool {
    lazy_static! {
        static ref DAY_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    DAY_RE.is_match(value)
}

/// Parses a user-supplied `YYYY-MM-DD` string into a calendar day.
pub fn parse_day(field: &str, value: &str) -> Result<Date, DashError> {
    let value = value.trim();
    if !is_valid_day_format(value) {
        return Err(DashError::Validation(format!(
            "{field} must be YYYY-MM-DD, got {value:?}"
        )));
    }
    Date::parse(value, DAY_FORMAT)
        .map_err(|_| DashError::Validation(format!("{field} is not a calendar day: {value}")))
}

pub fn format_day(date: Date) -> String {
    date.format(DAY_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Validates an inclusive `[start, end]` range; `max_days` bounds its length.
pub fn validate_range(start: Date, end: Date, max_days: i64) -> Result<(), DashError> {
    if start > end {
        return Err(DashError::Validation(format!(
            "start_date {} is after end_date {}",
            format_day(start),
            format_day(end)
        )));
    }
    let days = (end - start).whole_days() + 1;
    if days > max_days {
        return Err(DashError::Validation(format!(
            "range of {days} days exceeds the limit of {max_days}"
        )));
    }
    Ok(())
}

/// Every calendar day in `[start, end]`, in order. Empty when `start > end`.
pub fn days_in_range(start: Date, end: Date) -> Vec<Date> {
    let mut days = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current {
        if day > end {
            break;
        }
        days.push(day);
        current = day.next_day();
    }
    days
}

/// Serde adapter for `Date` as `YYYY-MM-DD`.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DAY_FORMAT;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(DAY_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, DAY_FORMAT).map_err(serde::de::Error::custom)
    }
}
