//! Normalization of user-supplied due dates.
//!
//! Accepted inputs, all normalized to a UTC instant:
//! - RFC 3339 timestamps (`2024-06-01T09:30:00+02:00`, `2024-06-01T09:30:00Z`)
//! - timestamps without a zone (`2024-06-01T09:30:00`, `2024-06-01 09:30:00`,
//!   `2024-06-01T09:30`), read as UTC
//! - plain dates (`2024-06-01`), read as midnight UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{AppError, Result};

const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(AppError::Validation(format!("Invalid due date: {input}")))
}

/// Missing or blank input means "due now".
pub fn parse_optional_due_date(input: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_due_date(s),
        None => Ok(now),
    }
}
