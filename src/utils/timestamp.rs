//! Parsing of caller-supplied expiration timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::entities::link::default_expiration;
use crate::error::AppError;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses an ISO-8601 expiration.
///
/// `None`, empty and blank inputs yield the far-future default. Inputs with
/// an offset are converted to UTC; inputs without one are taken as UTC.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for anything else.
pub fn parse_expiration(input: Option<&str>) -> Result<DateTime<Utc>, AppError> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default_expiration());
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            AppError::bad_request(
                "Invalid expiration date, expected ISO-8601",
                json!({ "expiration_date": raw }),
            )
        })
}
