//! Boundary validation helpers shared by the ledgers.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

/// Missing or malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trim a required text field; absent or blank is an error.
///
/// # Errors
///
/// Returns `ValidationError` naming `field`.
pub fn required_text(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::new(format!("{field} is required")))
}

/// Trim an optional text field; blank becomes `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// A timestamp contributes the date as written, in its own offset.
///
/// # Errors
///
/// Returns `ValidationError` if neither format matches.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::new(format!("{field} must be a date (YYYY-MM-DD)")))
}
