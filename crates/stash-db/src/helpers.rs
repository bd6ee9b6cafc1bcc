//! Row-to-entity parsing helpers.
//!
//! Timestamps are written with [`format_timestamp`] so that every stored value
//! has the same width and `created_at <= ?` compares chronologically.
//! Reading also accepts `SQLite`'s `datetime('now')` format for rows written
//! by hand.

use chrono::{DateTime, SecondsFormat, Utc};
use stash_core::entities::Properties;

use crate::error::DatabaseError;

/// Render a timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse the JSON `properties` column. NULL and empty text are an empty map.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the column holds invalid JSON.
pub fn parse_properties(s: Option<&str>) -> Result<Properties, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::InvalidState(format!("Invalid properties JSON: {e}"))),
        _ => Ok(Properties::new()),
    }
}
