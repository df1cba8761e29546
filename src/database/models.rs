/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use serde::{Deserialize, Serialize};

use crate::vehicle_utils::VehicleType;

/// Text layout of stored timestamps, identical to SQLite's `CURRENT_TIMESTAMP`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp the way SQLite's `CURRENT_TIMESTAMP` does (UTC, whole seconds)
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Layouts SQLite accepts as DATETIME text, read as UTC
const ACCEPTED_TIMESTAMP_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a stored timestamp
///
/// Rows written by this crate use `TIMESTAMP_FORMAT`; rows written by other
/// tools may carry a `T` separator, fractional seconds or a UTC offset.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    ACCEPTED_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|at| at.with_timezone(&Utc))
        })
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", text).into(),
        )
    })
}

/// One row of the search history: a plate/type pair and how often it was looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Database ID, assigned on first insert
    pub id: i64,
    /// Normalized (upper-cased) license plate
    pub license_plate: String,
    /// Vehicle type; with the plate it forms the natural key
    pub vehicle_type: VehicleType,
    /// Number of searches for this pair, starting at 1
    pub search_count: i64,
    /// Time of the most recent search
    pub last_searched: DateTime<Utc>,
    /// Time of the first search
    pub created_at: DateTime<Utc>,
}

impl SearchHistoryEntry {
    /// Column list matching `from_row`
    pub(crate) const COLUMNS: &'static str =
        "id, license_plate, vehicle_type, search_count, last_searched, created_at";

    /// Map a row selected with `COLUMNS`
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let vehicle_type: String = row.get(2)?;
        Ok(Self {
            id: row.get(0)?,
            license_plate: row.get(1)?,
            vehicle_type: vehicle_type.parse().map_err(|e: anyhow::Error| {
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
            })?,
            search_count: row.get(3)?,
            last_searched: timestamp_column(row, 4)?,
            created_at: timestamp_column(row, 5)?,
        })
    }
}

/// Local user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional e-mail, unique across users
    pub email: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            created_at: timestamp_column(row, 3)?,
        })
    }
}
