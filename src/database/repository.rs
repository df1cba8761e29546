/*!
 * Repository layer for the search history.
 *
 * This module provides a high-level API over the `search_history` table,
 * abstracting away the SQL details and providing type-safe access. It is the
 * only writer of that table.
 */

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::{SearchHistoryEntry, format_timestamp};
use crate::errors::StorageError;
use crate::vehicle_utils::{VehicleType, normalize_plate};

/// Number of entries returned by `list_recent` when the caller has no preference
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Insert-or-increment keyed on the natural key, in one statement
const UPSERT_SEARCH: &str = r#"
    INSERT INTO search_history (license_plate, vehicle_type, search_count, last_searched, created_at)
    VALUES (?1, ?2, 1, ?3, ?3)
    ON CONFLICT(license_plate, vehicle_type)
    DO UPDATE SET search_count = search_history.search_count + 1,
                  last_searched = excluded.last_searched
"#;

/// Repository for the plate lookup history
#[derive(Clone)]
pub struct SearchHistoryRepository {
    /// Database connection
    db: DatabaseConnection,
}

impl SearchHistoryRepository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(DatabaseConnection::open_in_memory()?))
    }

    /// Record a search for a plate/type pair at the current time
    ///
    /// Creates the entry with a count of 1 on first search, otherwise bumps the
    /// count and the last-searched time. Returns the entry as stored.
    pub async fn record_search(
        &self,
        license_plate: &str,
        vehicle_type: VehicleType,
    ) -> Result<SearchHistoryEntry, StorageError> {
        self.record_search_at(license_plate, vehicle_type, Utc::now())
            .await
    }

    /// Record a search with an explicit search time
    pub async fn record_search_at(
        &self,
        license_plate: &str,
        vehicle_type: VehicleType,
        searched_at: DateTime<Utc>,
    ) -> Result<SearchHistoryEntry, StorageError> {
        let license_plate = normalize_plate(license_plate);
        if license_plate.is_empty() {
            return Err(StorageError::Write(
                "license plate must not be empty".to_string(),
            ));
        }
        let searched_at = format_timestamp(&searched_at);

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    UPSERT_SEARCH,
                    params![license_plate, vehicle_type.as_str(), searched_at],
                )?;

                let entry = tx.query_row(
                    &format!(
                        "SELECT {} FROM search_history WHERE license_plate = ?1 AND vehicle_type = ?2",
                        SearchHistoryEntry::COLUMNS
                    ),
                    params![license_plate, vehicle_type.as_str()],
                    SearchHistoryEntry::from_row,
                )?;

                debug!(
                    "Recorded search for {} ({}), count now {}",
                    entry.license_plate, entry.vehicle_type, entry.search_count
                );
                Ok(entry)
            })
            .await
            .map_err(StorageError::write)
    }

    /// List up to `limit` entries, most recently searched first
    ///
    /// Entries searched within the same second keep insertion order.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {}
                    FROM search_history
                    ORDER BY last_searched DESC, id ASC
                    LIMIT ?1
                    "#,
                    SearchHistoryEntry::COLUMNS
                ))?;

                let entries = stmt
                    .query_map([limit], SearchHistoryEntry::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(entries)
            })
            .await
            .map_err(StorageError::read)
    }

    /// Look up an entry by its natural key
    pub async fn find(
        &self,
        license_plate: &str,
        vehicle_type: VehicleType,
    ) -> Result<Option<SearchHistoryEntry>, StorageError> {
        let license_plate = normalize_plate(license_plate);

        self.db
            .execute_async(move |conn| {
                let entry = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM search_history WHERE license_plate = ?1 AND vehicle_type = ?2",
                            SearchHistoryEntry::COLUMNS
                        ),
                        params![license_plate, vehicle_type.as_str()],
                        SearchHistoryEntry::from_row,
                    )
                    .optional()?;
                Ok(entry)
            })
            .await
            .map_err(StorageError::read)
    }

    /// Delete one entry. Unknown ids are not an error; returns whether a row went away.
    pub async fn delete_entry(&self, id: i64) -> Result<bool, StorageError> {
        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM search_history WHERE id = ?1", [id])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(StorageError::write)
    }

    /// Delete the whole history, returning the number of removed entries
    pub async fn clear_all(&self) -> Result<usize, StorageError> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM search_history", [])?;
                debug!("Cleared {} search history entries", deleted);
                Ok(deleted)
            })
            .await
            .map_err(StorageError::write)
    }
}
