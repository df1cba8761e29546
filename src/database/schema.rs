/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for all database tables
 * and handles schema migrations for version upgrades.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Version assigned to databases written before versioning existed.
/// Those carry `search_history` without the natural-key index.
pub const LEGACY_SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
///
/// Safe to call on every start: tables are only created when missing and
/// existing rows are never duplicated.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    // WAL for better concurrency and crash recovery; must precede the migration transaction
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, current_version)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    if !table_exists(conn, "schema_version")? {
        // Written by the unversioned app: the history table is there but nothing else
        if table_exists(conn, "search_history")? {
            return Ok(LEGACY_SCHEMA_VERSION);
        }
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to check {} table existence", name))?;
    Ok(exists)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    create_version_table(conn)?;
    create_base_tables(conn)?;
    create_history_indexes(conn)?;

    info!("Database schema created successfully");
    Ok(())
}

fn create_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Tables shared with the unversioned layout
fn create_base_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS search_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            license_plate TEXT NOT NULL,
            vehicle_type TEXT NOT NULL,
            search_count INTEGER DEFAULT 1,
            last_searched DATETIME DEFAULT CURRENT_TIMESTAMP,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS current_user (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            FOREIGN KEY (user_id) REFERENCES users (id)
        );
        "#,
    )?;
    Ok(())
}

fn create_history_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_search_history_natural_key
            ON search_history(license_plate, vehicle_type);
        CREATE INDEX IF NOT EXISTS idx_search_history_last_searched
            ON search_history(last_searched);
        "#,
    )?;
    Ok(())
}

/// Migrate the schema from one version to another
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("Failed to start migration transaction")?;
    let mut current = from_version;

    while current < SCHEMA_VERSION {
        match current {
            1 => {
                migrate_v1_to_v2(&tx)?;
                current = 2;
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown schema version: {}. Cannot migrate.",
                    current
                ));
            }
        }
    }

    set_schema_version(&tx, SCHEMA_VERSION)?;
    tx.commit().context("Failed to commit schema migration")?;
    info!("Schema migration completed to v{}", SCHEMA_VERSION);
    Ok(())
}

/// Collapse duplicate natural keys left by the unversioned layout, then
/// add the unique index that keeps them collapsed.
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    create_version_table(conn)?;
    create_base_tables(conn)?;

    conn.execute_batch(
        r#"
        UPDATE search_history SET license_plate = UPPER(TRIM(license_plate));

        UPDATE search_history AS h
        SET search_count = merged.total,
            last_searched = merged.latest,
            created_at = merged.earliest
        FROM (
            SELECT MIN(id) AS keep_id,
                   SUM(COALESCE(search_count, 1)) AS total,
                   MAX(last_searched) AS latest,
                   MIN(created_at) AS earliest
            FROM search_history
            GROUP BY license_plate, vehicle_type
        ) AS merged
        WHERE h.id = merged.keep_id;

        DELETE FROM search_history
        WHERE id NOT IN (
            SELECT MIN(id) FROM search_history GROUP BY license_plate, vehicle_type
        );
        "#,
    )
    .context("Failed to merge duplicate search history rows")?;

    create_history_indexes(conn)?;
    debug!("Search history natural key index created");
    Ok(())
}

/// Drop all tables (for testing purposes only)
#[cfg(test)]
pub fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS current_user;
        DROP TABLE IF EXISTS users;
        DROP TABLE IF EXISTS search_history;
        DROP TABLE IF EXISTS schema_version;
        "#,
    )?;
    Ok(())
}
