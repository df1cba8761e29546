/*!
 * Database connection management.
 *
 * This module opens the single on-device SQLite file, makes sure the schema
 * exists before anything else touches it, and provides async-safe access
 * patterns using tokio's spawn_blocking.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;
use crate::errors::StorageError;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "platecheck.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "platecheck";

/// Database connection wrapper with thread-safe access
///
/// Cloning is cheap and shares the same underlying connection, so one handle
/// opened by the composition root can be handed to every repository.
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database at the default location
    pub fn open_default() -> Result<Self, StorageError> {
        let db_path = Self::default_database_path().map_err(StorageError::initialization)?;
        Self::open(&db_path)
    }

    /// Open (or create) the database at the specified path and initialize its schema
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        Self::open_file(db_path.as_ref()).map_err(StorageError::initialization)
    }

    fn open_file(db_path: &Path) -> Result<Self> {
        let db_path = db_path.to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        schema::initialize_schema(&conn).context("Failed to initialize database schema")?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        debug!("Creating in-memory database");

        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory database")
            .map_err(StorageError::initialization)?;

        schema::initialize_schema(&conn)
            .context("Failed to initialize database schema")
            .map_err(StorageError::initialization)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        // Try to use the system data directory
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Re-run schema initialization on the open handle
    ///
    /// Idempotent; normally only `open` needs it.
    pub fn initialize(&self) -> Result<(), StorageError> {
        self.execute(schema::initialize_schema)
            .map_err(StorageError::initialization)
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

        f(&conn)
    }

    /// Execute a database operation asynchronously using spawn_blocking
    ///
    /// This is the preferred method for async contexts as it prevents
    /// blocking the async runtime.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Begin an async transaction and execute operations within it
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats, StorageError> {
        self.execute(|conn| {
            let history_entries: i64 = conn
                .query_row("SELECT COUNT(*) FROM search_history", [], |row| row.get(0))?;

            let total_searches: i64 = conn.query_row(
                "SELECT COALESCE(SUM(search_count), 0) FROM search_history",
                [],
                |row| row.get(0),
            )?;

            let user_count: i64 =
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

            // Get file size if not in-memory
            let file_size = if self.db_path.to_string_lossy() != ":memory:" {
                std::fs::metadata(&self.db_path)
                    .map(|m| m.len())
                    .unwrap_or(0)
            } else {
                0
            };

            Ok(DatabaseStats {
                history_entries,
                total_searches,
                user_count,
                file_size_bytes: file_size,
            })
        })
        .map_err(StorageError::read)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Number of distinct plate/type pairs in the history
    pub history_entries: i64,
    /// Sum of all search counts
    pub total_searches: i64,
    /// Number of local user profiles
    pub user_count: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "History entries: {}, Total searches: {}, Users: {}, Size: {} KB",
            self.history_entries,
            self.total_searches,
            self.user_count,
            self.file_size_bytes / 1024
        )
    }
}
