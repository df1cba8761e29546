/*!
 * Database module for persistent local storage.
 *
 * This module provides SQLite-based persistence for:
 * - The plate search history (upsert-or-increment log)
 * - Local user profiles
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod profiles;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{SearchHistoryEntry, UserRecord};
pub use profiles::ProfileRepository;
pub use repository::{DEFAULT_RECENT_LIMIT, SearchHistoryRepository};
