/*!
 * Local user profiles.
 *
 * A profile is a name and an optional e-mail kept on the device. Exactly one
 * profile at a time is marked as the current user.
 */

use log::info;
use rusqlite::{OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::UserRecord;
use crate::errors::StorageError;

/// Repository for the `users` and `current_user` tables
#[derive(Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a profile and make it the current user
    ///
    /// Returns the new user's id. The previous current user, if any, stays in
    /// `users` but loses the current marker.
    pub async fn create_user(&self, name: &str, email: Option<&str>) -> Result<i64, StorageError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(StorageError::Write("user name must not be empty".to_string()));
        }
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    "INSERT INTO users (name, email) VALUES (?1, ?2)",
                    params![name, email],
                )?;
                let user_id = tx.last_insert_rowid();

                tx.execute("DELETE FROM current_user", [])?;
                tx.execute("INSERT INTO current_user (user_id) VALUES (?1)", [user_id])?;

                info!("Created user profile {} ({})", user_id, name);
                Ok(user_id)
            })
            .await
            .map_err(StorageError::write)
    }

    /// Get the current user, if a profile was ever created
    pub async fn current_user(&self) -> Result<Option<UserRecord>, StorageError> {
        self.db
            .execute_async(|conn| {
                let user = conn
                    .query_row(
                        r#"
                        SELECT u.id, u.name, u.email, u.created_at
                        FROM users u
                        JOIN current_user cu ON u.id = cu.user_id
                        LIMIT 1
                        "#,
                        [],
                        UserRecord::from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
            .map_err(StorageError::read)
    }
}
