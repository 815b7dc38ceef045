//! The user table holding the app's single account.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// Newtype around the integer user row ID.
///
/// Keeps user IDs from being mixed up with other integer IDs at compile
/// time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Wrap a raw row ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw row ID, for SQL parameters.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The account holder.
///
/// The app follows a single-user model, so in practice the user table holds
/// at most one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's row ID.
    pub id: UserID,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
}

/// Create the user table if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the SQL statement fails.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user row and return it with its assigned ID.
///
/// # Errors
///
/// Returns [Error::SqlError] if the insert fails.
pub fn create_user(password_hash: PasswordHash, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (password) VALUES (?1)",
        (password_hash.as_ref(),),
    )?;

    Ok(User {
        id: UserID::new(connection.last_insert_rowid()),
        password_hash,
    })
}

/// Look up a user by ID.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if no user has this ID.
/// - [Error::SqlError] if the query fails.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, password FROM user WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], |row| {
            Ok(User {
                id: UserID::new(row.get(0)?),
                password_hash: PasswordHash::new_unchecked(&row.get::<_, String>(1)?),
            })
        })?;

    Ok(user)
}

/// The number of registered users, which for this app is zero or one.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}
