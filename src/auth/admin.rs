//! The `admins` table and the credentialed users of the dashboard.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer admin IDs.
///
/// This helps disambiguate admin IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered admin.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    /// The admin's ID in the application database.
    pub id: UserID,
    /// The name shown in the dashboard.
    pub user_name: String,
    /// The e-mail address used to log in, unique across admins.
    pub email: String,
    /// The admin's password hash.
    pub password_hash: PasswordHash,
}

/// The data needed to register an admin.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// The name shown in the dashboard.
    pub user_name: String,
    /// The e-mail address used to log in.
    pub email: String,
    /// The admin's password hash.
    pub password_hash: PasswordHash,
}

/// Create the admins table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_admin_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY,
                user_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new admin into the database.
///
/// The e-mail address is trimmed and stored in lowercase.
///
/// # Errors
///
/// Returns:
/// - [Error::Validation] if the name or e-mail is empty.
/// - [Error::DuplicateEmail] if the e-mail address is already registered.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_admin(new_admin: NewAdmin, connection: &Connection) -> Result<Admin, Error> {
    let user_name = new_admin.user_name.trim().to_owned();
    let email = new_admin.email.trim().to_lowercase();

    if user_name.is_empty() {
        return Err(Error::Validation("User name is required".to_owned()));
    }

    if !crate::sanitize::is_plausible_email(&email) {
        return Err(Error::Validation("A valid e-mail address is required".to_owned()));
    }

    connection
        .execute(
            "INSERT INTO admins (user_name, email, password) VALUES (?1, ?2, ?3)",
            (&user_name, &email, &new_admin.password_hash),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::DuplicateEmail
            }
            error => error.into(),
        })?;

    Ok(Admin {
        id: UserID::new(connection.last_insert_rowid()),
        user_name,
        email,
        password_hash: new_admin.password_hash,
    })
}

fn map_admin_row(row: &Row) -> Result<Admin, rusqlite::Error> {
    Ok(Admin {
        id: UserID::new(row.get(0)?),
        user_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

/// Get the admin whose e-mail matches `email`, ignoring case.
///
/// Returns `None` when no admin has that address.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_admin_by_email(email: &str, connection: &Connection) -> Result<Option<Admin>, Error> {
    connection
        .query_row(
            "SELECT id, user_name, email, password FROM admins WHERE email = ?1",
            (email.trim().to_lowercase(),),
            map_admin_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Get the number of admins in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_admins(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM admins;", [], |row| row.get(0))?;

    Ok(count as usize)
}
