//! Wallets: named containers that incomes and expenses are filed under.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, auth::UserID, database_id::DatabaseId, sanitize::clean_text};

/// The longest wallet name allowed, counted in user-perceived characters.
pub const MAX_WALLET_NAME_LENGTH: usize = 50;

/// A wallet owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wallet {
    /// The ID of the wallet.
    pub id: DatabaseId,
    /// The display name of the wallet.
    pub name: String,
    /// When the wallet was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the wallet was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The client supplied fields for creating or renaming a wallet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletForm {
    /// The new name of the wallet.
    pub name: Option<String>,
    /// The user the client believes it is acting for.
    ///
    /// Clients send this as either a number or a string.
    #[serde(rename = "userId")]
    pub user_id: Option<serde_json::Value>,
}

impl WalletForm {
    /// Whether the form names a user other than `user_id`.
    pub(crate) fn claims_other_user(&self, user_id: UserID) -> bool {
        match &self.user_id {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Number(number)) => number.as_i64() != Some(user_id.as_i64()),
            Some(serde_json::Value::String(text)) => text.trim() != user_id.to_string(),
            Some(_) => true,
        }
    }
}

/// Trim, sanitise and check the length of a wallet name.
///
/// # Errors
/// Returns [Error::Validation] if the name is missing, blank or too long.
pub fn validate_wallet_name(name: Option<&str>) -> Result<String, Error> {
    let name = name.map(clean_text).unwrap_or_default();

    if name.is_empty() {
        return Err(Error::Validation("Wallet name is required".to_owned()));
    }

    if name.graphemes(true).count() > MAX_WALLET_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Wallet name cannot exceed {MAX_WALLET_NAME_LENGTH} characters"
        )));
    }

    Ok(name)
}

/// Create the wallets table.
pub fn create_wallet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS wallets (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_by INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            updated_by INTEGER,
            deleted_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_wallets_user ON wallets(created_by);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Wallet, rusqlite::Error> {
    Ok(Wallet {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Create a wallet owned by `user_id`.
///
/// # Errors
/// Returns [Error::Validation] if the name is invalid, or [Error::SqlError]
/// if an SQL related error occurred.
pub fn create_wallet(
    form: &WalletForm,
    user_id: UserID,
    connection: &Connection,
) -> Result<Wallet, Error> {
    let name = validate_wallet_name(form.name.as_deref())?;
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO wallets (name, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        (&name, user_id.as_i64(), now),
    )?;

    get_wallet(connection.last_insert_rowid(), user_id, connection)
}

/// Get a live wallet of the user.
///
/// # Errors
/// Returns [Error::WalletNotFound] if the wallet does not exist, is deleted or
/// belongs to another user.
pub fn get_wallet(
    wallet_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Wallet, Error> {
    connection
        .query_row(
            "SELECT id, name, created_at, updated_at FROM wallets
            WHERE id = ?1 AND created_by = ?2 AND deleted_at IS NULL",
            (wallet_id, user_id.as_i64()),
            map_row,
        )
        .optional()?
        .ok_or(Error::WalletNotFound)
}

/// Get the live wallets of the user ordered by name.
pub fn get_wallets(user_id: UserID, connection: &Connection) -> Result<Vec<Wallet>, Error> {
    connection
        .prepare(
            "SELECT id, name, created_at, updated_at FROM wallets
            WHERE created_by = ?1 AND deleted_at IS NULL
            ORDER BY name ASC, id ASC",
        )?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_wallet| maybe_wallet.map_err(Error::from))
        .collect()
}

/// Rename a live wallet of the user.
///
/// # Errors
/// Returns [Error::Validation] if the name is invalid, or
/// [Error::WalletNotFound] if there is no live wallet with `wallet_id` for
/// the user.
pub fn update_wallet(
    wallet_id: DatabaseId,
    form: &WalletForm,
    user_id: UserID,
    connection: &Connection,
) -> Result<Wallet, Error> {
    let name = validate_wallet_name(form.name.as_deref())?;

    let rows_affected = connection.execute(
        "UPDATE wallets SET name = ?1, updated_at = ?2, updated_by = ?3
        WHERE id = ?4 AND created_by = ?3 AND deleted_at IS NULL",
        (&name, OffsetDateTime::now_utc(), user_id.as_i64(), wallet_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::WalletNotFound);
    }

    get_wallet(wallet_id, user_id, connection)
}

/// Soft delete a live wallet of the user.
///
/// Entries filed under the wallet keep their reference to it.
///
/// # Errors
/// Returns [Error::DeleteMissingWallet] if there is no live wallet with
/// `wallet_id` for the user.
pub fn delete_wallet(
    wallet_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();

    let rows_affected = connection.execute(
        "UPDATE wallets SET deleted_at = ?1, updated_at = ?1, updated_by = ?2
        WHERE id = ?3 AND created_by = ?2 AND deleted_at IS NULL",
        (now, user_id.as_i64(), wallet_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingWallet);
    }

    Ok(())
}
