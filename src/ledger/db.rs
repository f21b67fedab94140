//! Database operations for incomes and expenses.
//!
//! Every write also updates the entry's mirror row in the cashbook, inside the
//! same SQL transaction, so a failure part way through leaves neither table
//! changed.

use rusqlite::{Connection, OptionalExtension, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    cashbook::{delete_mirror, insert_mirror, restore_mirror, update_mirror},
    database_id::DatabaseId,
    ledger::{Entry, EntryForm, EntryKind, core::ValidEntry},
    pagination::{PageRequest, Paged, Pagination},
    sanitize::{LIKE_ESCAPE, escape_like},
};

/// Create the incomes and expenses tables.
///
/// The wallets table must exist first.
pub fn create_entry_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [EntryKind::Income, EntryKind::Expense] {
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                currency TEXT NOT NULL,
                date TEXT NOT NULL,
                fk_wallet_id INTEGER REFERENCES wallets(id),
                created_by INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                updated_by INTEGER,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(created_by, date);",
            table = kind.table()
        ))?;
    }

    Ok(())
}

fn select_columns(kind: EntryKind) -> String {
    format!(
        "SELECT e.id, e.description, e.amount, e.currency, e.date, e.created_at,
            e.fk_wallet_id, w.name
        FROM {table} e
        LEFT JOIN wallets w ON e.fk_wallet_id = w.id",
        table = kind.table()
    )
}

fn map_row(row: &Row) -> Result<Entry, rusqlite::Error> {
    Ok(Entry {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        currency: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        wallet_id: row.get(6)?,
        wallet_name: row.get(7)?,
    })
}

/// Check that `wallet_id` is either absent or a live wallet owned by the user.
fn check_wallet(
    wallet_id: Option<DatabaseId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(wallet_id) = wallet_id else {
        return Ok(());
    };

    let exists = connection
        .query_row(
            "SELECT 1 FROM wallets WHERE id = ?1 AND created_by = ?2 AND deleted_at IS NULL",
            (wallet_id, user_id.as_i64()),
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if exists {
        Ok(())
    } else {
        Err(Error::InvalidWallet(Some(wallet_id)))
    }
}

fn validate(
    form: &EntryForm,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<ValidEntry, Error> {
    let entry = form.validate(today)?;
    check_wallet(entry.wallet_id, user_id, connection)?;

    Ok(entry)
}

/// Record a new income or expense and its cashbook mirror.
///
/// `today` is the date used when the form does not give one.
///
/// # Errors
/// Returns:
/// - [Error::Validation] if a field of the form is invalid,
/// - [Error::InvalidWallet] if the wallet is not a live wallet of the user,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_entry(
    kind: EntryKind,
    form: &EntryForm,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Entry, Error> {
    let entry = validate(form, user_id, today, connection)?;
    let now = OffsetDateTime::now_utc();

    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        &format!(
            "INSERT INTO {table} (description, amount, currency, date, fk_wallet_id, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            table = kind.table()
        ),
        (
            &entry.description,
            entry.amount,
            entry.currency,
            entry.date,
            entry.wallet_id,
            user_id.as_i64(),
            now,
        ),
    )?;
    let id = transaction.last_insert_rowid();

    insert_mirror(kind, id, entry.amount, entry.date, user_id, now, &transaction)?;

    transaction.commit()?;

    get_entry(kind, id, user_id, connection)
}

/// Get a live income or expense of the user.
///
/// # Errors
/// Returns [Error::EntryNotFound] if the entry does not exist, is deleted or
/// belongs to another user.
pub fn get_entry(
    kind: EntryKind,
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Entry, Error> {
    connection
        .query_row(
            &format!(
                "{} WHERE e.id = ?1 AND e.created_by = ?2 AND e.deleted_at IS NULL",
                select_columns(kind)
            ),
            (id, user_id.as_i64()),
            map_row,
        )
        .optional()?
        .ok_or(Error::EntryNotFound(kind))
}

/// Get a page of the user's live entries, newest first.
///
/// When `search` is given, only entries whose description or wallet name
/// contains it are returned.
pub fn get_entries_page(
    kind: EntryKind,
    user_id: UserID,
    request: PageRequest,
    search: Option<&str>,
    connection: &Connection,
) -> Result<Paged<Entry>, Error> {
    let pattern = escape_like(search.unwrap_or_default());
    let filter = format!(
        "WHERE e.created_by = ?1 AND e.deleted_at IS NULL
        AND (e.description LIKE ?2 ESCAPE '{LIKE_ESCAPE}'
            OR COALESCE(w.name, '') LIKE ?2 ESCAPE '{LIKE_ESCAPE}')"
    );

    let data = connection
        .prepare(&format!(
            "{} {filter} ORDER BY e.date DESC, e.id DESC LIMIT ?3 OFFSET ?4",
            select_columns(kind)
        ))?
        .query_map(
            (
                user_id.as_i64(),
                &pattern,
                request.sql_limit(),
                request.sql_offset(),
            ),
            map_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total_items: i64 = connection.query_row(
        &format!(
            "SELECT COUNT(*) FROM {table} e LEFT JOIN wallets w ON e.fk_wallet_id = w.id {filter}",
            table = kind.table()
        ),
        (user_id.as_i64(), &pattern),
        |row| row.get(0),
    )?;

    Ok(Paged {
        data,
        pagination: Pagination::new(request, total_items as u64),
    })
}

/// Replace the fields of a live entry and copy the amount and date onto its
/// cashbook mirror.
///
/// # Errors
/// Returns the same validation errors as [create_entry], or
/// [Error::EntryNotFound] if there is no live entry with `id` for the user.
pub fn update_entry(
    kind: EntryKind,
    id: DatabaseId,
    form: &EntryForm,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Entry, Error> {
    let entry = validate(form, user_id, today, connection)?;
    let now = OffsetDateTime::now_utc();

    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction.execute(
        &format!(
            "UPDATE {table}
            SET description = ?1, amount = ?2, currency = ?3, date = ?4, fk_wallet_id = ?5,
                updated_at = ?6, updated_by = ?7
            WHERE id = ?8 AND created_by = ?7 AND deleted_at IS NULL",
            table = kind.table()
        ),
        (
            &entry.description,
            entry.amount,
            entry.currency,
            entry.date,
            entry.wallet_id,
            now,
            user_id.as_i64(),
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::EntryNotFound(kind));
    }

    let mirrors_updated =
        update_mirror(kind, id, entry.amount, entry.date, user_id, now, &transaction)?;
    if mirrors_updated == 0 {
        tracing::warn!("{kind} {id} had no live cashbook row, writing a new one.");
        insert_mirror(kind, id, entry.amount, entry.date, user_id, now, &transaction)?;
    }

    transaction.commit()?;

    get_entry(kind, id, user_id, connection)
}

/// Soft delete a live entry and its cashbook mirror.
///
/// # Errors
/// Returns [Error::DeleteMissingEntry] if there is no live entry with `id`
/// for the user.
pub fn delete_entry(
    kind: EntryKind,
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction.execute(
        &format!(
            "UPDATE {table} SET deleted_at = ?1, updated_at = ?1, updated_by = ?2
            WHERE id = ?3 AND created_by = ?2 AND deleted_at IS NULL",
            table = kind.table()
        ),
        (now, user_id.as_i64(), id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingEntry(kind));
    }

    delete_mirror(kind, id, user_id, now, &transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Undo the soft delete of an entry and its cashbook mirror.
///
/// # Errors
/// Returns [Error::RestoreMissingEntry] if there is no deleted entry with
/// `id` for the user.
pub fn restore_entry(
    kind: EntryKind,
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    let deleted: Option<(f64, Date)> = transaction
        .query_row(
            &format!(
                "SELECT amount, date FROM {table}
                WHERE id = ?1 AND created_by = ?2 AND deleted_at IS NOT NULL",
                table = kind.table()
            ),
            (id, user_id.as_i64()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((amount, date)) = deleted else {
        return Err(Error::RestoreMissingEntry(kind));
    };

    let mirrors_restored = restore_mirror(kind, id, user_id, now, &transaction)?;

    transaction.execute(
        &format!(
            "UPDATE {table} SET deleted_at = NULL, updated_at = ?1, updated_by = ?2
            WHERE id = ?3 AND created_by = ?2",
            table = kind.table()
        ),
        (now, user_id.as_i64(), id),
    )?;

    if mirrors_restored == 0 {
        tracing::warn!("{kind} {id} had no cashbook row to restore, writing a new one.");
        insert_mirror(kind, id, amount, date, user_id, now, &transaction)?;
    }

    transaction.commit()?;

    Ok(())
}
