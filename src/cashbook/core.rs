//! The cashbook table and the mirror rows written alongside incomes and expenses.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    ledger::EntryKind,
    pagination::{PageRequest, Paged, Pagination},
    timezone::date_format,
};

/// A row of the cashbook ledger.
///
/// Exactly one of `income_id` and `expense_id` is set, and only the matching
/// amount column is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashbookEntry {
    /// The ID of the cashbook row.
    pub id: DatabaseId,
    /// Money received.
    pub in_amount: f64,
    /// Money spent.
    pub out_amount: f64,
    /// The date of the originating entry.
    #[serde(with = "date_format")]
    pub date: Date,
    /// When the row was written.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The income this row mirrors.
    pub income_id: Option<DatabaseId>,
    /// The expense this row mirrors.
    pub expense_id: Option<DatabaseId>,
}

/// Create the cashbook table.
///
/// The incomes and expenses tables must exist first.
pub fn create_cashbook_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS cashbook (
            id INTEGER PRIMARY KEY,
            in_amount REAL NOT NULL DEFAULT 0,
            out_amount REAL NOT NULL DEFAULT 0,
            date TEXT NOT NULL,
            fk_income_id INTEGER REFERENCES incomes(id),
            fk_expense_id INTEGER REFERENCES expenses(id),
            created_by INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            updated_by INTEGER,
            deleted_at TEXT,
            CHECK ((fk_income_id IS NULL) <> (fk_expense_id IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_cashbook_income ON cashbook(fk_income_id);
        CREATE INDEX IF NOT EXISTS idx_cashbook_expense ON cashbook(fk_expense_id);
        CREATE INDEX IF NOT EXISTS idx_cashbook_user_date ON cashbook(created_by, date);",
    )?;

    Ok(())
}

/// Write the cashbook row mirroring a newly created entry.
///
/// Should run in the same transaction as the insert of the entry.
pub(crate) fn insert_mirror(
    kind: EntryKind,
    entry_id: DatabaseId,
    amount: f64,
    date: Date,
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let query = format!(
        "INSERT INTO cashbook ({amount_column}, {reference_column}, date, created_by, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        amount_column = kind.cashbook_amount_column(),
        reference_column = kind.cashbook_reference_column(),
    );

    connection.execute(&query, (amount, entry_id, date, user_id.as_i64(), now))?;

    Ok(())
}

/// Copy a new amount and date onto the live mirror of an entry.
///
/// Returns the number of rows changed.
pub(crate) fn update_mirror(
    kind: EntryKind,
    entry_id: DatabaseId,
    amount: f64,
    date: Date,
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let query = format!(
        "UPDATE cashbook
        SET {amount_column} = ?1, date = ?2, updated_at = ?3, updated_by = ?4
        WHERE {reference_column} = ?5 AND created_by = ?4 AND deleted_at IS NULL",
        amount_column = kind.cashbook_amount_column(),
        reference_column = kind.cashbook_reference_column(),
    );

    connection
        .execute(&query, (amount, date, now, user_id.as_i64(), entry_id))
        .map_err(Error::from)
}

/// Soft delete the live mirror of an entry.
pub(crate) fn delete_mirror(
    kind: EntryKind,
    entry_id: DatabaseId,
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let query = format!(
        "UPDATE cashbook
        SET deleted_at = ?1, updated_at = ?1, updated_by = ?2
        WHERE {reference_column} = ?3 AND created_by = ?2 AND deleted_at IS NULL",
        reference_column = kind.cashbook_reference_column(),
    );

    connection
        .execute(&query, (now, user_id.as_i64(), entry_id))
        .map_err(Error::from)
}

/// Clear the deletion mark on the mirror that was deleted along with its entry.
///
/// Only the row stamped with the entry's own `deleted_at` is restored, older
/// deleted mirrors stay deleted. Must run before the entry itself is restored.
pub(crate) fn restore_mirror(
    kind: EntryKind,
    entry_id: DatabaseId,
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let query = format!(
        "UPDATE cashbook
        SET deleted_at = NULL, updated_at = ?1, updated_by = ?2
        WHERE {reference_column} = ?3 AND created_by = ?2
            AND deleted_at = (SELECT deleted_at FROM {entry_table} WHERE id = ?3)",
        reference_column = kind.cashbook_reference_column(),
        entry_table = kind.table(),
    );

    connection
        .execute(&query, (now, user_id.as_i64(), entry_id))
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<CashbookEntry, rusqlite::Error> {
    Ok(CashbookEntry {
        id: row.get(0)?,
        in_amount: row.get(1)?,
        out_amount: row.get(2)?,
        date: row.get(3)?,
        created_at: row.get(4)?,
        income_id: row.get(5)?,
        expense_id: row.get(6)?,
    })
}

/// Get a page of the user's live cashbook rows, newest first.
pub fn get_cashbook_page(
    user_id: UserID,
    request: PageRequest,
    connection: &Connection,
) -> Result<Paged<CashbookEntry>, Error> {
    let data = connection
        .prepare(
            "SELECT id, in_amount, out_amount, date, created_at, fk_income_id, fk_expense_id
            FROM cashbook
            WHERE created_by = ?1 AND deleted_at IS NULL
            ORDER BY date DESC, id DESC
            LIMIT ?2 OFFSET ?3",
        )?
        .query_map(
            (
                user_id.as_i64(),
                request.sql_limit(),
                request.sql_offset(),
            ),
            map_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total_items: i64 = connection.query_row(
        "SELECT COUNT(*) FROM cashbook WHERE created_by = ?1 AND deleted_at IS NULL",
        (user_id.as_i64(),),
        |row| row.get(0),
    )?;

    Ok(Paged {
        data,
        pagination: Pagination::new(request, total_items as u64),
    })
}
