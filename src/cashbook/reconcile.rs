//! Checks that every income and expense has exactly one matching cashbook row.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{Error, auth::UserID, database_id::DatabaseId, ledger::EntryKind};

/// How an entry and its cashbook mirror disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    /// A live entry has no cashbook row at all.
    MissingMirror,
    /// A live entry has more than one live cashbook row.
    DuplicateMirror,
    /// The live cashbook row has a different amount to the entry.
    AmountMismatch,
    /// The live cashbook row has a different date to the entry.
    DateMismatch,
    /// One of the entry and its cashbook row is deleted and the other is not.
    DeletionMismatch,
}

/// A single inconsistency between an entry and the cashbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileIssue {
    /// Whether the entry is an income or an expense.
    pub kind: EntryKind,
    /// The ID of the entry within its table.
    pub entry_id: DatabaseId,
    /// What is wrong.
    pub problem: Problem,
}

/// The result of checking the cashbook against the incomes and expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Whether no issues were found.
    pub consistent: bool,
    /// The issues found, incomes first, in entry ID order.
    pub issues: Vec<ReconcileIssue>,
}

struct MirrorSummary {
    entry_id: DatabaseId,
    amount: f64,
    date: Date,
    entry_deleted: bool,
    live_mirrors: i64,
    all_mirrors: i64,
    mirror_amount: Option<f64>,
    mirror_date: Option<Date>,
}

impl MirrorSummary {
    fn problems(&self) -> Vec<Problem> {
        if self.entry_deleted {
            return if self.live_mirrors > 0 {
                vec![Problem::DeletionMismatch]
            } else {
                Vec::new()
            };
        }

        match self.live_mirrors {
            0 if self.all_mirrors == 0 => vec![Problem::MissingMirror],
            0 => vec![Problem::DeletionMismatch],
            1 => {
                let mut problems = Vec::new();

                if self
                    .mirror_amount
                    .is_none_or(|amount| (amount - self.amount).abs() > 1e-9)
                {
                    problems.push(Problem::AmountMismatch);
                }

                if self.mirror_date != Some(self.date) {
                    problems.push(Problem::DateMismatch);
                }

                problems
            }
            _ => vec![Problem::DuplicateMirror],
        }
    }
}

fn summarise(
    kind: EntryKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<MirrorSummary>, Error> {
    let query = format!(
        "SELECT e.id, e.amount, e.date, e.deleted_at IS NOT NULL,
            (SELECT COUNT(*) FROM cashbook c
                WHERE c.{reference} = e.id AND c.deleted_at IS NULL),
            (SELECT COUNT(*) FROM cashbook c WHERE c.{reference} = e.id),
            (SELECT c.{amount} FROM cashbook c
                WHERE c.{reference} = e.id AND c.deleted_at IS NULL ORDER BY c.id LIMIT 1),
            (SELECT c.date FROM cashbook c
                WHERE c.{reference} = e.id AND c.deleted_at IS NULL ORDER BY c.id LIMIT 1)
        FROM {table} e
        WHERE e.created_by = ?1
        ORDER BY e.id",
        table = kind.table(),
        reference = kind.cashbook_reference_column(),
        amount = kind.cashbook_amount_column(),
    );

    connection
        .prepare(&query)?
        .query_map((user_id.as_i64(),), |row| {
            Ok(MirrorSummary {
                entry_id: row.get(0)?,
                amount: row.get(1)?,
                date: row.get(2)?,
                entry_deleted: row.get(3)?,
                live_mirrors: row.get(4)?,
                all_mirrors: row.get(5)?,
                mirror_amount: row.get(6)?,
                mirror_date: row.get(7)?,
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

/// Compare the user's incomes and expenses, deleted ones included, with their
/// cashbook rows.
pub fn reconcile_cashbook(
    user_id: UserID,
    connection: &Connection,
) -> Result<ReconcileReport, Error> {
    let mut issues = Vec::new();

    for kind in [EntryKind::Income, EntryKind::Expense] {
        for summary in summarise(kind, user_id, connection)? {
            issues.extend(summary.problems().into_iter().map(|problem| ReconcileIssue {
                kind,
                entry_id: summary.entry_id,
                problem,
            }));
        }
    }

    if !issues.is_empty() {
        tracing::warn!(
            "Found {} cashbook inconsistencies for user {user_id}",
            issues.len()
        );
    }

    Ok(ReconcileReport {
        consistent: issues.is_empty(),
        issues,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        auth::UserID,
        ledger::{EntryForm, EntryKind, create_entry, delete_entry},
        test_utils::{get_test_connection, insert_test_admin},
    };

    use super::{Problem, ReconcileIssue, reconcile_cashbook};

    fn setup() -> (Connection, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);

        (connection, user_id)
    }

    fn create(kind: EntryKind, user_id: UserID, connection: &Connection) -> i64 {
        let form = EntryForm {
            description: Some("Something".to_owned()),
            amount: Some(20.0),
            currency: Some("GBP".to_owned()),
            wallet_id: None,
            date: Some(date!(2025 - 05 - 04)),
        };

        create_entry(kind, &form, user_id, date!(2025 - 05 - 04), connection)
            .unwrap()
            .id
    }

    fn issue(kind: EntryKind, entry_id: i64, problem: Problem) -> ReconcileIssue {
        ReconcileIssue {
            kind,
            entry_id,
            problem,
        }
    }

    #[test]
    fn entries_written_through_the_ledger_are_consistent() {
        let (connection, user_id) = setup();
        create(EntryKind::Income, user_id, &connection);
        let expense = create(EntryKind::Expense, user_id, &connection);
        delete_entry(EntryKind::Expense, expense, user_id, &connection).unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert!(report.consistent);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn finds_missing_mirror() {
        let (connection, user_id) = setup();
        let income = create(EntryKind::Income, user_id, &connection);
        connection
            .execute("DELETE FROM cashbook WHERE fk_income_id = ?1", (income,))
            .unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert!(!report.consistent);
        assert_eq!(
            report.issues,
            [issue(EntryKind::Income, income, Problem::MissingMirror)]
        );
    }

    #[test]
    fn finds_amount_and_date_mismatch() {
        let (connection, user_id) = setup();
        let expense = create(EntryKind::Expense, user_id, &connection);
        connection
            .execute(
                "UPDATE cashbook SET out_amount = 21, date = '2025-05-05' WHERE fk_expense_id = ?1",
                (expense,),
            )
            .unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert_eq!(
            report.issues,
            [
                issue(EntryKind::Expense, expense, Problem::AmountMismatch),
                issue(EntryKind::Expense, expense, Problem::DateMismatch),
            ]
        );
    }

    #[test]
    fn finds_duplicate_mirror() {
        let (connection, user_id) = setup();
        let income = create(EntryKind::Income, user_id, &connection);
        connection
            .execute(
                "INSERT INTO cashbook (in_amount, fk_income_id, date, created_by, created_at)
                SELECT in_amount, fk_income_id, date, created_by, created_at
                FROM cashbook WHERE fk_income_id = ?1",
                (income,),
            )
            .unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert_eq!(
            report.issues,
            [issue(EntryKind::Income, income, Problem::DuplicateMirror)]
        );
    }

    #[test]
    fn finds_deletion_mismatch_both_ways() {
        let (connection, user_id) = setup();
        let income = create(EntryKind::Income, user_id, &connection);
        let expense = create(EntryKind::Expense, user_id, &connection);
        connection
            .execute(
                "UPDATE cashbook SET deleted_at = '2025-05-05T00:00:00Z' WHERE fk_income_id = ?1",
                (income,),
            )
            .unwrap();
        connection
            .execute(
                "UPDATE expenses SET deleted_at = '2025-05-05T00:00:00Z' WHERE id = ?1",
                (expense,),
            )
            .unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert_eq!(
            report.issues,
            [
                issue(EntryKind::Income, income, Problem::DeletionMismatch),
                issue(EntryKind::Expense, expense, Problem::DeletionMismatch),
            ]
        );
    }

    #[test]
    fn report_serializes_with_snake_case_problems() {
        let (connection, user_id) = setup();
        let income = create(EntryKind::Income, user_id, &connection);
        connection
            .execute("DELETE FROM cashbook WHERE fk_income_id = ?1", (income,))
            .unwrap();

        let report = reconcile_cashbook(user_id, &connection).unwrap();

        assert_eq!(
            serde_json::to_value(report).unwrap(),
            json!({
                "consistent": false,
                "issues": [{"kind": "income", "entry_id": income, "problem": "missing_mirror"}],
            })
        );
    }
}
