//! Monthly totals for the dashboard.
//!
//! Amounts are summed as stored, without converting between currencies.

use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, auth::UserID, ledger::EntryKind, timezone::YearMonth};

/// The money spent from one wallet in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletExpense {
    /// The wallet name, `None` for expenses without a wallet.
    pub wallet_name: Option<String>,
    /// The sum of the expenses.
    pub total_expense: f64,
}

/// The money received into one wallet in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletIncome {
    /// The wallet name, `None` for incomes without a wallet.
    pub wallet_name: Option<String>,
    /// The sum of the incomes.
    pub total_income: f64,
}

/// The totals shown on the dashboard for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Money in according to the cashbook.
    #[serde(rename = "in")]
    pub total_in: f64,
    /// Money out according to the cashbook.
    #[serde(rename = "out")]
    pub total_out: f64,
    /// Expenses grouped by wallet, largest first.
    #[serde(rename = "walletExpenses")]
    pub wallet_expenses: Vec<WalletExpense>,
    /// Incomes grouped by wallet, largest first.
    #[serde(rename = "walletIncomes")]
    pub wallet_incomes: Vec<WalletIncome>,
}

impl DashboardSummary {
    /// Money in minus money out.
    pub fn net(&self) -> f64 {
        self.total_in - self.total_out
    }
}

fn wallet_totals(
    kind: EntryKind,
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<(Option<String>, f64)>, Error> {
    let query = format!(
        "SELECT w.name, SUM(e.amount) AS total
        FROM {table} e
        LEFT JOIN wallets w ON e.fk_wallet_id = w.id
        WHERE e.created_by = ?1 AND e.deleted_at IS NULL AND e.date BETWEEN ?2 AND ?3
        GROUP BY w.name
        ORDER BY total DESC, w.name ASC",
        table = kind.table()
    );

    connection
        .prepare(&query)?
        .query_map(
            (user_id.as_i64(), month.first_day(), month.last_day()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Sum the user's live cashbook rows and entries dated within `month`.
pub fn get_dashboard_summary(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let (total_in, total_out) = connection.query_row(
        "SELECT COALESCE(SUM(in_amount), 0), COALESCE(SUM(out_amount), 0)
        FROM cashbook
        WHERE created_by = ?1 AND deleted_at IS NULL AND date BETWEEN ?2 AND ?3",
        (user_id.as_i64(), month.first_day(), month.last_day()),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let wallet_expenses = wallet_totals(EntryKind::Expense, user_id, month, connection)?
        .into_iter()
        .map(|(wallet_name, total_expense)| WalletExpense {
            wallet_name,
            total_expense,
        })
        .collect();

    let wallet_incomes = wallet_totals(EntryKind::Income, user_id, month, connection)?
        .into_iter()
        .map(|(wallet_name, total_income)| WalletIncome {
            wallet_name,
            total_income,
        })
        .collect();

    Ok(DashboardSummary {
        total_in,
        total_out,
        wallet_expenses,
        wallet_incomes,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;
    use time::{Date, macros::date};

    use crate::{
        auth::UserID,
        ledger::{EntryForm, EntryKind, create_entry, delete_entry},
        test_utils::{get_test_connection, insert_test_admin},
        timezone::YearMonth,
        wallet::{WalletForm, create_wallet},
    };

    use super::{WalletExpense, get_dashboard_summary};

    fn add(
        kind: EntryKind,
        amount: f64,
        date: Date,
        wallet_id: Option<i64>,
        user_id: UserID,
        connection: &Connection,
    ) -> i64 {
        let form = EntryForm {
            description: Some("Thing".to_owned()),
            amount: Some(amount),
            currency: Some("GBP".to_owned()),
            wallet_id,
            date: Some(date),
        };

        create_entry(kind, &form, user_id, date, connection)
            .unwrap()
            .id
    }

    fn wallet(name: &str, user_id: UserID, connection: &Connection) -> i64 {
        let form = WalletForm {
            name: Some(name.to_owned()),
            user_id: None,
        };

        create_wallet(&form, user_id, connection).unwrap().id
    }

    #[test]
    fn empty_month_is_all_zero() {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);

        let summary =
            get_dashboard_summary(user_id, YearMonth::parse("2025-01").unwrap(), &connection)
                .unwrap();

        assert_eq!(summary.total_in, 0.0);
        assert_eq!(summary.total_out, 0.0);
        assert!(summary.wallet_expenses.is_empty());
        assert!(summary.wallet_incomes.is_empty());
    }

    #[test]
    fn sums_only_live_entries_in_month() {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);
        let cash = wallet("Cash", user_id, &connection);
        let card = wallet("Card", user_id, &connection);
        add(EntryKind::Income, 1000.0, date!(2025 - 02 - 01), Some(card), user_id, &connection);
        add(EntryKind::Expense, 20.0, date!(2025 - 02 - 03), Some(cash), user_id, &connection);
        add(EntryKind::Expense, 30.0, date!(2025 - 02 - 28), Some(cash), user_id, &connection);
        add(EntryKind::Expense, 400.0, date!(2025 - 02 - 10), Some(card), user_id, &connection);
        add(EntryKind::Expense, 5.0, date!(2025 - 02 - 11), None, user_id, &connection);
        // Outside the month.
        add(EntryKind::Expense, 99.0, date!(2025 - 03 - 01), Some(cash), user_id, &connection);
        add(EntryKind::Expense, 99.0, date!(2025 - 01 - 31), Some(cash), user_id, &connection);
        let deleted =
            add(EntryKind::Expense, 77.0, date!(2025 - 02 - 15), Some(cash), user_id, &connection);
        delete_entry(EntryKind::Expense, deleted, user_id, &connection).unwrap();

        let summary =
            get_dashboard_summary(user_id, YearMonth::parse("2025-02").unwrap(), &connection)
                .unwrap();

        assert_eq!(summary.total_in, 1000.0);
        assert_eq!(summary.total_out, 455.0);
        assert_eq!(summary.net(), 545.0);
        assert_eq!(
            summary.wallet_expenses,
            [
                WalletExpense {
                    wallet_name: Some("Card".to_owned()),
                    total_expense: 400.0
                },
                WalletExpense {
                    wallet_name: Some("Cash".to_owned()),
                    total_expense: 50.0
                },
                WalletExpense {
                    wallet_name: None,
                    total_expense: 5.0
                },
            ]
        );
        assert_eq!(summary.wallet_incomes.len(), 1);
        assert_eq!(summary.wallet_incomes[0].total_income, 1000.0);
    }

    #[test]
    fn wallets_with_the_same_name_share_a_row() {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);
        let old_cash = wallet("Cash", user_id, &connection);
        let new_cash = wallet("Cash", user_id, &connection);
        add(EntryKind::Expense, 20.0, date!(2025 - 02 - 03), Some(old_cash), user_id, &connection);
        add(EntryKind::Expense, 30.0, date!(2025 - 02 - 04), Some(new_cash), user_id, &connection);

        let summary =
            get_dashboard_summary(user_id, YearMonth::parse("2025-02").unwrap(), &connection)
                .unwrap();

        assert_eq!(
            summary.wallet_expenses,
            [WalletExpense {
                wallet_name: Some("Cash".to_owned()),
                total_expense: 50.0
            }]
        );
    }

    #[test]
    fn other_users_are_excluded() {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);
        let other_user = insert_test_admin("b@example.com", &connection);
        add(EntryKind::Income, 10.0, date!(2025 - 02 - 01), None, other_user, &connection);

        let summary =
            get_dashboard_summary(user_id, YearMonth::parse("2025-02").unwrap(), &connection)
                .unwrap();

        assert_eq!(summary.total_in, 0.0);
        assert!(summary.wallet_incomes.is_empty());
    }

    #[test]
    fn serializes_with_expected_keys() {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);
        add(EntryKind::Income, 10.0, date!(2025 - 02 - 01), None, user_id, &connection);

        let summary =
            get_dashboard_summary(user_id, YearMonth::parse("2025-02").unwrap(), &connection)
                .unwrap();

        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            json!({
                "in": 10.0,
                "out": 0.0,
                "walletExpenses": [],
                "walletIncomes": [{"wallet_name": null, "total_income": 10.0}],
            })
        );
    }
}
