//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/wallets/{wallet_id}', use [format_endpoint].

use std::fmt::Display;

/// The portfolio landing page.
pub const ROOT: &str = "/";
/// The page for a single article.
pub const ARTICLE_VIEW: &str = "/article/{slug}";
/// The page for a single project.
pub const PROJECT_VIEW: &str = "/project/{slug}";
/// The next cards of articles for the landing page, e.g. `?offset=9&limit=9`.
pub const MORE_ARTICLES: &str = "/articles/more";
/// The next cards of projects for the landing page, e.g. `?offset=9&limit=9`.
pub const MORE_PROJECTS: &str = "/projects/more";
/// The landing page for logged in admins.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the cashbook ledger.
pub const CASHBOOK_VIEW: &str = "/dashboard/cashbook";
/// The page listing wallets.
pub const WALLETS_VIEW: &str = "/dashboard/wallets";
/// The page for creating a wallet, which also takes the submitted form.
pub const NEW_WALLET_VIEW: &str = "/dashboard/wallets/new";
/// The page for renaming a wallet, which also takes the submitted form.
pub const EDIT_WALLET_VIEW: &str = "/dashboard/wallets/{wallet_id}/edit";
/// The page listing incomes.
pub const INCOMES_VIEW: &str = "/dashboard/incomes";
/// The page for recording an income, which also takes the submitted form.
pub const NEW_INCOME_VIEW: &str = "/dashboard/incomes/new";
/// The page for editing an income, which also takes the submitted form.
pub const EDIT_INCOME_VIEW: &str = "/dashboard/incomes/{entry_id}/edit";
/// The page listing expenses.
pub const EXPENSES_VIEW: &str = "/dashboard/expenses";
/// The page for recording an expense, which also takes the submitted form.
pub const NEW_EXPENSE_VIEW: &str = "/dashboard/expenses/new";
/// The page for editing an expense, which also takes the submitted form.
pub const EDIT_EXPENSE_VIEW: &str = "/dashboard/expenses/{entry_id}/edit";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in an admin.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current admin.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to list and create wallets.
pub const WALLETS: &str = "/api/wallets";
/// The route to get, update and delete a single wallet.
pub const WALLET: &str = "/api/wallets/{wallet_id}";
/// The route to list and create incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route to get, update and delete a single income.
pub const INCOME: &str = "/api/incomes/{entry_id}";
/// The route to restore a deleted income.
pub const RESTORE_INCOME: &str = "/api/incomes/{entry_id}/restore";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to get, update and delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{entry_id}";
/// The route to restore a deleted expense.
pub const RESTORE_EXPENSE: &str = "/api/expenses/{entry_id}/restore";
/// The route to list cashbook rows.
pub const CASHBOOK: &str = "/api/cashbook";
/// The route to check that the cashbook mirrors the incomes and expenses.
pub const CASHBOOK_RECONCILE: &str = "/api/cashbook/reconcile";
/// The route for the monthly dashboard summary.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// The route for reading runtime settings.
pub const CONFIG: &str = "/api/config";
/// The route to list and create articles.
pub const ARTICLES: &str = "/api/articles";
/// The route to get, update and delete a single article.
pub const ARTICLE: &str = "/api/articles/{slug}";
/// The legacy route to get an article by a `slug` query parameter.
pub const SELECT_ARTICLE: &str = "/api/select-article";
/// The route to list and create projects.
pub const PROJECTS: &str = "/api/projects";
/// The route to get, update and delete a single project.
pub const PROJECT: &str = "/api/projects/{slug}";
/// The legacy route to get a project by a `slug` query parameter.
pub const SELECT_PROJECT: &str = "/api/select-project";
/// The route to list and create contact messages.
pub const MESSAGES: &str = "/api/messages";
/// The route to count unseen contact messages.
pub const MESSAGES_COUNT: &str = "/api/messages/count";
/// The route to get, update and delete a single contact message.
pub const MESSAGE: &str = "/api/messages/{message_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/wallets/{wallet_id}', '{wallet_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
