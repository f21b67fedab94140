//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, SettingDefaults,
    auth::UserID,
    config::get_default_currency,
    dashboard::{
        aggregation::{DashboardSummary, get_dashboard_summary},
        cards::{totals_view, wallet_table},
    },
    endpoints,
    html::{FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base},
    ledger::Currency,
    navigation::NavBar,
    timezone::{YearMonth, local_today},
};

/// The state needed for the dashboard summary and page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    /// Fallbacks for settings missing from the database.
    pub setting_defaults: SettingDefaults,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            setting_defaults: state.setting_defaults.clone(),
        }
    }
}

/// The query string of a dashboard request, e.g. `?month=2025-02`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The month to summarise, defaults to the current month.
    pub month: Option<String>,
}

impl DashboardQuery {
    fn resolve_month(&self, local_timezone: &str) -> Result<YearMonth, Error> {
        match self.month.as_deref().map(str::trim) {
            Some(month) if !month.is_empty() => YearMonth::parse(month),
            _ => local_today(local_timezone).map(YearMonth::containing),
        }
    }
}

/// A route handler for the monthly totals of the user's cashbook and entries.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, Error> {
    let month = query.resolve_month(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_dashboard_summary(user_id, month, &connection).map(Json)
}

fn dashboard_view(month: YearMonth, summary: &DashboardSummary, symbol: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let expenses: Vec<_> = summary
        .wallet_expenses
        .iter()
        .map(|row| (row.wallet_name.as_deref(), row.total_expense))
        .collect();
    let incomes: Vec<_> = summary
        .wallet_incomes
        .iter()
        .map(|row| (row.wallet_name.as_deref(), row.total_income))
        .collect();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Summary for " (month) }

                    form method="get" action=(endpoints::DASHBOARD_VIEW) class="flex gap-2"
                    {
                        input
                            type="month"
                            name="month"
                            aria-label="Month"
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(month);
                        button type="submit" class="px-4 py-2 bg-blue-500 text-white rounded" { "Show" }
                    }
                }

                (totals_view(summary, symbol))

                div class="grid grid-cols-1 gap-6 lg:grid-cols-2"
                {
                    (wallet_table("Expenses by wallet", &expenses, symbol))
                    (wallet_table("Incomes by wallet", &incomes, symbol))
                }
            }
        }
    );

    base("Dashboard", &content)
}

/// Display the month summary for the logged in user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let result = query
        .resolve_month(&state.local_timezone)
        .and_then(|month| {
            let connection = state
                .db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            let summary = get_dashboard_summary(user_id, month, &connection)?;
            let currency = get_default_currency(&state.setting_defaults, &connection)?
                .parse::<Currency>()
                .unwrap_or(state.setting_defaults.default_currency);

            Ok((month, summary, currency))
        });

    match result {
        Ok((month, summary, currency)) => {
            Html(dashboard_view(month, &summary, currency.symbol()).into_string()).into_response()
        }
        Err(error) => error.into_page_response(),
    }
}
