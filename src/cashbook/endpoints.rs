//! JSON route handlers for the cashbook.

use axum::{Extension, Json, extract::State};
use axum_extra::extract::Query;

use crate::{
    Error,
    app_state::{DbState, ListState},
    auth::UserID,
    cashbook::{CashbookEntry, ReconcileReport, get_cashbook_page, reconcile_cashbook},
    config::get_paginate_rows,
    pagination::{PageQuery, PageRequest, Paged},
};

/// A route handler for a page of the user's live cashbook rows, newest first.
pub async fn get_cashbook_endpoint(
    State(state): State<ListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<CashbookEntry>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let default_page_size = get_paginate_rows(&state.setting_defaults, &connection)?;
    let request = PageRequest::new(&query, default_page_size, &state.pagination_config);

    get_cashbook_page(user_id, request, &connection).map(Json)
}

/// A route handler that checks the cashbook against the user's incomes and expenses.
pub async fn get_reconcile_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<ReconcileReport>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    reconcile_cashbook(user_id, &connection).map(Json)
}
