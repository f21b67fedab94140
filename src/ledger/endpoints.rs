//! JSON route handlers shared by incomes and expenses.
//!
//! The router mounts these handlers once per [EntryKind] and supplies the
//! kind through a request extension.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::ListState,
    auth::UserID,
    config::get_paginate_rows,
    database_id::DatabaseId,
    extract::JsonBody,
    ledger::{
        Entry, EntryForm, EntryKind, create_entry, delete_entry, get_entries_page, get_entry,
        restore_entry, update_entry,
    },
    pagination::{PageQuery, PageRequest, Paged},
    timezone::local_today,
};

/// A route handler for a page of the user's live entries, newest first.
pub async fn get_entries_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<Entry>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let default_page_size = get_paginate_rows(&state.setting_defaults, &connection)?;
    let request = PageRequest::new(&query, default_page_size, &state.pagination_config);

    get_entries_page(kind, user_id, request, query.search_term(), &connection).map(Json)
}

/// A route handler for getting a single live entry.
pub async fn get_entry_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
) -> Result<Json<Entry>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_entry(kind, entry_id, user_id, &connection).map(Json)
}

/// A route handler for recording an entry, responds with 201 and the new entry.
pub async fn create_entry_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<EntryForm>,
) -> Result<(StatusCode, Json<Entry>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = create_entry(kind, &form, user_id, today, &connection)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// A route handler for replacing the fields of an entry.
pub async fn update_entry_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
    JsonBody(form): JsonBody<EntryForm>,
) -> Result<Json<Entry>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_entry(kind, entry_id, &form, user_id, today, &connection).map(Json)
}

/// A route handler for soft deleting an entry.
pub async fn delete_entry_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_entry(kind, entry_id, user_id, &connection)?;

    Ok(Json(json!({ "success": true })))
}

/// A route handler for undoing the soft delete of an entry.
pub async fn restore_entry_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    restore_entry(kind, entry_id, user_id, &connection)?;

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Query;
    use serde_json::json;

    use crate::{
        PaginationConfig, SettingDefaults,
        app_state::ListState,
        auth::UserID,
        config::set_setting,
        extract::JsonBody,
        ledger::{EntryForm, EntryKind},
        pagination::PageQuery,
        test_utils::{get_test_connection, insert_test_admin, parse_json_body, shared},
    };

    use super::{
        create_entry_endpoint, delete_entry_endpoint, get_entries_endpoint, get_entry_endpoint,
        restore_entry_endpoint, update_entry_endpoint,
    };

    fn setup() -> (ListState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);

        (
            ListState {
                db_connection: shared(connection),
                pagination_config: PaginationConfig::default(),
                setting_defaults: SettingDefaults::default(),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    fn form(body: serde_json::Value) -> EntryForm {
        serde_json::from_value(body).unwrap()
    }

    async fn create(
        state: &ListState,
        kind: EntryKind,
        user_id: UserID,
        body: serde_json::Value,
    ) -> crate::ledger::Entry {
        let (_, Json(entry)) = create_entry_endpoint(
            State(state.clone()),
            Extension(kind),
            Extension(user_id),
            JsonBody(form(body)),
        )
        .await
        .unwrap();

        entry
    }

    #[tokio::test]
    async fn create_responds_with_created_entry() {
        let (state, user_id) = setup();

        let response = create_entry_endpoint(
            State(state),
            Extension(EntryKind::Income),
            Extension(user_id),
            JsonBody(form(json!({
                "description": "Salary",
                "amount": 1200.5,
                "currency": "USD",
                "date": "2025-03-01",
            }))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["description"], "Salary");
        assert_eq!(body["amount"], 1200.5);
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["date"], "2025-03-01");
        assert_eq!(body["wallet_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn create_rejects_unknown_wallet() {
        let (state, user_id) = setup();

        let response = create_entry_endpoint(
            State(state),
            Extension(EntryKind::Expense),
            Extension(user_id),
            JsonBody(form(json!({
                "description": "Rent",
                "amount": 500,
                "currency": "GBP",
                "walletId": 42,
            }))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_missing_description() {
        let (state, user_id) = setup();

        let response = create_entry_endpoint(
            State(state),
            Extension(EntryKind::Expense),
            Extension(user_id),
            JsonBody(form(json!({"amount": 5, "currency": "GBP"}))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json_body(response).await;
        assert_eq!(body, json!({"error": "Description is required"}));
    }

    #[tokio::test]
    async fn list_uses_paginate_rows_setting() {
        let (state, user_id) = setup();
        for day in 1..=3 {
            create(
                &state,
                EntryKind::Expense,
                user_id,
                json!({
                    "description": format!("Coffee {day}"),
                    "amount": 3.5,
                    "currency": "GBP",
                    "date": format!("2025-01-0{day}"),
                }),
            )
            .await;
        }
        set_setting(
            "paginate_rows",
            "2",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let Json(page) = get_entries_endpoint(
            State(state),
            Extension(EntryKind::Expense),
            Extension(user_id),
            Query(PageQuery::default()),
        )
        .await
        .unwrap();

        let descriptions: Vec<_> = page.data.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["Coffee 3", "Coffee 2"]);
        assert_eq!(page.pagination.page_size, 2);
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn list_filters_by_search() {
        let (state, user_id) = setup();
        for description in ["Groceries", "Rent", "More groceries"] {
            create(
                &state,
                EntryKind::Expense,
                user_id,
                json!({"description": description, "amount": 10, "currency": "GBP"}),
            )
            .await;
        }

        let Json(page) = get_entries_endpoint(
            State(state),
            Extension(EntryKind::Expense),
            Extension(user_id),
            Query(PageQuery {
                search: Some("grocer".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(page.pagination.total_items, 2);
        assert!(
            page.data
                .iter()
                .all(|entry| entry.description.to_lowercase().contains("groceries"))
        );
    }

    #[tokio::test]
    async fn incomes_and_expenses_are_separate() {
        let (state, user_id) = setup();
        let income = create(
            &state,
            EntryKind::Income,
            user_id,
            json!({"description": "Salary", "amount": 100, "currency": "GBP"}),
        )
        .await;

        let result = get_entry_endpoint(
            State(state),
            Extension(EntryKind::Expense),
            Extension(user_id),
            Path(income.id),
        )
        .await;

        assert_eq!(
            result.map(|Json(entry)| entry),
            Err(crate::Error::EntryNotFound(EntryKind::Expense))
        );
    }

    #[tokio::test]
    async fn update_changes_fields() {
        let (state, user_id) = setup();
        let entry = create(
            &state,
            EntryKind::Income,
            user_id,
            json!({"description": "Salary", "amount": 100, "currency": "GBP", "date": "2025-01-01"}),
        )
        .await;

        let Json(updated) = update_entry_endpoint(
            State(state),
            Extension(EntryKind::Income),
            Extension(user_id),
            Path(entry.id),
            JsonBody(form(json!({
                "description": "Bonus",
                "amount": 250,
                "currency": "BDT",
                "date": "2025-01-15",
            }))),
        )
        .await
        .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.description, "Bonus");
        assert_eq!(updated.amount, 250.0);
        assert_eq!(updated.currency.code(), "BDT");
        assert_eq!(updated.date.to_string(), "2025-01-15");
    }

    #[tokio::test]
    async fn delete_then_restore() {
        let (state, user_id) = setup();
        let entry = create(
            &state,
            EntryKind::Expense,
            user_id,
            json!({"description": "Rent", "amount": 500, "currency": "GBP"}),
        )
        .await;
        let call_delete = || {
            delete_entry_endpoint(
                State(state.clone()),
                Extension(EntryKind::Expense),
                Extension(user_id),
                Path(entry.id),
            )
        };
        let call_restore = || {
            restore_entry_endpoint(
                State(state.clone()),
                Extension(EntryKind::Expense),
                Extension(user_id),
                Path(entry.id),
            )
        };

        let Json(body) = call_delete().await.unwrap();
        assert_eq!(body, json!({"success": true}));
        assert_eq!(
            call_delete().await.into_response().status(),
            StatusCode::NOT_FOUND
        );

        let Json(body) = call_restore().await.unwrap();
        assert_eq!(body, json!({"success": true}));
        assert_eq!(
            call_restore().await.into_response().status(),
            StatusCode::NOT_FOUND
        );

        let Json(restored) = get_entry_endpoint(
            State(state.clone()),
            Extension(EntryKind::Expense),
            Extension(user_id),
            Path(entry.id),
        )
        .await
        .unwrap();
        assert_eq!(restored.description, "Rent");
    }
}
