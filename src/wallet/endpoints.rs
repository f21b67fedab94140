//! JSON route handlers for wallets.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::DbState,
    auth::UserID,
    database_id::DatabaseId,
    extract::JsonBody,
    wallet::{
        Wallet, WalletForm, create_wallet, delete_wallet, get_wallet, get_wallets, update_wallet,
    },
};

/// A route handler listing the user's live wallets ordered by name.
pub async fn get_wallets_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Wallet>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_wallets(user_id, &connection).map(Json)
}

/// A route handler for getting a single wallet.
pub async fn get_wallet_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(wallet_id): Path<DatabaseId>,
) -> Result<Json<Wallet>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_wallet(wallet_id, user_id, &connection).map(Json)
}

/// A route handler for creating a wallet, responds with 201 and the new wallet.
pub async fn create_wallet_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<WalletForm>,
) -> Result<(StatusCode, Json<Wallet>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallet = create_wallet(&form, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(wallet)))
}

/// A route handler for renaming a wallet.
///
/// Responds with 403 if the body names a different user to the one logged in.
pub async fn update_wallet_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(wallet_id): Path<DatabaseId>,
    JsonBody(form): JsonBody<WalletForm>,
) -> Result<Json<Wallet>, Error> {
    if form.claims_other_user(user_id) {
        tracing::warn!(
            "User {user_id} tried to update wallet {wallet_id} as user {:?}",
            form.user_id
        );
        return Err(Error::Forbidden);
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_wallet(wallet_id, &form, user_id, &connection).map(Json)
}

/// A route handler for soft deleting a wallet.
pub async fn delete_wallet_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(wallet_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_wallet(wallet_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": wallet_id,
            "message": "Wallet deleted successfully",
        },
    })))
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;

    use crate::{
        Error,
        app_state::DbState,
        auth::UserID,
        extract::JsonBody,
        test_utils::{get_test_connection, insert_test_admin, parse_json_body, shared},
        wallet::WalletForm,
    };

    use super::{
        create_wallet_endpoint, delete_wallet_endpoint, get_wallet_endpoint, get_wallets_endpoint,
        update_wallet_endpoint,
    };

    fn setup() -> (DbState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_admin("a@example.com", &connection);

        (
            DbState {
                db_connection: shared(connection),
            },
            user_id,
        )
    }

    fn form(name: &str) -> WalletForm {
        WalletForm {
            name: Some(name.to_owned()),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn create_responds_with_created_wallet() {
        let (state, user_id) = setup();

        let response = create_wallet_endpoint(State(state), Extension(user_id), JsonBody(form("Cash")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["name"], "Cash");
        assert!(body["id"].as_i64().is_some());
        assert!(body["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn create_with_blank_name_is_bad_request() {
        let (state, user_id) = setup();

        let response = create_wallet_endpoint(State(state), Extension(user_id), JsonBody(form(" ")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json_body(response).await;
        assert_eq!(body, json!({"error": "Wallet name is required"}));
    }

    #[tokio::test]
    async fn get_missing_wallet_is_not_found() {
        let (state, user_id) = setup();

        let response = get_wallet_endpoint(State(state), Extension(user_id), Path(99))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_as_other_user_is_forbidden() {
        let (state, user_id) = setup();
        let Json(wallet) =
            create_wallet_endpoint(State(state.clone()), Extension(user_id), JsonBody(form("Cash")))
                .await
                .unwrap()
                .1;
        let body = WalletForm {
            name: Some("Stolen".to_owned()),
            user_id: Some(json!(user_id.as_i64() + 1)),
        };

        let result =
            update_wallet_endpoint(State(state), Extension(user_id), Path(wallet.id), JsonBody(body))
                .await;

        assert_eq!(result.map(|Json(wallet)| wallet), Err(Error::Forbidden));
    }

    #[tokio::test]
    async fn update_with_own_user_id_succeeds() {
        let (state, user_id) = setup();
        let Json(wallet) =
            create_wallet_endpoint(State(state.clone()), Extension(user_id), JsonBody(form("Cash")))
                .await
                .unwrap()
                .1;
        let body = WalletForm {
            name: Some("Petty cash".to_owned()),
            user_id: Some(json!(user_id.to_string())),
        };

        let Json(updated) =
            update_wallet_endpoint(State(state), Extension(user_id), Path(wallet.id), JsonBody(body))
                .await
                .unwrap();

        assert_eq!(updated.name, "Petty cash");
    }

    #[tokio::test]
    async fn delete_responds_with_message_then_not_found() {
        let (state, user_id) = setup();
        let Json(wallet) =
            create_wallet_endpoint(State(state.clone()), Extension(user_id), JsonBody(form("Cash")))
                .await
                .unwrap()
                .1;

        let Json(body) =
            delete_wallet_endpoint(State(state.clone()), Extension(user_id), Path(wallet.id))
                .await
                .unwrap();

        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {"id": wallet.id, "message": "Wallet deleted successfully"},
            })
        );

        let response = delete_wallet_endpoint(State(state.clone()), Extension(user_id), Path(wallet.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let Json(wallets) = get_wallets_endpoint(State(state), Extension(user_id))
            .await
            .unwrap();
        assert!(wallets.is_empty());
    }
}
