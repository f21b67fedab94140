//! The dashboard pages for creating and renaming wallets.

use axum::{
    Extension, Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    auth::UserID,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        base, loading_spinner,
    },
    navigation::NavBar,
    sanitize::editable_text,
    wallet::{MAX_WALLET_NAME_LENGTH, Wallet, WalletForm, create_wallet, get_wallet, update_wallet},
};

fn wallet_form_view(heading: &str, submit_url: &str, name: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::WALLETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { (heading) }

                div id="form-alert" {}

                form
                    hx-post=(submit_url)
                    hx-target-error="#form-alert"
                    hx-indicator="#indicator"
                    hx-disabled-elt="find button"
                    class="space-y-4"
                {
                    div
                    {
                        label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                        input
                            type="text"
                            name="name"
                            id="name"
                            maxlength=(MAX_WALLET_NAME_LENGTH)
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(name);
                    }

                    button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" { (loading_spinner()) }
                        " Save"
                    }
                }
            }
        }
    };

    base(heading, &content)
}

/// Renders the page for creating a wallet.
pub async fn get_new_wallet_page() -> Response {
    Html(wallet_form_view("New wallet", endpoints::NEW_WALLET_VIEW, "").into_string())
        .into_response()
}

/// Renders the page for renaming a wallet.
pub async fn get_edit_wallet_page(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(wallet_id): Path<DatabaseId>,
) -> Response {
    let wallet = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_wallet(wallet_id, user_id, &connection));

    match wallet {
        Ok(wallet) => Html(
            wallet_form_view(
                "Rename wallet",
                &format_endpoint(endpoints::EDIT_WALLET_VIEW, wallet.id),
                &editable_text(&wallet.name),
            )
            .into_string(),
        )
        .into_response(),
        Err(error) => error.into_page_response(),
    }
}

fn saved_response(result: Result<Wallet, Error>) -> Response {
    match result {
        Ok(_) => (
            HxRedirect(endpoints::WALLETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// A route handler for the form on the new wallet page.
pub async fn create_wallet_form_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    form: Result<Form<WalletForm>, FormRejection>,
) -> Response {
    let result = form.map_err(Error::from).and_then(|Form(form)| {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_wallet(&form, user_id, &connection)
    });

    saved_response(result)
}

/// A route handler for the form on the rename wallet page.
pub async fn update_wallet_form_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(wallet_id): Path<DatabaseId>,
    form: Result<Form<WalletForm>, FormRejection>,
) -> Response {
    let result = form.map_err(Error::from).and_then(|Form(form)| {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        update_wallet(wallet_id, &form, user_id, &connection)
    });

    saved_response(result)
}
