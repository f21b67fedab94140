//! Folio is a personal portfolio site bundled with an admin dashboard for
//! tracking personal finances (wallets, incomes, expenses and a cashbook
//! ledger) and managing simple content (articles, projects and contact
//! messages).
//!
//! This library provides a JSON API for the dashboard and content, plus a
//! handful of server-rendered HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod cashbook;
mod config;
mod content;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod html;
mod internal_server_error;
mod ledger;
mod logging;
mod message;
mod navigation;
mod not_found;
mod pagination;
mod portfolio;
mod routing;
mod sanitize;
mod tag;
mod timezone;
mod wallet;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, SettingDefaults};
pub use auth::{
    Admin, NewAdmin, PasswordHash, UserID, ValidatedPassword, count_admins, create_admin,
};
pub use content::{ContentForm, ContentKind, create_content};
pub use db::initialize as initialize_db;
pub use ledger::{Currency, EntryForm, EntryKind, create_entry};
pub use logging::logging_middleware;
pub use message::{MessageForm, create_message};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use wallet::{WalletForm, create_wallet};

use crate::{
    html::form_alert, internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The e-mail and password combination did not match a registered admin.
    #[error("incorrect e-mail or password")]
    InvalidCredentials,

    /// The request did not carry a valid auth cookie.
    #[error("Unauthorized")]
    Unauthorized,

    /// The session user tried to act on behalf of another user.
    #[error("Unauthorized action")]
    Forbidden,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Client input failed validation, the string explains which field and why.
    #[error("{0}")]
    Validation(String),

    /// The request body could not be parsed.
    #[error("{0}")]
    InvalidBody(String),

    /// The wallet ID used to create or update an entry did not match a live
    /// wallet owned by the user.
    #[error("the wallet ID {0:?} does not refer to a valid wallet")]
    InvalidWallet(Option<database_id::DatabaseId>),

    /// A month query parameter was not in the `YYYY-MM` format.
    #[error("invalid month \"{0}\", expected the format YYYY-MM")]
    InvalidMonth(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The wallet does not exist, belongs to another user or has been deleted.
    #[error("Wallet not found")]
    WalletNotFound,

    /// Tried to delete a wallet that does not exist or is already deleted.
    #[error("Wallet not found or already deleted")]
    DeleteMissingWallet,

    /// The income or expense does not exist, belongs to another user or has
    /// been deleted.
    #[error("{0} not found")]
    EntryNotFound(ledger::EntryKind),

    /// Tried to delete an income or expense that does not exist or is already
    /// deleted.
    #[error("{0} not found or already deleted")]
    DeleteMissingEntry(ledger::EntryKind),

    /// Tried to restore an income or expense that does not exist or is not
    /// deleted.
    #[error("{0} not found or not deleted")]
    RestoreMissingEntry(ledger::EntryKind),

    /// No article has the requested slug.
    #[error("Article not found")]
    ArticleNotFound,

    /// No project has the requested slug.
    #[error("Project not found")]
    ProjectNotFound,

    /// No message has the requested ID.
    #[error("Message not found")]
    MessageNotFound,

    /// The slug derived from a title or name is already taken.
    #[error("the slug \"{0}\" is already in use")]
    DuplicateSlug(String),

    /// The e-mail address is already registered to an admin.
    #[error("the e-mail address is already registered")]
    DuplicateEmail,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized | Error::CookieMissing => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::TooWeak(_)
            | Error::Validation(_)
            | Error::InvalidBody(_)
            | Error::InvalidWallet(_)
            | Error::InvalidMonth(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::WalletNotFound
            | Error::DeleteMissingWallet
            | Error::EntryNotFound(_)
            | Error::DeleteMissingEntry(_)
            | Error::RestoreMissingEntry(_)
            | Error::ArticleNotFound
            | Error::ProjectNotFound
            | Error::MessageNotFound => StatusCode::NOT_FOUND,
            Error::DuplicateSlug(_) | Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::JSONSerializationError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a full HTML page for the server-rendered views.
    pub(crate) fn into_page_response(self) -> Response {
        match self.status_code() {
            StatusCode::NOT_FOUND => get_404_not_found_response(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", self);
                render_internal_server_error(Default::default())
            }
            status => {
                let message = self.to_string();
                render_internal_server_error(internal_server_error::InternalServerErrorPage {
                    status,
                    description: "Something went wrong",
                    fix: &message,
                })
            }
        }
    }

    /// Render the error as an alert for the htmx forms on the dashboard.
    pub(crate) fn into_alert_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        (status, Html(form_alert(&message).into_string())).into_response()
    }

    fn client_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use scraper::Selector;

    use crate::{
        Error,
        ledger::EntryKind,
        test_utils::{parse_html_fragment, parse_json_body},
    };

    #[tokio::test]
    async fn validation_error_is_bad_request_with_message() {
        let response = Error::Validation("Description is required".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_json_body(response).await;
        assert_eq!(body["error"], "Description is required");
    }

    #[tokio::test]
    async fn entry_errors_name_the_kind() {
        let response = Error::DeleteMissingEntry(EntryKind::Expense).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = parse_json_body(response).await;
        assert_eq!(body["error"], "Expense not found or already deleted");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = Error::HashingError("secret detail".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = parse_json_body(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("secret detail"), "got {message}");
    }

    #[tokio::test]
    async fn alerts_are_html_with_the_error_status() {
        let response = Error::Validation("Wallet name is required".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let alert: String = html
            .select(&Selector::parse("p[role=alert]").unwrap())
            .flat_map(|alert| alert.text())
            .collect();
        assert_eq!(alert.trim(), "Wallet name is required");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        let error: Error = connection
            .query_row("SELECT 1 WHERE 0", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();

        assert_eq!(error, Error::NotFound);
    }
}
