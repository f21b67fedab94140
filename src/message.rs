//! Contact messages sent from the public site.
//!
//! Anyone may send a message; only logged in admins can read and manage them.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRequest;
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::DbState,
    database_id::DatabaseId,
    extract::{JsonBody, JsonOrForm},
    portfolio::{ContactNotice, contact_form},
    sanitize::{clean_text, is_plausible_email, trimmed},
};

/// Whether an admin has read a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Not yet read.
    #[default]
    Unseen,
    /// Read by an admin.
    Seen,
}

impl MessageStatus {
    fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Unseen => "unseen",
            MessageStatus::Seen => "seen",
        }
    }
}

impl ToSql for MessageStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MessageStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "unseen" => Ok(MessageStatus::Unseen),
            "seen" => Ok(MessageStatus::Seen),
            other => Err(FromSqlError::Other(
                format!("unknown message status {other}").into(),
            )),
        }
    }
}

/// A message sent through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// The ID of the message.
    pub id: DatabaseId,
    /// What the message is about.
    pub subject: String,
    /// The sender's e-mail address.
    pub email: String,
    /// The body of the message.
    pub message: String,
    /// Whether an admin has read the message.
    pub status: MessageStatus,
    /// When the message was sent.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the message was last changed by an admin.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// The client supplied fields of a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageForm {
    /// What the message is about.
    pub subject: Option<String>,
    /// The sender's e-mail address.
    pub email: Option<String>,
    /// The body of the message.
    pub message: Option<String>,
    /// Only used by admins when updating a message.
    pub status: Option<MessageStatus>,
}

#[derive(Debug, PartialEq)]
struct ValidMessage {
    subject: String,
    email: String,
    message: String,
}

impl MessageForm {
    fn validate(&self) -> Result<ValidMessage, Error> {
        let clean = |field: &Option<String>| field.as_deref().map(clean_text).unwrap_or_default();

        let subject = clean(&self.subject);
        if subject.is_empty() {
            return Err(Error::Validation("Subject is required".to_owned()));
        }

        let email = trimmed(self.email.as_deref()).unwrap_or_default();
        if !is_plausible_email(&email) {
            return Err(Error::Validation("Valid email is required".to_owned()));
        }

        let message = clean(&self.message);
        if message.is_empty() {
            return Err(Error::Validation("Message is required".to_owned()));
        }

        Ok(ValidMessage {
            subject,
            email,
            message,
        })
    }
}

/// Create the messages table.
pub fn create_message_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY,
            subject TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'unseen',
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        subject: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, subject, email, message, status, created_at, updated_at FROM messages";

/// Store a new, unseen message.
///
/// # Errors
/// Returns [Error::Validation] if a field is missing or the e-mail is not
/// plausible.
pub fn create_message(form: &MessageForm, connection: &Connection) -> Result<Message, Error> {
    let message = form.validate()?;

    connection.execute(
        "INSERT INTO messages (subject, email, message, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &message.subject,
            &message.email,
            &message.message,
            MessageStatus::Unseen,
            OffsetDateTime::now_utc(),
        ),
    )?;

    get_message(connection.last_insert_rowid(), connection)
}

/// Get a message by its ID.
///
/// # Errors
/// Returns [Error::MessageNotFound] if there is no message with `id`.
pub fn get_message(id: DatabaseId, connection: &Connection) -> Result<Message, Error> {
    connection
        .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), (id,), map_row)
        .optional()?
        .ok_or(Error::MessageNotFound)
}

/// Get all messages, newest first.
pub fn get_messages(connection: &Connection) -> Result<Vec<Message>, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))?
        .query_map([], map_row)?
        .map(|maybe_message| maybe_message.map_err(Error::from))
        .collect()
}

/// Count the messages no admin has read yet.
pub fn count_unseen_messages(connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM messages WHERE status = ?1",
        (MessageStatus::Unseen,),
        |row| row.get(0),
    )?;

    Ok(count as u64)
}

/// Replace the fields of a message. The status is kept unless the form gives one.
///
/// # Errors
/// Returns:
/// - [Error::Validation] if a field is missing or the e-mail is not plausible,
/// - [Error::MessageNotFound] if there is no message with `id`.
pub fn update_message(
    id: DatabaseId,
    form: &MessageForm,
    connection: &Connection,
) -> Result<Message, Error> {
    let message = form.validate()?;

    let rows_affected = connection.execute(
        "UPDATE messages
        SET subject = ?1, email = ?2, message = ?3, status = COALESCE(?4, status), updated_at = ?5
        WHERE id = ?6",
        (
            &message.subject,
            &message.email,
            &message.message,
            form.status,
            OffsetDateTime::now_utc(),
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::MessageNotFound);
    }

    get_message(id, connection)
}

/// Permanently delete a message.
///
/// # Errors
/// Returns [Error::MessageNotFound] if there is no message with `id`.
pub fn delete_message(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM messages WHERE id = ?1", (id,))?;

    if rows_affected == 0 {
        return Err(Error::MessageNotFound);
    }

    Ok(())
}

/// A public route handler for sending a message.
///
/// JSON clients get 201 and the stored fields. The contact form on the home
/// page posts with htmx and gets the form back with a status line instead.
pub async fn create_message_endpoint(
    State(state): State<DbState>,
    HxRequest(is_htmx): HxRequest,
    JsonOrForm(form): JsonOrForm<MessageForm>,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_message(&form, &connection));

    match (result, is_htmx) {
        (Ok(message), false) => {
            tracing::info!("Received message {} from {}", message.id, message.email);
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": message.id,
                    "subject": message.subject,
                    "email": message.email,
                    "message": message.message,
                })),
            )
                .into_response()
        }
        (Ok(message), true) => {
            tracing::info!("Received message {} from {}", message.id, message.email);
            (
                StatusCode::CREATED,
                Html(
                    contact_form(&MessageForm::default(), ContactNotice::Sent)
                        .into_string(),
                ),
            )
                .into_response()
        }
        (Err(error), false) => error.into_response(),
        (Err(Error::Validation(reason)), true) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(contact_form(&form, ContactNotice::Failed(&reason)).into_string()),
        )
            .into_response(),
        (Err(error), true) => {
            tracing::error!("could not store contact message: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(
                    contact_form(
                        &form,
                        ContactNotice::Failed("Your message could not be sent, try again later."),
                    )
                    .into_string(),
                ),
            )
                .into_response()
        }
    }
}

/// A route handler listing all messages, newest first.
pub async fn get_messages_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Message>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_messages(&connection).map(Json)
}

/// A route handler for a single message.
pub async fn get_message_endpoint(
    State(state): State<DbState>,
    Path(message_id): Path<DatabaseId>,
) -> Result<Json<Message>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_message(message_id, &connection).map(Json)
}

/// A route handler for the number of unread messages, `{"count": n}`.
pub async fn count_unseen_messages_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = count_unseen_messages(&connection)?;

    Ok(Json(json!({ "count": count })))
}

/// A route handler for editing a message or marking it as seen.
pub async fn update_message_endpoint(
    State(state): State<DbState>,
    Path(message_id): Path<DatabaseId>,
    JsonBody(form): JsonBody<MessageForm>,
) -> Result<Json<Message>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_message(message_id, &form, &connection).map(Json)
}

/// A route handler for permanently deleting a message.
pub async fn delete_message_endpoint(
    State(state): State<DbState>,
    Path(message_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_message(message_id, &connection)?;

    Ok(Json(json!({ "success": true })))
}
