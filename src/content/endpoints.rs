//! JSON route handlers for articles and projects.
//!
//! The kind of content is supplied by the router as an [Extension], so the
//! same handlers serve `/api/articles` and `/api/projects`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
    Error,
    app_state::DbState,
    content::{
        core::{ContentForm, ContentKind},
        db::{
            create_content, delete_content, get_active_content, get_content, get_related_content,
            update_content,
        },
    },
    extract::JsonBody,
};

/// The number of items in a list response when the request does not say.
pub const DEFAULT_LIST_LIMIT: u64 = 9;
/// The most items a client may ask for in one list response.
pub const MAX_LIST_LIMIT: u64 = 100;

/// The query string of a public list request, e.g. `?offset=9&limit=9`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// The number of items to skip.
    pub offset: Option<String>,
    /// The number of items to return.
    pub limit: Option<String>,
}

impl ListQuery {
    pub(crate) fn offset(&self) -> u64 {
        self.offset
            .as_deref()
            .and_then(|offset| offset.trim().parse().ok())
            .unwrap_or(0)
    }

    pub(crate) fn limit(&self) -> u64 {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT)
    }
}

/// The query string of a detail request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    /// The slug, only used by the legacy select routes.
    pub slug: Option<String>,
    /// "true" to add the related items to the response.
    pub include_related: Option<String>,
}

impl DetailQuery {
    fn include_related(&self) -> bool {
        self.include_related.as_deref() == Some("true")
    }
}

/// The error body of the public detail routes, `{"success": false, "error": ...}`.
fn detail_error_response(error: Error) -> Response {
    let status = error.status_code();

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("An unexpected error occurred: {}", error);
        "An unexpected error occurred, check the server logs for more details.".to_owned()
    } else {
        error.to_string()
    };

    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// A route handler listing the active articles or projects.
pub async fn get_content_list_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let (items, total) = get_active_content(kind, query.offset(), query.limit(), &connection)?;
    let items: Vec<Value> = items.iter().map(|item| item.to_list_json()).collect();

    let mut body = Map::new();
    body.insert(kind.list_key().to_owned(), Value::from(items));
    body.insert(kind.total_key().to_owned(), Value::from(total));

    Ok(Json(Value::Object(body)))
}

fn get_detail(
    state: &DbState,
    kind: ContentKind,
    slug: &str,
    include_related: bool,
) -> Result<Value, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let content = get_content(kind, slug.trim(), &connection)?;
    let mut data = content.to_json();

    if include_related {
        let related: Vec<Value> = get_related_content(&content, &connection)?
            .iter()
            .map(|item| item.to_related_json())
            .collect();
        data[kind.related_key()] = Value::from(related);
    }

    Ok(data)
}

/// A route handler for a single article or project by the slug in the path.
///
/// Add `?includeRelated=true` to get up to five related items.
pub async fn get_content_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Response {
    match get_detail(&state, kind, &slug, query.include_related()) {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(error) => detail_error_response(error),
    }
}

/// A route handler for a single article or project by the `slug` query parameter.
pub async fn select_content_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let slug = query.slug.as_deref().map(str::trim).unwrap_or_default();

    if slug.is_empty() {
        return detail_error_response(Error::Validation("Slug is required.".to_owned()));
    }

    match get_detail(&state, kind, slug, query.include_related()) {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(error) => detail_error_response(error),
    }
}

/// A route handler for creating an article or project, responds with 201.
pub async fn create_content_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    JsonBody(form): JsonBody<ContentForm>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let content = create_content(kind, &form, &connection)?;

    Ok((StatusCode::CREATED, Json(content.to_json())))
}

/// A route handler for replacing the fields of an article or project.
pub async fn update_content_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Path(slug): Path<String>,
    JsonBody(form): JsonBody<ContentForm>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_content(kind, &slug, &form, &connection).map(|content| Json(content.to_json()))
}

/// A route handler for permanently deleting an article or project.
pub async fn delete_content_endpoint(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_content(kind, &slug, &connection)?;
    tracing::info!("Deleted {kind:?} {slug}");

    Ok(Json(json!({ "success": true })))
}
