//! The page and JSON responses for requests to routes that do not exist.

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::html::error_view;

/// Fallback handler. API routes get a JSON error, everything else gets the 404 page.
pub async fn get_404_not_found(request: Request) -> Response {
    if request.uri().path().starts_with("/api/") {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
    } else {
        get_404_not_found_response()
    }
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            error_view(
                "Not Found",
                "404",
                "Something's missing.",
                "Sorry, we can't find that page. You'll find lots to explore on the home page.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
