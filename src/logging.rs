//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";
const SECRET_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
/// Password fields in form-encoded and JSON request bodies are redacted.
/// Bodies that are not text are logged by size only and passed on untouched.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return (StatusCode::BAD_REQUEST, "Could not read request body").into_response();
        }
    };

    let content_type = header_text(parts.headers.get(CONTENT_TYPE));
    let display_text = if content_type.starts_with("application/x-www-form-urlencoded") {
        let body_text = String::from_utf8_lossy(&bytes);
        SECRET_FIELDS
            .iter()
            .fold(body_text.into_owned(), |text, field| redact_form_field(&text, field))
    } else if content_type.starts_with("application/json") {
        redact_json_fields(&String::from_utf8_lossy(&bytes))
    } else {
        display_body(content_type, &bytes)
    };
    log_request(&parts, &display_text);

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let content_type = header_text(parts.headers.get(CONTENT_TYPE));
    log_response(&parts, &display_body(content_type, &bytes));

    Response::from_parts(parts, Body::from(bytes))
}

fn header_text(value: Option<&HeaderValue>) -> &str {
    value
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn is_text(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("json")
        || content_type.contains("javascript")
        || content_type.contains("xml")
        || content_type.starts_with("application/x-www-form-urlencoded")
}

/// A lossy text copy of a text body, or a size note for anything else.
fn display_body(content_type: &str, bytes: &[u8]) -> String {
    if is_text(content_type) {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        format!("<{} bytes of {content_type}>", bytes.len())
    }
}

fn redact_form_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{key}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn redact_json_fields(json_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(json_text) else {
        return json_text.to_owned();
    };

    redact_json_value(&mut value);

    value.to_string()
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED.to_owned());
                } else {
                    redact_json_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json_value),
        _ => {}
    }
}

/// The longest prefix of `body` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate_body(body: &str) -> &str {
    let end = body
        .char_indices()
        .map(|(index, _)| index)
        .take_while(|&index| index <= LOG_BODY_LENGTH_LIMIT)
        .last()
        .unwrap_or(0);

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Bytes,
        http::header::CONTENT_TYPE,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;

    use super::{
        LOG_BODY_LENGTH_LIMIT, display_body, logging_middleware, redact_form_field,
        redact_json_fields, truncate_body,
    };

    const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0xff];

    fn server() -> TestServer {
        let router = Router::new()
            .route(
                "/image.png",
                get(|| async { ([(CONTENT_TYPE, "image/png")], Bytes::from_static(&PNG_BYTES)) }),
            )
            .route("/echo", post(|body: Bytes| async move { body }))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(router).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn binary_response_passes_through_unchanged() {
        let response = server().get("/image.png").await;

        response.assert_status_ok();
        assert_eq!(&response.as_bytes()[..], &PNG_BYTES[..]);
    }

    #[tokio::test]
    async fn binary_request_reaches_handler_unchanged() {
        let body = Bytes::from_static(&[0xff, 0x00, 0x80, 0xfe]);

        let response = server().post("/echo").bytes(body.clone()).await;

        assert_eq!(response.as_bytes(), &body);
    }

    #[test]
    fn binary_bodies_are_logged_by_size() {
        assert_eq!(display_body("image/png", &PNG_BYTES), "<8 bytes of image/png>");
        assert_eq!(display_body("text/html; charset=utf-8", b"<p>hi</p>"), "<p>hi</p>");
    }

    #[test]
    fn redacts_form_password() {
        let got = redact_form_field("email=a%40b.com&password=hunter2&remember_me=on", "password");

        assert_eq!(got, "email=a%40b.com&password=********&remember_me=on");
    }

    #[test]
    fn form_redaction_ignores_similar_keys() {
        let got = redact_form_field("confirm_password=abc&password=def", "password");

        assert_eq!(got, "confirm_password=abc&password=********");
    }

    #[test]
    fn redacts_nested_json_password() {
        let got = redact_json_fields(r#"{"email":"a@b.com","inner":{"password":"hunter2"}}"#);

        assert!(!got.contains("hunter2"), "got {got}");
        assert!(got.contains("a@b.com"));
    }

    #[test]
    fn invalid_json_is_left_alone() {
        assert_eq!(redact_json_fields("not json"), "not json");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "৳".repeat(LOG_BODY_LENGTH_LIMIT);

        let got = truncate_body(&body);

        assert!(got.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(body.starts_with(got));
    }
}
