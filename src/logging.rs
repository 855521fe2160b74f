//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` level logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Fields of JSON bodies that hold personal identification numbers.
const REDACTED_FIELDS: [&str; 1] = ["aadharCard"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Aadhaar numbers in JSON bodies are masked.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::InvalidRequest(format!("Could not read request body: {error}"))
                .into_response();
        }
    };

    let request_is_json = is_json(parts.headers.get(CONTENT_TYPE));
    log_body(
        "Received request",
        &format!("{parts:#?}"),
        &body_bytes,
        request_is_json,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Error::ResponseBodyError(error.to_string()).into_response();
        }
    };

    let response_is_json = is_json(parts.headers.get(CONTENT_TYPE));
    log_body(
        "Sending response",
        &format!("{parts:#?}"),
        &body_bytes,
        response_is_json,
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    to_bytes(body, usize::MAX).await
}

fn is_json(content_type: Option<&axum::http::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Mask the values of [REDACTED_FIELDS] anywhere in a JSON document.
///
/// Bodies that are not valid JSON are returned as is.
fn redact_json(body_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_string();
    };

    redact_value(&mut value);

    value.to_string()
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::from("********");
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

fn log_body(message: &str, headers: &str, body: &[u8], is_json: bool) {
    let body = String::from_utf8_lossy(body);
    let body = if is_json {
        redact_json(&body)
    } else {
        body.to_string()
    };

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let cut = (0..=LOG_BODY_LENGTH_LIMIT)
            .rev()
            .find(|&index| body.is_char_boundary(index))
            .unwrap_or(0);
        tracing::info!("{message}: {headers}\nbody: {:}...", &body[..cut]);
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {headers}\nbody: {body:?}");
    }
}
