//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, middleware};
use serde_json::json;

use crate::{AppState, middleware::caller_middleware};

pub mod accounts;
pub mod dimensions;
pub mod health;
pub mod journal_entries;
pub mod reconciliation;
pub mod reports;

/// Creates the API router: a public health check plus the protected
/// engine surface behind the caller-identity middleware.
pub fn api_routes() -> Router<AppState> {
    let protected = Router::new()
        .merge(accounts::routes())
        .merge(dimensions::routes())
        .merge(journal_entries::routes())
        .merge(reports::routes())
        .merge(reconciliation::routes())
        .layer(middleware::from_fn(caller_middleware));

    Router::new().merge(health::routes()).merge(protected)
}

/// Builds the standard JSON error envelope.
pub(crate) fn error_response(status: u16, code: &str, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// 403 envelope for capability failures.
pub(crate) fn forbidden(message: &str) -> Response {
    error_response(403, "FORBIDDEN", message.to_string())
}

/// 400 envelope for malformed request payloads.
pub(crate) fn bad_request(message: String) -> Response {
    error_response(400, "VALIDATION_ERROR", message)
}
