//! Caller-identity middleware.
//!
//! Authentication happens upstream; requests arrive carrying an opaque
//! caller ID and role in headers. This middleware turns them into a
//! `CallerIdentity` for handlers and rejects requests without one.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use ledgra_shared::{CallerIdentity, CallerRole};

/// Header carrying the opaque caller ID (a UUID).
pub const CALLER_ID_HEADER: &str = "x-caller-id";
/// Header carrying the caller's role.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Middleware that extracts the caller identity from request headers.
pub async fn caller_middleware(mut request: Request, next: Next) -> Response {
    let caller_id = request
        .headers()
        .get(CALLER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());
    let role = request
        .headers()
        .get(CALLER_ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| CallerRole::from_str(s).ok());

    let (Some(caller_id), Some(role)) = (caller_id, role) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_caller",
                "message": "x-caller-id and x-caller-role headers are required"
            })),
        )
            .into_response();
    };

    request
        .extensions_mut()
        .insert(CallerIdentity::new(caller_id, role));
    next.run(request).await
}

/// Extractor for the caller identity set by [`caller_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub CallerIdentity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .map(Caller)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "missing_caller",
                    "message": "Caller identity not present on request"
                })),
            ))
    }
}
