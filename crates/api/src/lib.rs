//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for posting, directories, reports, and reconciliation
//! - Caller-identity middleware (authentication lives upstream)
//! - Request/response types and error mapping
//!
//! Every route runs under a request timeout; a timed-out posting either
//! fully committed or fully rolled back, and the caller retries safely
//! with the same idempotency key.

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use ledgra_shared::AppConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Configuration snapshot (base currency, reconciliation thresholds).
    pub config: Arc<AppConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
