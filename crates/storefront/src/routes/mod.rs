//! HTTP route handlers for the storefront server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//!
//! # Courier
//! POST /api/webhooks/courier            - Shipment status push (shared-secret header)
//! GET  /api/tracking/{tracking_number}  - Shipment status lookup
//! ```

pub mod tracking;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Path the courier pushes status updates to.
pub const WEBHOOK_PATH: &str = "/api/webhooks/courier";

/// Create the courier API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/webhooks/courier",
            post(webhook::courier_update).fallback(webhook::method_not_allowed),
        )
        .route("/tracking/{tracking_number}", get(tracking::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the courier.
async fn health() -> &'static str {
    "ok"
}
