//! Axum router configuration for the webhook endpoints.
//!
//! This module defines the route structure for event intake and wires it
//! to the corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{banner, health, receive_event, WebhookAppState};

/// Create the webhook intake router.
///
/// # Routes
///
/// - `POST /api/webhooks/revenuecat` - Receive a lifecycle event
/// - `GET /` - Service banner
/// - `GET /health` - Liveness check
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/api/webhooks/revenuecat", post(receive_event))
}
