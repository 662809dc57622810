//! HTTP adapter - webhook intake and liveness endpoints.
//!
//! Exposes the dispatch pipeline via REST:
//! - `POST /api/webhooks/revenuecat` - Receive a lifecycle event
//! - `GET /` - Service banner
//! - `GET /health` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

// Re-export key types for convenience
pub use handlers::WebhookAppState;
pub use routes::webhook_router;
