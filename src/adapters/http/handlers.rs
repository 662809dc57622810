//! HTTP handlers for the webhook endpoints.
//!
//! These handlers connect Axum routes to the application layer dispatch
//! pipeline.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use crate::application::handlers::{
    DispatchEventCommand, DispatchEventHandler, DispatchOutcome, RecomputePremiumHandler,
    ReconcileEntitlementHandler,
};
use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{DispatchError, LifecycleEvent};
use crate::ports::{AccountStore, IdentityStore, SubscriptionStore};

use super::dto::{
    BannerResponse, ErrorResponse, HealthResponse, ProcessedResponse, WebhookEnvelope,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped stores
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub identities: Arc<dyn IdentityStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub accounts: Arc<dyn AccountStore>,
    started_at: Instant,
}

impl WebhookAppState {
    /// Creates the state over the three store ports.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            identities,
            subscriptions,
            accounts,
            started_at: Instant::now(),
        }
    }

    /// Create the dispatch pipeline on demand from the shared state.
    pub fn dispatch_handler(&self) -> DispatchEventHandler {
        let premium = Arc::new(RecomputePremiumHandler::new(
            self.subscriptions.clone(),
            self.accounts.clone(),
        ));
        let reconciler = Arc::new(ReconcileEntitlementHandler::new(
            self.subscriptions.clone(),
            premium,
        ));
        DispatchEventHandler::new(self.identities.clone(), reconciler)
    }

    /// Seconds since the state was constructed.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/revenuecat - Receive one lifecycle event
pub async fn receive_event(
    State(state): State<WebhookAppState>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Result<Json<ProcessedResponse>, ApiError> {
    let started = Instant::now();

    let raw_event = envelope.event.filter(Value::is_object).ok_or_else(|| {
        tracing::warn!("Rejected envelope without an event object");
        ApiError::missing_event()
    })?;

    let event: LifecycleEvent = serde_json::from_value(raw_event.clone()).map_err(|e| {
        tracing::warn!("Rejected malformed event object: {}", e);
        ApiError::malformed_event(e)
    })?;

    let event_type = event.event_type_label().to_string();
    tracing::info!(
        event_type = %event_type,
        user_id = event.app_user_id.as_deref().unwrap_or("<missing>"),
        "Received billing event"
    );

    let command = DispatchEventCommand { event, raw_event };
    let outcome = state
        .dispatch_handler()
        .handle(command)
        .await
        .map_err(|error| {
            let processing_time_ms = elapsed_ms(started);
            if error.is_retryable() {
                tracing::error!(event_type = %event_type, "Event dispatch failed: {}", error);
            } else {
                tracing::warn!(event_type = %event_type, "Event rejected: {}", error);
            }
            ApiError::dispatch(error, processing_time_ms)
        })?;

    let processing_time_ms = elapsed_ms(started);
    match &outcome {
        // Anonymous and test skips are routine; these two point at a
        // misconfigured source or a type this service does not know yet.
        DispatchOutcome::SkippedUnknownIdentity | DispatchOutcome::SkippedUnknownType { .. } => {
            tracing::warn!(
                event_type = %event_type,
                outcome = outcome.kind(),
                processing_time_ms,
                "Billing event skipped"
            );
        }
        _ => {
            tracing::info!(
                event_type = %event_type,
                outcome = outcome.kind(),
                processing_time_ms,
                "Billing event acknowledged"
            );
        }
    }

    Ok(Json(ProcessedResponse::new(
        &event_type,
        outcome.kind(),
        processing_time_ms,
    )))
}

/// GET / - Service banner
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Entitlement sync service".to_string(),
        status: "running",
        timestamp: Timestamp::now().to_rfc3339(),
    })
}

/// GET /health - Liveness check, no store access
pub async fn health(State(state): State<WebhookAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_secs: state.uptime_secs(),
        timestamp: Timestamp::now().to_rfc3339(),
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts dispatch failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Envelope rejected before dispatch.
    InvalidPayload { message: String },
    /// Dispatch pipeline failed.
    Dispatch {
        error: DispatchError,
        processing_time_ms: u64,
    },
}

impl ApiError {
    fn missing_event() -> Self {
        ApiError::InvalidPayload {
            message: "Missing event or app_user_id".to_string(),
        }
    }

    fn malformed_event(err: serde_json::Error) -> Self {
        ApiError::InvalidPayload {
            message: format!("Malformed event object: {}", err),
        }
    }

    fn dispatch(error: DispatchError, processing_time_ms: u64) -> Self {
        ApiError::Dispatch {
            error,
            processing_time_ms,
        }
    }

    /// Splits the error into the status code and response body.
    pub fn into_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::InvalidPayload { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::invalid_payload(message),
            ),
            ApiError::Dispatch {
                error: DispatchError::Validation(inner),
                ..
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::invalid_payload(inner.to_string()),
            ),
            ApiError::Dispatch {
                error,
                processing_time_ms,
            } => (
                error.status_code(),
                ErrorResponse::internal(error.to_string(), processing_time_ms),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}
