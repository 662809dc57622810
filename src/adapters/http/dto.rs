//! HTTP DTOs (Data Transfer Objects) for the webhook endpoint.
//!
//! These types define the JSON request/response structure of the intake API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Inbound webhook envelope.
///
/// The billing source wraps each lifecycle event in `{ "event": { ... } }`.
/// The inner object is kept as raw JSON so the reconciler can retain the
/// payload byte-for-byte; typed decoding happens afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// The lifecycle event object, absent when the caller sent garbage.
    #[serde(default)]
    pub event: Option<Value>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for an acknowledged event, processed or skipped.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedResponse {
    /// Always true; skips acknowledge as success.
    pub success: bool,
    /// Human-readable summary, e.g. "Processed RENEWAL event".
    pub message: String,
    /// Machine-readable dispatch outcome.
    pub outcome: &'static str,
    /// Wall-clock handling time.
    pub processing_time_ms: u64,
    /// When the response was produced (RFC 3339).
    pub timestamp: String,
}

impl ProcessedResponse {
    /// Creates an acknowledgement for an event with the given type label.
    pub fn new(event_type: &str, outcome: &'static str, processing_time_ms: u64) -> Self {
        Self {
            success: true,
            message: format!("Processed {} event", event_type),
            outcome,
            processing_time_ms,
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

/// Response for the service banner.
#[derive(Debug, Clone, Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub status: &'static str,
    pub timestamp: String,
}

/// Response for the liveness check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub timestamp: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for rejected or failed events.
///
/// Client-side rejections carry only the label and message; server-side
/// failures add the timing fields.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error label, "Invalid payload" or "Internal server error".
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorResponse {
    /// Creates a client-side rejection body.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self {
            error: "Invalid payload",
            message: message.into(),
            processing_time_ms: None,
            timestamp: None,
        }
    }

    /// Creates a server-side failure body.
    pub fn internal(message: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            error: "Internal server error",
            message: message.into(),
            processing_time_ms: Some(processing_time_ms),
            timestamp: Some(Timestamp::now().to_rfc3339()),
        }
    }
}
