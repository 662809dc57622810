//! Error types for event dispatch and reconciliation.
//!
//! Skips are not errors: an anonymous identity or an unknown event type
//! acknowledges as success with no state change. Only payload validation
//! failures and store failures abort an event, with HTTP status mapping
//! and retryability semantics for the transport layer.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Failure reported by a backing store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A read against the store failed.
    #[error("store read failed: {0}")]
    Read(String),

    /// A write against the store failed.
    #[error("store write failed: {0}")]
    Write(String),
}

impl StoreError {
    /// Creates a read failure.
    pub fn read(message: impl Into<String>) -> Self {
        StoreError::Read(message.into())
    }

    /// Creates a write failure.
    pub fn write(message: impl Into<String>) -> Self {
        StoreError::Write(message.into())
    }
}

/// Errors that abort processing of an inbound event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Payload failed structural validation. Acknowledged to the caller
    /// as a client-side rejection; never retried.
    #[error("Invalid payload: {0}")]
    Validation(#[from] ValidationError),

    /// A store read failed before or during reconciliation.
    #[error("Store read failed: {0}")]
    StoreRead(String),

    /// A store write failed. Remaining entitlements of the same event are
    /// not attempted; the source retries the whole event.
    #[error("Store write failed: {0}")]
    StoreWrite(String),
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Read(message) => DispatchError::StoreRead(message),
            StoreError::Write(message) => DispatchError::StoreWrite(message),
        }
    }
}

impl DispatchError {
    /// Returns true if the event source should retry delivery.
    ///
    /// Store failures are transient; validation failures will fail the
    /// same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::StoreRead(_) | DispatchError::StoreWrite(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// The source retries on 5xx and drops the event on 4xx, so the
    /// mapping is what actually enforces the retry semantics.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::StoreRead(_) | DispatchError::StoreWrite(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn validation_error_displays_underlying_failure() {
        let err = DispatchError::Validation(ValidationError::missing_required_field(
            "app_user_id",
        ));
        assert_eq!(
            format!("{}", err),
            "Invalid payload: Required field 'app_user_id' is missing"
        );
    }

    #[test]
    fn store_read_displays_message() {
        let err = DispatchError::StoreRead("connection refused".to_string());
        assert_eq!(format!("{}", err), "Store read failed: connection refused");
    }

    #[test]
    fn store_write_displays_message() {
        let err = DispatchError::StoreWrite("unique violation".to_string());
        assert_eq!(format!("{}", err), "Store write failed: unique violation");
    }

    #[test]
    fn store_error_converts_preserving_direction() {
        let read: DispatchError = StoreError::read("timeout").into();
        assert!(matches!(read, DispatchError::StoreRead(_)));

        let write: DispatchError = StoreError::write("timeout").into();
        assert!(matches!(write, DispatchError::StoreWrite(_)));
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn store_read_is_retryable() {
        let err = DispatchError::StoreRead("timeout".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn store_write_is_retryable() {
        let err = DispatchError::StoreWrite("deadlock".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_is_not_retryable() {
        let err = DispatchError::Validation(ValidationError::empty_field("app_user_id"));
        assert!(!err.is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn validation_returns_bad_request() {
        let err = DispatchError::Validation(ValidationError::missing_required_field(
            "app_user_id",
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_read_returns_internal_error() {
        let err = DispatchError::StoreRead("down".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_write_returns_internal_error() {
        let err = DispatchError::StoreWrite("down".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn retryable_errors_map_to_5xx() {
        let errors = [
            DispatchError::StoreRead("a".to_string()),
            DispatchError::StoreWrite("b".to_string()),
        ];
        for err in errors {
            assert!(err.is_retryable());
            assert!(err.status_code().is_server_error());
        }
    }
}
