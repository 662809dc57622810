//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the entitlement sync domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{EntitlementId, SubscriptionId, UserId, ANONYMOUS_ID_PREFIX};
pub use timestamp::Timestamp;
