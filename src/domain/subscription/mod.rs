//! Subscription domain module.
//!
//! The reconciliation core: lifecycle events in, per-entitlement records
//! and an account-level premium summary out.
//!
//! # Module Structure
//!
//! - `event` - Decoded lifecycle event and event type classification
//! - `status` - Pure status resolution per event type
//! - `record` - SubscriptionRecord entity and field merge rules
//! - `premium` - PremiumSummary materialized view
//! - `errors` - Dispatch and store error taxonomy

mod errors;
mod event;
mod premium;
mod record;
mod status;

pub use errors::{DispatchError, StoreError};
pub use event::{EventType, LifecycleEvent};
pub use premium::PremiumSummary;
pub use record::SubscriptionRecord;
pub use status::{CancelledAtChange, ResolvedStatus};

#[cfg(test)]
pub use event::LifecycleEventBuilder;
