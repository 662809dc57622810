//! DispatchEventHandler - Validates, classifies, and fans out inbound events.
//!
//! One inbound event can name several entitlements; each gets its own
//! reconciliation pass, sequentially and in payload order. The first
//! failure aborts the remainder, leaving earlier writes in place for the
//! source's redelivery to converge.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::foundation::{EntitlementId, UserId, ValidationError};
use crate::domain::subscription::{DispatchError, EventType, LifecycleEvent};
use crate::ports::IdentityStore;

use super::{ReconcileEntitlementCommand, ReconcileEntitlementHandler};

/// Command to dispatch one inbound lifecycle event.
#[derive(Debug, Clone)]
pub struct DispatchEventCommand {
    pub event: LifecycleEvent,
    /// Event payload as received, retained on reconciled records.
    pub raw_event: Value,
}

/// Outcome of dispatching an event.
///
/// Every variant acknowledges the event; failures surface as
/// `DispatchError` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Reconciled the listed entitlements and recomputed premium state.
    Processed { entitlements: Vec<String> },
    /// TEST event, acknowledged without writes.
    TestAcknowledged,
    /// Unrecognized event type, acknowledged without writes.
    SkippedUnknownType { event_type: String },
    /// Anonymous app user id, acknowledged without writes.
    SkippedAnonymous,
    /// App user id maps to no known account.
    SkippedUnknownIdentity,
    /// Event names no entitlements or carries no product id.
    SkippedIncompletePayload,
}

impl DispatchOutcome {
    /// Stable label for logs and response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchOutcome::Processed { .. } => "processed",
            DispatchOutcome::TestAcknowledged => "test",
            DispatchOutcome::SkippedUnknownType { .. } => "skipped_unknown_type",
            DispatchOutcome::SkippedAnonymous => "skipped_anonymous",
            DispatchOutcome::SkippedUnknownIdentity => "skipped_unknown_identity",
            DispatchOutcome::SkippedIncompletePayload => "skipped_incomplete_payload",
        }
    }
}

/// Handler that routes one inbound event through validation, identity
/// checks, and per-entitlement reconciliation.
pub struct DispatchEventHandler {
    identities: Arc<dyn IdentityStore>,
    reconciler: Arc<ReconcileEntitlementHandler>,
}

impl DispatchEventHandler {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        reconciler: Arc<ReconcileEntitlementHandler>,
    ) -> Self {
        Self {
            identities,
            reconciler,
        }
    }

    /// Dispatches one event.
    ///
    /// Checks run in a fixed order: app user id presence, event type
    /// classification, anonymous id, identity lookup, payload completeness,
    /// then per-entitlement fan-out. Classification comes before the
    /// identity checks, so a TEST event from an anonymous id still reports
    /// as a test acknowledgement.
    pub async fn handle(
        &self,
        cmd: DispatchEventCommand,
    ) -> Result<DispatchOutcome, DispatchError> {
        let raw_user_id = cmd
            .event
            .app_user_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::missing_required_field("app_user_id"))?;
        let user_id = UserId::new(raw_user_id)?;

        match cmd.event.parsed_type() {
            EventType::Test => return Ok(DispatchOutcome::TestAcknowledged),
            EventType::Unknown => {
                return Ok(DispatchOutcome::SkippedUnknownType {
                    event_type: cmd.event.event_type_label().to_string(),
                })
            }
            _ => {}
        }

        if user_id.is_anonymous() {
            return Ok(DispatchOutcome::SkippedAnonymous);
        }

        if self.identities.find_by_user_id(&user_id).await?.is_none() {
            return Ok(DispatchOutcome::SkippedUnknownIdentity);
        }

        let entitlements = cmd.event.entitlement_set();
        if entitlements.is_empty() {
            return Ok(DispatchOutcome::SkippedIncompletePayload);
        }
        let has_product = cmd
            .event
            .product_id
            .as_deref()
            .map_or(false, |id| !id.is_empty());
        if !has_product {
            return Ok(DispatchOutcome::SkippedIncompletePayload);
        }

        for entitlement in &entitlements {
            let entitlement_id = EntitlementId::new(entitlement.clone())?;
            self.reconciler
                .handle(ReconcileEntitlementCommand {
                    user_id: user_id.clone(),
                    entitlement_id,
                    event: cmd.event.clone(),
                    raw_event: cmd.raw_event.clone(),
                })
                .await?;
        }

        Ok(DispatchOutcome::Processed { entitlements })
    }
}
