//! ReconcileEntitlementHandler - Upserts one subscription record from an event.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::foundation::{EntitlementId, Timestamp, UserId};
use crate::domain::subscription::{
    DispatchError, LifecycleEvent, ResolvedStatus, SubscriptionRecord,
};
use crate::ports::SubscriptionStore;

use super::RecomputePremiumHandler;

/// Command to reconcile one (user, entitlement) pair against an event.
#[derive(Debug, Clone)]
pub struct ReconcileEntitlementCommand {
    pub user_id: UserId,
    pub entitlement_id: EntitlementId,
    pub event: LifecycleEvent,
    /// Event payload as received, retained on the record.
    pub raw_event: Value,
}

/// Handler that upserts the record for one (user, entitlement) pair and
/// recomputes the user's premium state afterwards.
pub struct ReconcileEntitlementHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    premium: Arc<RecomputePremiumHandler>,
}

impl ReconcileEntitlementHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        premium: Arc<RecomputePremiumHandler>,
    ) -> Self {
        Self {
            subscriptions,
            premium,
        }
    }

    /// Resolves the event's status against the current clock, creates or
    /// overwrites the record for the pair, and recomputes premium state.
    ///
    /// Returns the record as written.
    pub async fn handle(
        &self,
        cmd: ReconcileEntitlementCommand,
    ) -> Result<SubscriptionRecord, DispatchError> {
        let now = Timestamp::now();
        let status = ResolvedStatus::resolve(
            cmd.event.parsed_type(),
            cmd.event.expires_at(),
            cmd.event.grace_period_expires_at(),
            now,
        );

        let existing = self
            .subscriptions
            .find_by_user_and_entitlement(&cmd.user_id, &cmd.entitlement_id)
            .await?;

        let record = match existing {
            Some(mut record) => {
                record.apply_event(&cmd.event, cmd.raw_event, status, now)?;
                self.subscriptions.update(&record).await?;
                record
            }
            None => {
                let record = SubscriptionRecord::from_event(
                    cmd.user_id.clone(),
                    cmd.entitlement_id.clone(),
                    &cmd.event,
                    cmd.raw_event,
                    status,
                    now,
                )?;
                self.subscriptions.insert(&record).await?;
                record
            }
        };

        self.premium.handle(&cmd.user_id).await?;

        Ok(record)
    }
}
