//! Subscription record entity.
//!
//! One record per (user, entitlement) pair, created by the first event for
//! the pair and overwritten in full by every later one. Expiration is a
//! state, not a deletion; records are never removed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{EntitlementId, SubscriptionId, Timestamp, UserId, ValidationError};

use super::{LifecycleEvent, ResolvedStatus};

/// Durable subscription state for one (user, entitlement) pair.
///
/// # Invariants
///
/// - `(user_id, entitlement_id)` is the natural key; `id` is a surrogate
///   assigned once at creation
/// - `created_at` never changes after the first write
/// - every event-derived field is overwritten whole on update, so replaying
///   an event against the same prior state reproduces the same record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Surrogate identifier, fixed at creation.
    pub id: SubscriptionId,

    /// Identity key from the billing source.
    pub user_id: UserId,

    /// Entitlement this record tracks.
    pub entitlement_id: EntitlementId,

    /// Product SKU that most recently granted the entitlement.
    pub product_id: String,

    /// Whether the entitlement currently grants access.
    pub is_active: bool,

    /// Renewal intent; None when the source never reported one.
    pub will_renew: Option<bool>,

    /// Storefront, normalized to lowercase.
    pub store: Option<String>,

    /// Billing period classification, normalized to lowercase.
    pub period_type: Option<String>,

    /// Purchase instant reported by the most recent event.
    pub original_purchase_at: Option<Timestamp>,

    /// Purchase instant of the most recent purchase-family event.
    pub latest_purchase_at: Option<Timestamp>,

    /// Current expiry; None for open-ended grants.
    pub expires_at: Option<Timestamp>,

    /// When auto-renewal was switched off, if it ever was.
    pub cancelled_at: Option<Timestamp>,

    /// Type string of the last applied event.
    pub last_event_type: String,

    /// Source-side instant of the last applied event.
    pub last_event_at: Timestamp,

    /// Source-assigned id of the last applied event.
    pub last_event_id: Option<String>,

    /// Full payload of the last applied event, retained for audit and replay.
    pub raw_last_event: Value,

    /// First write instant. Never changes.
    pub created_at: Timestamp,

    /// Most recent write instant.
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Builds the record produced by the first event for a
    /// (user, entitlement) pair.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` if the event carries no product id.
    /// The dispatcher checks this before fan-out, so hitting it here means
    /// the caller skipped validation.
    pub fn from_event(
        user_id: UserId,
        entitlement_id: EntitlementId,
        event: &LifecycleEvent,
        raw_event: Value,
        status: ResolvedStatus,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let product_id = required_product_id(event)?;
        let purchased_at = event.purchased_at();

        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            entitlement_id,
            product_id,
            is_active: status.is_active,
            will_renew: status.will_renew,
            store: normalized(&event.store),
            period_type: normalized(&event.period_type),
            original_purchase_at: purchased_at,
            latest_purchase_at: if event.parsed_type().is_purchase() {
                purchased_at
            } else {
                None
            },
            expires_at: event.expires_at(),
            cancelled_at: status.cancelled_at.apply(None),
            last_event_type: event.event_type_label().to_string(),
            last_event_at: event.event_timestamp().unwrap_or(now),
            last_event_id: event.id.clone(),
            raw_last_event: raw_event,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a follow-up event, overwriting every event-derived field.
    ///
    /// `id`, the natural key, and `created_at` are preserved.
    /// `latest_purchase_at` only advances on purchase-family events;
    /// `cancelled_at` follows the resolved directive against the value
    /// stored here.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` if the event carries no product id.
    pub fn apply_event(
        &mut self,
        event: &LifecycleEvent,
        raw_event: Value,
        status: ResolvedStatus,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let product_id = required_product_id(event)?;

        self.product_id = product_id;
        self.is_active = status.is_active;
        self.will_renew = status.will_renew;
        self.store = normalized(&event.store);
        self.period_type = normalized(&event.period_type);
        self.original_purchase_at = event.purchased_at();
        if event.parsed_type().is_purchase() {
            self.latest_purchase_at = event.purchased_at();
        }
        self.expires_at = event.expires_at();
        self.cancelled_at = status.cancelled_at.apply(self.cancelled_at);
        self.last_event_type = event.event_type_label().to_string();
        self.last_event_at = event.event_timestamp().unwrap_or(now);
        self.last_event_id = event.id.clone();
        self.raw_last_event = raw_event;
        self.updated_at = now;

        Ok(())
    }
}

fn required_product_id(event: &LifecycleEvent) -> Result<String, ValidationError> {
    event
        .product_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ValidationError::missing_required_field("product_id"))
}

fn normalized(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| s.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::{EventType, LifecycleEventBuilder};
    use serde_json::json;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000).unwrap()
    }

    fn user() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn entitlement() -> EntitlementId {
        EntitlementId::new("pro").unwrap()
    }

    fn status_for(event: &LifecycleEvent, at: Timestamp) -> ResolvedStatus {
        ResolvedStatus::resolve(
            event.parsed_type(),
            event.expires_at(),
            event.grace_period_expires_at(),
            at,
        )
    }

    fn record_from(event: &LifecycleEvent, at: Timestamp) -> SubscriptionRecord {
        SubscriptionRecord::from_event(
            user(),
            entitlement(),
            event,
            json!({"captured": true}),
            status_for(event, at),
            at,
        )
        .unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Creation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn first_purchase_creates_active_record() {
        let event = LifecycleEventBuilder::new()
            .expires_at(now().add_days(30))
            .build();

        let record = record_from(&event, now());

        assert!(record.is_active);
        assert_eq!(record.will_renew, Some(true));
        assert_eq!(record.product_id, "premium_monthly");
        assert_eq!(record.cancelled_at, None);
        assert_eq!(record.created_at, now());
        assert_eq!(record.updated_at, now());
    }

    #[test]
    fn creation_normalizes_store_and_period_type_to_lowercase() {
        let event = LifecycleEventBuilder::new()
            .store("APP_STORE")
            .period_type("TRIAL")
            .build();

        let record = record_from(&event, now());

        assert_eq!(record.store.as_deref(), Some("app_store"));
        assert_eq!(record.period_type.as_deref(), Some("trial"));
    }

    #[test]
    fn creation_sets_latest_purchase_for_purchase_events() {
        let event = LifecycleEventBuilder::new()
            .event_type("RENEWAL")
            .purchased_at_ms(1_699_000_000_000)
            .build();

        let record = record_from(&event, now());

        assert_eq!(
            record.latest_purchase_at.unwrap().as_unix_millis(),
            1_699_000_000_000
        );
        assert_eq!(
            record.original_purchase_at.unwrap().as_unix_millis(),
            1_699_000_000_000
        );
    }

    #[test]
    fn creation_leaves_latest_purchase_unset_for_non_purchase_events() {
        let event = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .purchased_at_ms(1_699_000_000_000)
            .expires_at(now().add_days(10))
            .build();

        let record = record_from(&event, now());

        assert_eq!(record.latest_purchase_at, None);
        // original_purchase_at still reflects the reported purchase.
        assert!(record.original_purchase_at.is_some());
    }

    #[test]
    fn creation_records_event_provenance() {
        let event = LifecycleEventBuilder::new().event_id("evt-77").build();

        let record = record_from(&event, now());

        assert_eq!(record.last_event_type, "INITIAL_PURCHASE");
        assert_eq!(record.last_event_id.as_deref(), Some("evt-77"));
        assert_eq!(record.raw_last_event, json!({"captured": true}));
    }

    #[test]
    fn creation_falls_back_to_now_when_event_timestamp_absent() {
        let mut event = LifecycleEventBuilder::new().build();
        event.event_timestamp_ms = None;

        let record = record_from(&event, now());

        assert_eq!(record.last_event_at, now());
    }

    #[test]
    fn creation_fails_without_product_id() {
        let event = LifecycleEventBuilder::new().no_product_id().build();

        let result = SubscriptionRecord::from_event(
            user(),
            entitlement(),
            &event,
            json!({}),
            status_for(&event, now()),
            now(),
        );

        assert!(matches!(
            result,
            Err(ValidationError::MissingRequiredField { .. })
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Update Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn apply_preserves_identity_and_created_at() {
        let purchase = LifecycleEventBuilder::new()
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());
        let original_id = record.id;
        let original_created = record.created_at;

        let later = now().add_days(5);
        let cancellation = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        record
            .apply_event(
                &cancellation,
                json!({}),
                status_for(&cancellation, later),
                later,
            )
            .unwrap();

        assert_eq!(record.id, original_id);
        assert_eq!(record.created_at, original_created);
        assert_eq!(record.updated_at, later);
        assert_eq!(record.user_id, user());
        assert_eq!(record.entitlement_id, entitlement());
    }

    #[test]
    fn cancellation_after_purchase_keeps_access_until_expiry() {
        let purchase = LifecycleEventBuilder::new()
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());

        let cancellation = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        let later = now().add_days(1);
        record
            .apply_event(
                &cancellation,
                json!({}),
                status_for(&cancellation, later),
                later,
            )
            .unwrap();

        assert!(record.is_active);
        assert_eq!(record.will_renew, Some(false));
        assert_eq!(record.cancelled_at, Some(later));
    }

    #[test]
    fn expiration_keeps_earlier_cancellation_instant() {
        let purchase = LifecycleEventBuilder::new()
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());

        let cancel_at = now().add_days(1);
        let cancellation = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        record
            .apply_event(
                &cancellation,
                json!({}),
                status_for(&cancellation, cancel_at),
                cancel_at,
            )
            .unwrap();

        let expire_at = now().add_days(31);
        let expiration = LifecycleEventBuilder::new().event_type("EXPIRATION").build();
        record
            .apply_event(
                &expiration,
                json!({}),
                status_for(&expiration, expire_at),
                expire_at,
            )
            .unwrap();

        assert!(!record.is_active);
        // Unchanged directive: the original cancellation instant survives.
        assert_eq!(record.cancelled_at, Some(cancel_at));
    }

    #[test]
    fn uncancellation_clears_cancelled_at() {
        let cancellation = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&cancellation, now());
        assert!(record.cancelled_at.is_some());

        let later = now().add_days(2);
        let uncancellation = LifecycleEventBuilder::new()
            .event_type("UNCANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        record
            .apply_event(
                &uncancellation,
                json!({}),
                status_for(&uncancellation, later),
                later,
            )
            .unwrap();

        assert_eq!(record.cancelled_at, None);
        assert_eq!(record.will_renew, Some(true));
        assert!(record.is_active);
    }

    #[test]
    fn non_purchase_update_keeps_latest_purchase_at() {
        let purchase = LifecycleEventBuilder::new()
            .purchased_at_ms(1_699_000_000_000)
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());
        let latest = record.latest_purchase_at;

        let billing_issue = LifecycleEventBuilder::new()
            .event_type("BILLING_ISSUE")
            .purchased_at_ms(1_699_500_000_000)
            .build();
        let later = now().add_days(3);
        record
            .apply_event(
                &billing_issue,
                json!({}),
                status_for(&billing_issue, later),
                later,
            )
            .unwrap();

        assert_eq!(record.latest_purchase_at, latest);
        // original_purchase_at tracks whatever the event reported.
        assert_eq!(
            record.original_purchase_at.unwrap().as_unix_millis(),
            1_699_500_000_000
        );
    }

    #[test]
    fn renewal_advances_latest_purchase_at() {
        let purchase = LifecycleEventBuilder::new()
            .purchased_at_ms(1_699_000_000_000)
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());

        let renewal = LifecycleEventBuilder::new()
            .event_type("RENEWAL")
            .purchased_at_ms(1_701_000_000_000)
            .expires_at(now().add_days(60))
            .build();
        let later = now().add_days(30);
        record
            .apply_event(&renewal, json!({}), status_for(&renewal, later), later)
            .unwrap();

        assert_eq!(
            record.latest_purchase_at.unwrap().as_unix_millis(),
            1_701_000_000_000
        );
    }

    #[test]
    fn apply_replaces_raw_event_payload() {
        let purchase = LifecycleEventBuilder::new().build();
        let mut record = record_from(&purchase, now());

        let renewal = LifecycleEventBuilder::new().event_type("RENEWAL").build();
        record
            .apply_event(
                &renewal,
                json!({"second": true}),
                status_for(&renewal, now()),
                now(),
            )
            .unwrap();

        assert_eq!(record.raw_last_event, json!({"second": true}));
        assert_eq!(record.last_event_type, "RENEWAL");
    }

    // ══════════════════════════════════════════════════════════════
    // Idempotence
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn replaying_an_event_reproduces_the_same_state() {
        let purchase = LifecycleEventBuilder::new()
            .expires_at(now().add_days(30))
            .build();
        let mut record = record_from(&purchase, now());

        let cancellation = LifecycleEventBuilder::new()
            .event_type("CANCELLATION")
            .expires_at(now().add_days(30))
            .build();
        let at = now().add_days(1);

        record
            .apply_event(
                &cancellation,
                json!({}),
                status_for(&cancellation, at),
                at,
            )
            .unwrap();
        let first_pass = record.clone();

        record
            .apply_event(
                &cancellation,
                json!({}),
                status_for(&cancellation, at),
                at,
            )
            .unwrap();

        assert_eq!(record.is_active, first_pass.is_active);
        assert_eq!(record.will_renew, first_pass.will_renew);
        assert_eq!(record.expires_at, first_pass.expires_at);
        assert_eq!(record.cancelled_at, first_pass.cancelled_at);
        assert_eq!(record, first_pass);
    }

    #[test]
    fn purchase_types_are_flagged_for_latest_purchase() {
        assert!(EventType::InitialPurchase.is_purchase());
        assert!(EventType::Renewal.is_purchase());
        assert!(!EventType::Expiration.is_purchase());
    }
}
