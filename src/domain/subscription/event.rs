//! Subscription lifecycle event types.
//!
//! Defines the structure of the decoded billing notification payload.
//! Only fields relevant to reconciliation are captured; timestamps arrive
//! as Unix epoch milliseconds.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Lifecycle event delivered by the billing notification source.
///
/// All fields are optional at this stage. The dispatcher validates presence
/// before any state is derived, so absence becomes a typed outcome rather
/// than a runtime surprise.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleEvent {
    /// Raw event type string (e.g. "INITIAL_PURCHASE").
    #[serde(rename = "type")]
    pub event_type: Option<String>,

    /// Identity key assigned by the billing source.
    pub app_user_id: Option<String>,

    /// Product SKU the event refers to.
    pub product_id: Option<String>,

    /// Entitlements granted by the product. Preferred over the
    /// deprecated singular field.
    pub entitlement_ids: Option<Vec<String>>,

    /// Deprecated single-entitlement fallback.
    pub entitlement_id: Option<String>,

    /// Storefront the purchase was made on (e.g. "APP_STORE").
    pub store: Option<String>,

    /// Billing period classification (e.g. "NORMAL", "TRIAL").
    pub period_type: Option<String>,

    /// Purchase instant, epoch milliseconds.
    pub purchased_at_ms: Option<i64>,

    /// Expiry instant, epoch milliseconds. Absent for non-expiring grants.
    pub expiration_at_ms: Option<i64>,

    /// End of the billing grace period, epoch milliseconds.
    pub grace_period_expiration_at_ms: Option<i64>,

    /// Store transaction identifier.
    pub transaction_id: Option<String>,

    /// Identifier of the first transaction in the renewal chain.
    pub original_transaction_id: Option<String>,

    /// Vendor-reported cancellation reason.
    pub cancel_reason: Option<String>,

    /// Vendor-reported expiration reason.
    pub expiration_reason: Option<String>,

    /// Unique event identifier assigned by the source.
    pub id: Option<String>,

    /// Instant the source generated the event, epoch milliseconds.
    pub event_timestamp_ms: Option<i64>,
}

impl LifecycleEvent {
    /// Parses the event type into a known enum variant.
    pub fn parsed_type(&self) -> EventType {
        self.event_type
            .as_deref()
            .map(EventType::from_str)
            .unwrap_or(EventType::Unknown)
    }

    /// Returns the raw event type string, or "UNKNOWN" when absent.
    pub fn event_type_label(&self) -> &str {
        self.event_type.as_deref().unwrap_or("UNKNOWN")
    }

    /// Computes the set of entitlements this event refers to.
    ///
    /// The plural field wins when it is present and non-empty; otherwise
    /// the deprecated singular field contributes a one-element set. Order
    /// is preserved as delivered.
    pub fn entitlement_set(&self) -> Vec<String> {
        match &self.entitlement_ids {
            Some(ids) if !ids.is_empty() => ids.clone(),
            _ => self
                .entitlement_id
                .clone()
                .map(|id| vec![id])
                .unwrap_or_default(),
        }
    }

    /// Purchase instant as a timestamp.
    pub fn purchased_at(&self) -> Option<Timestamp> {
        self.purchased_at_ms.and_then(Timestamp::from_unix_millis)
    }

    /// Expiry instant as a timestamp.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expiration_at_ms.and_then(Timestamp::from_unix_millis)
    }

    /// Grace period end as a timestamp.
    pub fn grace_period_expires_at(&self) -> Option<Timestamp> {
        self.grace_period_expiration_at_ms
            .and_then(Timestamp::from_unix_millis)
    }

    /// Source-side event instant as a timestamp.
    pub fn event_timestamp(&self) -> Option<Timestamp> {
        self.event_timestamp_ms.and_then(Timestamp::from_unix_millis)
    }
}

/// Known lifecycle event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// First purchase of a subscription product.
    InitialPurchase,
    /// Successful renewal of an existing subscription.
    Renewal,
    /// Auto-renewal was switched off; access continues until expiry.
    Cancellation,
    /// A previous cancellation was reverted before expiry.
    Uncancellation,
    /// The subscription lapsed.
    Expiration,
    /// A renewal charge failed; the grace period may retain access.
    BillingIssue,
    /// The subscription was paused by the user or store.
    SubscriptionPaused,
    /// The subscriber switched to a different product.
    ProductChange,
    /// Synthetic event sent from the source's dashboard.
    Test,
    /// Unrecognized event type.
    Unknown,
}

impl EventType {
    /// Parse event type from the wire string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "INITIAL_PURCHASE" => Self::InitialPurchase,
            "RENEWAL" => Self::Renewal,
            "CANCELLATION" => Self::Cancellation,
            "UNCANCELLATION" => Self::Uncancellation,
            "EXPIRATION" => Self::Expiration,
            "BILLING_ISSUE" => Self::BillingIssue,
            "SUBSCRIPTION_PAUSED" => Self::SubscriptionPaused,
            "PRODUCT_CHANGE" => Self::ProductChange,
            "TEST" => Self::Test,
            _ => Self::Unknown,
        }
    }

    /// Convert to the wire event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialPurchase => "INITIAL_PURCHASE",
            Self::Renewal => "RENEWAL",
            Self::Cancellation => "CANCELLATION",
            Self::Uncancellation => "UNCANCELLATION",
            Self::Expiration => "EXPIRATION",
            Self::BillingIssue => "BILLING_ISSUE",
            Self::SubscriptionPaused => "SUBSCRIPTION_PAUSED",
            Self::ProductChange => "PRODUCT_CHANGE",
            Self::Test => "TEST",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true if events of this type update subscription state.
    ///
    /// TEST events and unrecognized types are acknowledged without
    /// reconciliation.
    pub fn routes_to_reconciliation(&self) -> bool {
        !matches!(self, Self::Test | Self::Unknown)
    }

    /// Returns true for event types that represent a fresh purchase,
    /// which are the only ones that advance `latest_purchase_at`.
    pub fn is_purchase(&self) -> bool {
        matches!(self, Self::InitialPurchase | Self::Renewal)
    }
}

/// Builder for creating test LifecycleEvent instances.
#[cfg(test)]
pub struct LifecycleEventBuilder {
    event_type: Option<String>,
    app_user_id: Option<String>,
    product_id: Option<String>,
    entitlement_ids: Option<Vec<String>>,
    entitlement_id: Option<String>,
    store: Option<String>,
    period_type: Option<String>,
    purchased_at_ms: Option<i64>,
    expiration_at_ms: Option<i64>,
    grace_period_expiration_at_ms: Option<i64>,
    id: Option<String>,
    event_timestamp_ms: Option<i64>,
}

#[cfg(test)]
impl Default for LifecycleEventBuilder {
    fn default() -> Self {
        Self {
            event_type: Some("INITIAL_PURCHASE".to_string()),
            app_user_id: Some("user-123".to_string()),
            product_id: Some("premium_monthly".to_string()),
            entitlement_ids: Some(vec!["pro".to_string()]),
            entitlement_id: None,
            store: Some("APP_STORE".to_string()),
            period_type: Some("NORMAL".to_string()),
            purchased_at_ms: Some(1_700_000_000_000),
            expiration_at_ms: None,
            grace_period_expiration_at_ms: None,
            id: Some("evt-test-1".to_string()),
            event_timestamp_ms: Some(1_700_000_000_000),
        }
    }
}

#[cfg(test)]
impl LifecycleEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn no_event_type(mut self) -> Self {
        self.event_type = None;
        self
    }

    pub fn app_user_id(mut self, id: impl Into<String>) -> Self {
        self.app_user_id = Some(id.into());
        self
    }

    pub fn no_app_user_id(mut self) -> Self {
        self.app_user_id = None;
        self
    }

    pub fn product_id(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    pub fn no_product_id(mut self) -> Self {
        self.product_id = None;
        self
    }

    pub fn entitlement_ids(mut self, ids: Vec<&str>) -> Self {
        self.entitlement_ids = Some(ids.into_iter().map(String::from).collect());
        self
    }

    pub fn no_entitlement_ids(mut self) -> Self {
        self.entitlement_ids = None;
        self
    }

    pub fn entitlement_id(mut self, id: impl Into<String>) -> Self {
        self.entitlement_id = Some(id.into());
        self
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn period_type(mut self, period_type: impl Into<String>) -> Self {
        self.period_type = Some(period_type.into());
        self
    }

    pub fn purchased_at_ms(mut self, ms: i64) -> Self {
        self.purchased_at_ms = Some(ms);
        self
    }

    pub fn expiration_at_ms(mut self, ms: i64) -> Self {
        self.expiration_at_ms = Some(ms);
        self
    }

    pub fn expires_at(mut self, ts: Timestamp) -> Self {
        self.expiration_at_ms = Some(ts.as_unix_millis());
        self
    }

    pub fn grace_period_expiration_at_ms(mut self, ms: i64) -> Self {
        self.grace_period_expiration_at_ms = Some(ms);
        self
    }

    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn build(self) -> LifecycleEvent {
        LifecycleEvent {
            event_type: self.event_type,
            app_user_id: self.app_user_id,
            product_id: self.product_id,
            entitlement_ids: self.entitlement_ids,
            entitlement_id: self.entitlement_id,
            store: self.store,
            period_type: self.period_type,
            purchased_at_ms: self.purchased_at_ms,
            expiration_at_ms: self.expiration_at_ms,
            grace_period_expiration_at_ms: self.grace_period_expiration_at_ms,
            transaction_id: None,
            original_transaction_id: None,
            cancel_reason: None,
            expiration_reason: None,
            id: self.id,
            event_timestamp_ms: self.event_timestamp_ms,
        }
    }
}
