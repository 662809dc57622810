//! Entitlement status resolution.
//!
//! Pure derivation of the stored status fields from an event type and its
//! timestamps. No I/O; "now" is an explicit input so the derivation stays
//! deterministic and testable.

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::EventType;

/// Directive for the stored `cancelled_at` field.
///
/// The reconciler writes the full field set on every event, so "leave it
/// alone" has to be expressed explicitly rather than by omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledAtChange {
    /// Reset to no cancellation.
    Clear,
    /// Record the cancellation instant.
    Set(Timestamp),
    /// Carry the previously stored value forward.
    Unchanged,
}

impl CancelledAtChange {
    /// Applies the directive to the previously stored value.
    pub fn apply(&self, existing: Option<Timestamp>) -> Option<Timestamp> {
        match self {
            CancelledAtChange::Clear => None,
            CancelledAtChange::Set(at) => Some(*at),
            CancelledAtChange::Unchanged => existing,
        }
    }
}

/// Status fields derived from a single lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStatus {
    pub is_active: bool,
    pub will_renew: Option<bool>,
    pub cancelled_at: CancelledAtChange,
}

impl ResolvedStatus {
    /// Derives the status for one entitlement from an event.
    ///
    /// Purchase-family events without an expiry grant open-ended access;
    /// every other type without an expiry resolves inactive, so an event
    /// that models nothing perpetual never grants unearned access.
    pub fn resolve(
        event_type: EventType,
        expires_at: Option<Timestamp>,
        grace_period_expires_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        match event_type {
            EventType::InitialPurchase | EventType::Renewal | EventType::Uncancellation => Self {
                is_active: expires_at.map_or(true, |at| at.is_after(&now)),
                will_renew: Some(true),
                cancelled_at: CancelledAtChange::Clear,
            },
            EventType::Cancellation => Self {
                is_active: expires_at.map_or(false, |at| at.is_after(&now)),
                will_renew: Some(false),
                cancelled_at: CancelledAtChange::Set(now),
            },
            EventType::Expiration => Self {
                is_active: false,
                will_renew: Some(false),
                cancelled_at: CancelledAtChange::Unchanged,
            },
            EventType::BillingIssue => Self {
                is_active: grace_period_expires_at.map_or(false, |at| at.is_after(&now)),
                will_renew: Some(true),
                cancelled_at: CancelledAtChange::Unchanged,
            },
            EventType::SubscriptionPaused => Self {
                is_active: false,
                will_renew: Some(true),
                cancelled_at: CancelledAtChange::Unchanged,
            },
            EventType::ProductChange | EventType::Test | EventType::Unknown => {
                let is_active = expires_at.map_or(false, |at| at.is_after(&now));
                Self {
                    is_active,
                    will_renew: Some(is_active),
                    cancelled_at: CancelledAtChange::Unchanged,
                }
            }
        }
    }
}
