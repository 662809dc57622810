//! SubscriptionStore port - Persistence for per-entitlement subscription records.
//!
//! One record exists per (user, entitlement) pair; the reconciler decides
//! between `insert` and `update` based on `find_by_user_and_entitlement`.
//! The port does not serialize concurrent read-modify-write cycles for the
//! same pair; two near-simultaneous events for one entitlement race as
//! last-write-wins unless the backing store adds its own keyed locking.

use async_trait::async_trait;

use crate::domain::foundation::{EntitlementId, UserId};
use crate::domain::subscription::{StoreError, SubscriptionRecord};

/// Port for storing and retrieving subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Find the record for a (user, entitlement) pair.
    ///
    /// Returns `None` when the pair has never been reconciled.
    async fn find_by_user_and_entitlement(
        &self,
        user_id: &UserId,
        entitlement_id: &EntitlementId,
    ) -> Result<Option<SubscriptionRecord>, StoreError>;

    /// Insert a new record.
    ///
    /// The (user, entitlement) pair must not already exist; implementations
    /// back this with a unique constraint.
    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), StoreError>;

    /// Update an existing record in place, matched by its id.
    async fn update(&self, record: &SubscriptionRecord) -> Result<(), StoreError>;

    /// Return every record currently marked active for a user.
    ///
    /// Ordering is unspecified; callers that need dominance ordering sort
    /// the returned set themselves.
    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SubscriptionRecord>, StoreError>;
}
