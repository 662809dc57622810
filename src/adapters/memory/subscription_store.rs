//! In-memory subscription store.
//!
//! Volatile implementation of the `SubscriptionStore` port. Useful for
//! integration tests and local development without a database. For
//! production deployments use the PostgreSQL-backed implementation instead.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{EntitlementId, UserId};
use crate::domain::subscription::{StoreError, SubscriptionRecord};
use crate::ports::SubscriptionStore;

/// In-memory implementation of the SubscriptionStore port.
///
/// Thread-safe via internal `Mutex`. Keyed on (user_id, entitlement_id),
/// mirroring the unique constraint of the PostgreSQL table. Does not
/// persist data across restarts.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: Mutex<HashMap<(String, String), SubscriptionRecord>>,
}

impl InMemorySubscriptionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored records.
    ///
    /// Useful for testing and debugging.
    pub fn records(&self) -> Vec<SubscriptionRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Returns true if no records exist.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    fn key(record: &SubscriptionRecord) -> (String, String) {
        (
            record.user_id.as_str().to_string(),
            record.entitlement_id.as_str().to_string(),
        )
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find_by_user_and_entitlement(
        &self,
        user_id: &UserId,
        entitlement_id: &EntitlementId,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let key = (
            user_id.as_str().to_string(),
            entitlement_id.as_str().to_string(),
        );
        Ok(records.get(&key).cloned())
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = Self::key(record);
        if records.contains_key(&key) {
            return Err(StoreError::write(format!(
                "subscription already exists for {}/{}",
                key.0, key.1
            )));
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn update(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = Self::key(record);
        match records.get_mut(&key) {
            Some(existing) if existing.id == record.id => {
                *existing = record.clone();
                Ok(())
            }
            _ => Err(StoreError::write(format!(
                "no subscription row with id {}",
                record.id
            ))),
        }
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SubscriptionRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut active: Vec<SubscriptionRecord> = records
            .values()
            .filter(|r| &r.user_id == user_id && r.is_active)
            .cloned()
            .collect();
        // Latest expiry first, open-ended grants ahead of everything.
        active.sort_by(|a, b| match (&a.expires_at, &b.expires_at) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(x),
        });
        Ok(active)
    }
}
