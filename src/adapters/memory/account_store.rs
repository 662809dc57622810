//! In-memory account store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{PremiumSummary, StoreError};
use crate::ports::{AccountStore, PremiumUpdate};

/// In-memory implementation of the AccountStore port.
///
/// Thread-safe via internal `Mutex`. Accounts are registered explicitly;
/// premium updates for unregistered users report `NoMatchingAccount`, the
/// same way a zero-row UPDATE does in PostgreSQL.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<String, PremiumSummary>>,
}

impl InMemoryAccountStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account row so premium updates have a target.
    pub fn register(&self, user_id: &UserId) {
        self.accounts
            .lock()
            .unwrap()
            .insert(user_id.as_str().to_string(), PremiumSummary::none());
    }

    /// Returns the stored premium state for a user.
    ///
    /// Useful for test assertions.
    pub fn premium_for(&self, user_id: &UserId) -> Option<PremiumSummary> {
        self.accounts.lock().unwrap().get(user_id.as_str()).cloned()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn update_premium(
        &self,
        user_id: &UserId,
        summary: &PremiumSummary,
    ) -> Result<PremiumUpdate, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(user_id.as_str()) {
            Some(existing) => {
                *existing = summary.clone();
                Ok(PremiumUpdate::Applied)
            }
            None => Ok(PremiumUpdate::NoMatchingAccount),
        }
    }
}
