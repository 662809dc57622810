//! AccountStore port - Projection of premium state onto account profiles.
//!
//! The premium aggregator recomputes a user's summary after every write and
//! pushes it here. The account row may legitimately not exist yet (events
//! can arrive before profile provisioning finishes), so the outcome reports
//! whether anything matched rather than treating a miss as an error.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{PremiumSummary, StoreError};

/// Result of applying a premium summary to an account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumUpdate {
    /// The account row was found and updated.
    Applied,
    /// No account row matched the user id.
    NoMatchingAccount,
}

/// Port for writing derived premium state to the account profile store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Overwrite the premium fields on the account row for `user_id`.
    ///
    /// Returns `PremiumUpdate::NoMatchingAccount` when no row matched;
    /// callers log and continue rather than failing the event.
    async fn update_premium(
        &self,
        user_id: &UserId,
        summary: &PremiumSummary,
    ) -> Result<PremiumUpdate, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory implementation for testing.
    struct InMemoryAccountStore {
        accounts: RwLock<HashMap<String, PremiumSummary>>,
    }

    impl InMemoryAccountStore {
        fn new() -> Self {
            Self {
                accounts: RwLock::new(HashMap::new()),
            }
        }

        async fn provision(&self, user_id: &UserId) {
            let mut accounts = self.accounts.write().await;
            accounts.insert(user_id.as_str().to_string(), PremiumSummary::none());
        }
    }

    #[async_trait]
    impl AccountStore for InMemoryAccountStore {
        async fn update_premium(
            &self,
            user_id: &UserId,
            summary: &PremiumSummary,
        ) -> Result<PremiumUpdate, StoreError> {
            let mut accounts = self.accounts.write().await;
            match accounts.get_mut(user_id.as_str()) {
                Some(existing) => {
                    *existing = summary.clone();
                    Ok(PremiumUpdate::Applied)
                }
                None => Ok(PremiumUpdate::NoMatchingAccount),
            }
        }
    }

    fn user_id(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn update_against_missing_account_reports_no_match() {
        let store = InMemoryAccountStore::new();

        let outcome = store
            .update_premium(&user_id("user-404"), &PremiumSummary::none())
            .await
            .unwrap();

        assert_eq!(outcome, PremiumUpdate::NoMatchingAccount);
    }

    #[tokio::test]
    async fn update_against_provisioned_account_applies() {
        let store = InMemoryAccountStore::new();
        let id = user_id("user-1");
        store.provision(&id).await;

        let summary = PremiumSummary {
            is_premium: true,
            premium_expires_at: None,
            premium_will_renew: Some(true),
        };
        let outcome = store.update_premium(&id, &summary).await.unwrap();

        assert_eq!(outcome, PremiumUpdate::Applied);
        let accounts = store.accounts.read().await;
        assert_eq!(accounts.get("user-1"), Some(&summary));
    }

    #[test]
    fn account_store_is_object_safe() {
        fn _assert_object_safe(_: &dyn AccountStore) {}
    }
}
