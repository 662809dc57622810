//! IdentityStore port - Lookup of account identities for inbound events.
//!
//! Lifecycle events carry the app user id assigned at client registration.
//! This port answers whether that id maps to a known account before any
//! subscription state is written.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::subscription::StoreError;

/// Identity mapping between an account and the app user id carried on events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Primary account identifier in the backing store.
    pub account_id: String,

    /// App user id as carried on inbound events.
    pub user_id: UserId,
}

/// Port for resolving app user ids to known accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the identity mapped to an app user id.
    ///
    /// Returns `None` when no account is mapped to the id. A missing mapping
    /// is not an error; callers decide whether to skip or fail.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Identity>, StoreError>;
}
