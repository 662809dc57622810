//! In-memory identity store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::UserId;
use crate::domain::subscription::StoreError;
use crate::ports::{Identity, IdentityStore};

/// In-memory implementation of the IdentityStore port.
///
/// Thread-safe via internal `Mutex`. Identities are seeded explicitly;
/// lookups for unseeded users report no match, the same way an absent
/// users row does in PostgreSQL.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    identities: Mutex<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identity so later lookups find it.
    pub fn insert(&self, identity: Identity) {
        self.identities
            .lock()
            .unwrap()
            .insert(identity.user_id.as_str().to_string(), identity);
    }

    /// Returns the number of registered identities.
    pub fn len(&self) -> usize {
        self.identities.lock().unwrap().len()
    }

    /// Returns true if no identities are registered.
    pub fn is_empty(&self) -> bool {
        self.identities.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .get(user_id.as_str())
            .cloned())
    }
}
