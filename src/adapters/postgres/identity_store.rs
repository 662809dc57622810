//! PostgreSQL implementation of IdentityStore.

use crate::domain::foundation::UserId;
use crate::domain::subscription::StoreError;
use crate::ports::{Identity, IdentityStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the IdentityStore port.
///
/// Reads the `users` table owned by the account system. This adapter never
/// writes it; identity rows are created when a user registers.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Creates a new PostgresIdentityStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an identity.
#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    user_id: Uuid,
    app_user_id: String,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            account_id: row.user_id.to_string(),
            user_id: UserId::new(row.app_user_id)
                .map_err(|e| StoreError::read(format!("invalid app_user_id in row: {}", e)))?,
        })
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Identity>, StoreError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT user_id, app_user_id
            FROM users
            WHERE app_user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::read(format!("failed to look up identity: {}", e)))?;

        row.map(Identity::try_from).transpose()
    }
}
