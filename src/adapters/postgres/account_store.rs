//! PostgreSQL implementation of AccountStore.

use crate::domain::foundation::UserId;
use crate::domain::subscription::{PremiumSummary, StoreError};
use crate::ports::{AccountStore, PremiumUpdate};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the AccountStore port.
///
/// Projects premium state onto the `users` table, keyed by the billing
/// identity. A missing row is reported as `NoMatchingAccount` rather than
/// a write failure; the account system may not have seen this user yet.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a new PostgresAccountStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn update_premium(
        &self,
        user_id: &UserId,
        summary: &PremiumSummary,
    ) -> Result<PremiumUpdate, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                is_premium = $2,
                premium_expires_at = $3,
                premium_will_renew = $4,
                updated_at = NOW()
            WHERE app_user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(summary.is_premium)
        .bind(summary.premium_expires_at.map(|ts| *ts.as_datetime()))
        .bind(summary.premium_will_renew)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(format!("failed to update premium state: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(PremiumUpdate::NoMatchingAccount);
        }

        Ok(PremiumUpdate::Applied)
    }
}
