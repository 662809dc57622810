//! PostgreSQL implementation of SubscriptionStore.
//!
//! One row per (app_user_id, entitlement_id) pair in the `subscriptions`
//! table. Updates overwrite the event-derived columns whole, so the row
//! always mirrors the most recent event applied to the pair.

use crate::domain::foundation::{EntitlementId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{StoreError, SubscriptionRecord};
use crate::ports::SubscriptionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    app_user_id: String,
    entitlement_id: String,
    product_id: String,
    is_active: bool,
    will_renew: Option<bool>,
    store: Option<String>,
    period_type: Option<String>,
    original_purchase_at: Option<DateTime<Utc>>,
    latest_purchase_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    last_event_type: String,
    last_event_at: DateTime<Utc>,
    last_event_id: Option<String>,
    raw_last_event: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = StoreError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionRecord {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::new(row.app_user_id)
                .map_err(|e| StoreError::read(format!("invalid app_user_id in row: {}", e)))?,
            entitlement_id: EntitlementId::new(row.entitlement_id)
                .map_err(|e| StoreError::read(format!("invalid entitlement_id in row: {}", e)))?,
            product_id: row.product_id,
            is_active: row.is_active,
            will_renew: row.will_renew,
            store: row.store,
            period_type: row.period_type,
            original_purchase_at: row.original_purchase_at.map(Timestamp::from_datetime),
            latest_purchase_at: row.latest_purchase_at.map(Timestamp::from_datetime),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            last_event_type: row.last_event_type,
            last_event_at: Timestamp::from_datetime(row.last_event_at),
            last_event_id: row.last_event_id,
            raw_last_event: row.raw_last_event,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn optional_datetime(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn find_by_user_and_entitlement(
        &self,
        user_id: &UserId,
        entitlement_id: &EntitlementId,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, app_user_id, entitlement_id, product_id, is_active, will_renew,
                   store, period_type, original_purchase_at, latest_purchase_at,
                   expires_at, cancelled_at, last_event_type, last_event_at,
                   last_event_id, raw_last_event, created_at, updated_at
            FROM subscriptions
            WHERE app_user_id = $1 AND entitlement_id = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(entitlement_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::read(format!("failed to load subscription: {}", e)))?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, app_user_id, entitlement_id, product_id, is_active, will_renew,
                store, period_type, original_purchase_at, latest_purchase_at,
                expires_at, cancelled_at, last_event_type, last_event_at,
                last_event_id, raw_last_event, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(record.entitlement_id.as_str())
        .bind(&record.product_id)
        .bind(record.is_active)
        .bind(record.will_renew)
        .bind(&record.store)
        .bind(&record.period_type)
        .bind(optional_datetime(record.original_purchase_at))
        .bind(optional_datetime(record.latest_purchase_at))
        .bind(optional_datetime(record.expires_at))
        .bind(optional_datetime(record.cancelled_at))
        .bind(&record.last_event_type)
        .bind(record.last_event_at.as_datetime())
        .bind(&record.last_event_id)
        .bind(&record.raw_last_event)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(format!("failed to insert subscription: {}", e)))?;

        Ok(())
    }

    async fn update(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                product_id = $2,
                is_active = $3,
                will_renew = $4,
                store = $5,
                period_type = $6,
                original_purchase_at = $7,
                latest_purchase_at = $8,
                expires_at = $9,
                cancelled_at = $10,
                last_event_type = $11,
                last_event_at = $12,
                last_event_id = $13,
                raw_last_event = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.product_id)
        .bind(record.is_active)
        .bind(record.will_renew)
        .bind(&record.store)
        .bind(&record.period_type)
        .bind(optional_datetime(record.original_purchase_at))
        .bind(optional_datetime(record.latest_purchase_at))
        .bind(optional_datetime(record.expires_at))
        .bind(optional_datetime(record.cancelled_at))
        .bind(&record.last_event_type)
        .bind(record.last_event_at.as_datetime())
        .bind(&record.last_event_id)
        .bind(&record.raw_last_event)
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(format!("failed to update subscription: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::write(format!(
                "no subscription row with id {}",
                record.id
            )));
        }

        Ok(())
    }

    async fn find_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SubscriptionRecord>, StoreError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, app_user_id, entitlement_id, product_id, is_active, will_renew,
                   store, period_type, original_purchase_at, latest_purchase_at,
                   expires_at, cancelled_at, last_event_type, last_event_at,
                   last_event_id, raw_last_event, created_at, updated_at
            FROM subscriptions
            WHERE app_user_id = $1 AND is_active = TRUE
            ORDER BY expires_at DESC NULLS FIRST
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(format!("failed to load active subscriptions: {}", e)))?;

        rows.into_iter().map(SubscriptionRecord::try_from).collect()
    }
}
