//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresSubscriptionStore` - Per-entitlement subscription rows
//! - `PostgresIdentityStore` - Identity lookups against the users table
//! - `PostgresAccountStore` - Premium state projection onto the users table

mod account_store;
mod identity_store;
mod subscription_store;

pub use account_store::PostgresAccountStore;
pub use identity_store::PostgresIdentityStore;
pub use subscription_store::PostgresSubscriptionStore;
