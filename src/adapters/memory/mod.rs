//! In-memory adapters - Volatile implementations of the store ports.
//!
//! These back the integration tests and local development runs that have
//! no database. Production deployments use the PostgreSQL adapters.

mod account_store;
mod identity_store;
mod subscription_store;

pub use account_store::InMemoryAccountStore;
pub use identity_store::InMemoryIdentityStore;
pub use subscription_store::InMemorySubscriptionStore;
