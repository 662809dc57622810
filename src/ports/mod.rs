//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `IdentityStore` - Resolution of app user ids to known accounts
//! - `SubscriptionStore` - Persistence for per-entitlement subscription records
//! - `AccountStore` - Projection of derived premium state onto account profiles

mod account_store;
mod identity_store;
mod subscription_store;

pub use account_store::{AccountStore, PremiumUpdate};
pub use identity_store::{Identity, IdentityStore};
pub use subscription_store::SubscriptionStore;
