//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL-backed store implementations
//! - `memory` - Volatile store implementations for tests and local runs
//! - `http` - Axum webhook intake and liveness endpoints

pub mod http;
pub mod memory;
pub mod postgres;
