//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Lifecycle event reconciliation and premium aggregation

pub mod foundation;
pub mod subscription;
