//! Entitlement Sync - Subscription lifecycle event reconciliation.
//!
//! This crate receives billing lifecycle webhooks, reconciles them into
//! per-entitlement subscription records, and projects an account-level
//! premium summary.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
