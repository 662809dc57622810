//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod dispatch_event;
pub mod reconcile_entitlement;
pub mod recompute_premium;

pub use dispatch_event::{DispatchEventCommand, DispatchEventHandler, DispatchOutcome};
pub use reconcile_entitlement::{ReconcileEntitlementCommand, ReconcileEntitlementHandler};
pub use recompute_premium::RecomputePremiumHandler;
