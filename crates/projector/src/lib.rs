//! Balance projection: the single source of truth for stock state.
//!
//! Everything here is a pure function of (catalog snapshot, movement
//! history). No hidden state, fully re-derivable at any time — which is what
//! makes it safe to recompute on every query instead of trusting any cached
//! field. The write-back half (compare-and-set against the store) lives in
//! the infra layer; this crate only *plans* corrections.

pub mod projection;
pub mod reconcile;
pub mod resolve;

pub use projection::{ProductBalance, ProjectionReport, project_all, project_product};
pub use reconcile::{
    BALANCE_TOLERANCE, BalanceCorrection, plan_corrections, plan_corrections_with_tolerance,
};
pub use resolve::{OrphanMovement, OrphanReason, Resolution, resolve_product_ref};
