//! Activity tracking.
//!
//! The [`ActivityLedger`] is the single source of truth for idleness: the wake router
//! writes to it on every routed request, the idle sweeper reads it to pick stop candidates
//! and clears entries once a container is stopped. Nothing here survives a restart.

pub mod ledger;

pub use ledger::{AccessRecord, ActivityLedger};
