//! Simulation engines.  Everything here is synchronous and operates on a
//! borrowed [`crate::book::Book`], pushing the snapshots it invalidates into
//! an outbox for the caller to publish.

pub mod orders;
pub mod revaluation;
pub mod simulator;
