//! Accord - Bi-College Price Governance
//!
//! Producers and consumers jointly set one shared price through a
//! six-phase proposal/vote/execute workflow.
//!
//! Key principles:
//! - Each college carries half of the decision, whatever its size
//! - A proposal passes only on a strict weighted majority
//! - Every operation checks capability, then phase, then its own rules
//! - A rejected operation changes nothing
//!
//! The engine is synchronous and owns no I/O; [`service::GovernanceService`]
//! hosts it behind a single writer and persists every committed mutation.

pub mod governance;
pub mod identity;
pub mod persistence;
pub mod serialization;
pub mod service;
