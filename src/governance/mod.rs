//! Bi-college price governance.
//!
//! Producers and consumers vote on a single shared price. Each college owns
//! half of the vote regardless of its size, and every change goes through a
//! fixed six-phase workflow driven by administrators:
//!
//! RegisteringVoters -> ProposalRegistrationStarted -> ProposalRegistrationEnded
//! -> VotingSessionStarted -> VotingSessionEnded -> VotesTallied -> (reset)
//!
//! [`GovernanceEngine`] is the single coordinator; the component modules are
//! public for their types and read APIs, while mutation stays crate-private.

pub mod access;
pub mod ballots;
pub mod engine;
pub mod error;
pub mod events;
pub mod membership;
pub mod proposals;
pub mod weighting;
pub mod workflow;

#[cfg(test)]
mod proptests;

/// Price scalar. Zero is never a valid price.
pub type Price = u64;

pub use access::Capability;
pub use ballots::VoteChoice;
pub use engine::{ExecutionOutcome, GovernanceEngine};
pub use error::{GovernanceError, GovernanceResult};
pub use events::{EventKind, EventQuery, EventRecord, GovernanceEvent};
pub use membership::{College, MemberCounts};
pub use proposals::{Proposal, ProposalId, ProposalStatus, VoteCounts};
pub use weighting::{WeightedTally, BASIS_POINTS, COLLEGE_SHARE};
pub use workflow::WorkflowPhase;
