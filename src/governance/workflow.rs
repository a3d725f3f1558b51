//! Workflow phases.
//!
//! Six phases in a fixed cycle. The only backward edge is the reset from
//! `VotesTallied` to `RegisteringVoters`.

use super::error::{GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current step of the governance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowPhase {
    RegisteringVoters,
    ProposalRegistrationStarted,
    ProposalRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    VotesTallied,
}

impl WorkflowPhase {
    /// The single phase reachable from this one.
    pub fn successor(self) -> Self {
        match self {
            Self::RegisteringVoters => Self::ProposalRegistrationStarted,
            Self::ProposalRegistrationStarted => Self::ProposalRegistrationEnded,
            Self::ProposalRegistrationEnded => Self::VotingSessionStarted,
            Self::VotingSessionStarted => Self::VotingSessionEnded,
            Self::VotingSessionEnded => Self::VotesTallied,
            Self::VotesTallied => Self::RegisteringVoters,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisteringVoters => "RegisteringVoters",
            Self::ProposalRegistrationStarted => "ProposalRegistrationStarted",
            Self::ProposalRegistrationEnded => "ProposalRegistrationEnded",
            Self::VotingSessionStarted => "VotingSessionStarted",
            Self::VotingSessionEnded => "VotingSessionEnded",
            Self::VotesTallied => "VotesTallied",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the phase value. Only the engine holds one, and the phase only
/// moves through [`Workflow::advance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    phase: WorkflowPhase,
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            phase: WorkflowPhase::RegisteringVoters,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Fail with `InvalidWorkflowStatus` unless the current phase is `expected`.
    pub fn require(&self, expected: WorkflowPhase) -> GovernanceResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GovernanceError::InvalidWorkflowStatus {
                expected,
                current: self.phase,
            })
        }
    }

    /// Move from `from` to its successor. Returns `(previous, current)`.
    pub fn advance(&mut self, from: WorkflowPhase) -> GovernanceResult<(WorkflowPhase, WorkflowPhase)> {
        self.require(from)?;
        let next = from.successor();
        self.phase = next;
        Ok((from, next))
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}
