//! Governance error taxonomy.
//!
//! Every variant is a rejected operation. Checks run before any mutation, so
//! receiving an error always means the engine state is exactly as it was
//! before the call.

use super::workflow::WorkflowPhase;

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Governance errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernanceError {
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid price: proposed value must be nonzero")]
    InvalidPrice,

    #[error("Member already exists")]
    MemberAlreadyExists,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Membership is locked while voting is in progress")]
    VotingInProgress,

    #[error("Invalid workflow status: expected {expected}, current phase is {current}")]
    InvalidWorkflowStatus {
        expected: WorkflowPhase,
        current: WorkflowPhase,
    },

    #[error("A proposal is already active")]
    ProposalAlreadyExists,

    #[error("At least one producer and one consumer are required")]
    InsufficientMembers,

    #[error("No active proposal")]
    NoActiveProposal,

    #[error("Invalid vote choice")]
    InvalidVoteChoice,

    #[error("Already voted on this proposal")]
    AlreadyVoted,

    #[error("Proposal already applied")]
    ProposalAlreadyApplied,

    #[error("Unauthorized operation")]
    Unauthorized,

    #[error("Administrator already exists")]
    AdministratorAlreadyExists,

    #[error("Administrator not found")]
    AdministratorNotFound,

    #[error("Cannot revoke the last administrator")]
    LastAdministrator,
}

impl GovernanceError {
    /// Stable kind name, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "InvalidAddress",
            Self::InvalidPrice => "InvalidPrice",
            Self::MemberAlreadyExists => "MemberAlreadyExists",
            Self::MemberNotFound => "MemberNotFound",
            Self::VotingInProgress => "VotingInProgress",
            Self::InvalidWorkflowStatus { .. } => "InvalidWorkflowStatus",
            Self::ProposalAlreadyExists => "ProposalAlreadyExists",
            Self::InsufficientMembers => "InsufficientMembers",
            Self::NoActiveProposal => "NoActiveProposal",
            Self::InvalidVoteChoice => "InvalidVoteChoice",
            Self::AlreadyVoted => "AlreadyVoted",
            Self::ProposalAlreadyApplied => "ProposalAlreadyApplied",
            Self::Unauthorized => "Unauthorized",
            Self::AdministratorAlreadyExists => "AdministratorAlreadyExists",
            Self::AdministratorNotFound => "AdministratorNotFound",
            Self::LastAdministrator => "LastAdministrator",
        }
    }
}
