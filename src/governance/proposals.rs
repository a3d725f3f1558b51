//! Proposal store.
//!
//! Ids start at 1 and are never reused. At most one proposal is open
//! (`Pending` or `Active`) at a time; every earlier proposal is `Applied`.
//! Records are never deleted.

use super::ballots::VoteChoice;
use super::error::{GovernanceError, GovernanceResult};
use super::membership::{College, MemberCounts};
use super::weighting::WeightedTally;
use super::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ProposalId = u64;

/// Lifecycle of a single proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Registered, voting not yet open.
    Pending,
    /// Voting session opened; ballots are accepted while the phase allows it.
    Active,
    /// Executed. Terminal.
    Applied {
        tally: WeightedTally,
        price_changed: bool,
    },
}

/// Raw for/against counters per college. Abstentions are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounts {
    pub producers_for: u64,
    pub producers_against: u64,
    pub consumers_for: u64,
    pub consumers_against: u64,
}

impl VoteCounts {
    pub fn producers_cast(&self) -> u64 {
        self.producers_for + self.producers_against
    }

    pub fn consumers_cast(&self) -> u64 {
        self.consumers_for + self.consumers_against
    }

    fn increment(&mut self, college: College, choice: VoteChoice) {
        match (college, choice) {
            (College::Producer, VoteChoice::For) => self.producers_for += 1,
            (College::Producer, VoteChoice::Against) => self.producers_against += 1,
            (College::Consumer, VoteChoice::For) => self.consumers_for += 1,
            (College::Consumer, VoteChoice::Against) => self.consumers_against += 1,
            (_, VoteChoice::Abstain | VoteChoice::None) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub value: Price,
    pub status: ProposalStatus,
    /// College sizes when the proposal was created. Informational only.
    pub snapshot: MemberCounts,
    pub votes: VoteCounts,
}

impl Proposal {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, ProposalStatus::Applied { .. })
    }

    pub fn is_open(&self) -> bool {
        !self.is_applied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    last_id: ProposalId,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// The open proposal, if any.
    pub fn current(&self) -> Option<&Proposal> {
        self.proposals.values().next_back().filter(|p| p.is_open())
    }

    /// Highest id handed out so far (0 before the first proposal).
    pub fn last_id(&self) -> ProposalId {
        self.last_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn check_create(&self, value: Price) -> GovernanceResult<()> {
        if self.current().is_some() {
            return Err(GovernanceError::ProposalAlreadyExists);
        }
        if value == 0 {
            return Err(GovernanceError::InvalidPrice);
        }
        Ok(())
    }

    pub(crate) fn create(&mut self, value: Price, snapshot: MemberCounts) -> GovernanceResult<ProposalId> {
        self.check_create(value)?;
        let id = self.last_id + 1;
        self.last_id = id;
        self.proposals.insert(
            id,
            Proposal {
                id,
                value,
                status: ProposalStatus::Pending,
                snapshot,
                votes: VoteCounts::default(),
            },
        );
        Ok(id)
    }

    fn current_mut(&mut self) -> GovernanceResult<&mut Proposal> {
        self.proposals
            .values_mut()
            .next_back()
            .filter(|p| p.is_open())
            .ok_or(GovernanceError::NoActiveProposal)
    }

    /// Open the current proposal for voting.
    pub(crate) fn activate(&mut self) -> GovernanceResult<ProposalId> {
        let proposal = self.current_mut()?;
        proposal.status = ProposalStatus::Active;
        Ok(proposal.id)
    }

    pub(crate) fn count_vote(&mut self, college: College, choice: VoteChoice) -> GovernanceResult<ProposalId> {
        let proposal = self.current_mut()?;
        proposal.votes.increment(college, choice);
        Ok(proposal.id)
    }

    /// Close proposal `id`. `applied` flips exactly once here: an id that
    /// is already applied fails with `ProposalAlreadyApplied`.
    pub(crate) fn mark_applied(
        &mut self,
        id: ProposalId,
        tally: WeightedTally,
        price_changed: bool,
    ) -> GovernanceResult<&Proposal> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::NoActiveProposal)?;
        if proposal.is_applied() {
            return Err(GovernanceError::ProposalAlreadyApplied);
        }
        proposal.status = ProposalStatus::Applied {
            tally,
            price_changed,
        };
        Ok(proposal)
    }
}
