//! Ballot ledger.
//!
//! One write-once choice per (proposal, voter). An absent entry reads as
//! `VoteChoice::None`. Ballots are kept for every proposal, including
//! abstentions, so the ledger doubles as the voting audit record.

use super::error::{GovernanceError, GovernanceResult};
use super::proposals::ProposalId;
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A voter's recorded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoteChoice {
    #[default]
    None,
    For,
    Against,
    Abstain,
}

impl VoteChoice {
    pub fn is_cast(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::For => "for",
            Self::Against => "against",
            Self::Abstain => "abstain",
        };
        f.write_str(s)
    }
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "for" | "yes" => Ok(Self::For),
            "against" | "no" => Ok(Self::Against),
            "abstain" => Ok(Self::Abstain),
            other => Err(format!(
                "Unknown vote choice: {}. Use 'for', 'against' or 'abstain'.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BallotLedger {
    ballots: BTreeMap<ProposalId, BTreeMap<AccountId, VoteChoice>>,
}

impl BallotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, proposal_id: ProposalId, voter: &AccountId) -> VoteChoice {
        self.ballots
            .get(&proposal_id)
            .and_then(|by_voter| by_voter.get(voter))
            .copied()
            .unwrap_or_default()
    }

    /// Fail unless `choice` could be recorded for `voter`.
    pub fn check_record(
        &self,
        proposal_id: ProposalId,
        voter: &AccountId,
        choice: VoteChoice,
    ) -> GovernanceResult<()> {
        if !choice.is_cast() {
            return Err(GovernanceError::InvalidVoteChoice);
        }
        if self.get(proposal_id, voter).is_cast() {
            return Err(GovernanceError::AlreadyVoted);
        }
        Ok(())
    }

    pub(crate) fn record(
        &mut self,
        proposal_id: ProposalId,
        voter: AccountId,
        choice: VoteChoice,
    ) -> GovernanceResult<()> {
        self.check_record(proposal_id, &voter, choice)?;
        self.ballots
            .entry(proposal_id)
            .or_default()
            .insert(voter, choice);
        Ok(())
    }

    /// All recorded ballots for a proposal, ordered by voter.
    pub fn ballots_for(&self, proposal_id: ProposalId) -> Vec<(AccountId, VoteChoice)> {
        self.ballots
            .get(&proposal_id)
            .map(|by_voter| {
                by_voter
                    .iter()
                    .map(|(voter, choice)| (voter.clone(), *choice))
                    .collect()
            })
            .unwrap_or_default()
    }
}
