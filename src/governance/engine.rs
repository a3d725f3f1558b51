//! Governance coordinator.
//!
//! `GovernanceEngine` owns every component and is the only way to mutate
//! them. Each operation runs its checks in a fixed order (capability, phase,
//! operation-specific) and only mutates once all of them have passed, so a
//! returned error always leaves the engine untouched.

use super::access::{AccessControl, Capability};
use super::ballots::{BallotLedger, VoteChoice};
use super::error::{GovernanceError, GovernanceResult};
use super::events::{EventLog, EventQuery, EventRecord, GovernanceEvent};
use super::membership::{College, MemberCounts, MembershipRegistry};
use super::proposals::{Proposal, ProposalId, ProposalStore};
use super::weighting::{self, WeightedTally};
use super::workflow::{Workflow, WorkflowPhase};
use super::Price;
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a committed [`GovernanceEngine::execute_proposal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub proposal_id: ProposalId,
    pub tally: WeightedTally,
    pub old_price: Price,
    pub new_price: Price,
}

impl ExecutionOutcome {
    pub fn price_changed(&self) -> bool {
        self.old_price != self.new_price
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceEngine {
    access: AccessControl,
    membership: MembershipRegistry,
    proposals: ProposalStore,
    ballots: BallotLedger,
    workflow: Workflow,
    price: Price,
    events: EventLog,
}

impl GovernanceEngine {
    /// Create an engine in `RegisteringVoters` with the given administrators.
    ///
    /// Fails with `InvalidPrice` for a zero price, `InvalidAddress` for a bad
    /// administrator id, and `AdministratorNotFound` when none is given.
    pub fn new(
        administrators: impl IntoIterator<Item = AccountId>,
        initial_price: Price,
    ) -> GovernanceResult<Self> {
        if initial_price == 0 {
            return Err(GovernanceError::InvalidPrice);
        }
        let administrators: Vec<AccountId> = administrators.into_iter().collect();
        if administrators.is_empty() {
            return Err(GovernanceError::AdministratorNotFound);
        }
        for admin in &administrators {
            admin.validate()?;
        }

        Ok(Self {
            access: AccessControl::with_administrators(administrators),
            membership: MembershipRegistry::new(),
            proposals: ProposalStore::new(),
            ballots: BallotLedger::new(),
            workflow: Workflow::new(),
            price: initial_price,
            events: EventLog::new(),
        })
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub fn add_member(
        &mut self,
        caller: &AccountId,
        identity: AccountId,
        is_producer: bool,
    ) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.require_membership_unlocked()?;
        self.membership.check_insert(&identity)?;

        let college = College::from_is_producer(is_producer);
        self.membership.insert(identity.clone(), college)?;
        self.access.grant(identity.clone(), Capability::Member);

        info!(member = %identity, college = %college, "member added");
        self.commit(vec![GovernanceEvent::MemberAdded {
            identity,
            is_producer,
        }]);
        Ok(())
    }

    pub fn remove_member(&mut self, caller: &AccountId, identity: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.require_membership_unlocked()?;

        let college = self.membership.remove(identity)?;
        self.access.revoke(identity, Capability::Member);

        info!(member = %identity, college = %college, "member removed");
        self.commit(vec![GovernanceEvent::MemberRemoved {
            identity: identity.clone(),
            was_producer: college.is_producer(),
        }]);
        Ok(())
    }

    fn require_membership_unlocked(&self) -> GovernanceResult<()> {
        if self.workflow.phase() == WorkflowPhase::VotingSessionStarted {
            return Err(GovernanceError::VotingInProgress);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Administrators
    // ------------------------------------------------------------------

    pub fn grant_administrator(&mut self, caller: &AccountId, identity: AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        identity.validate()?;
        if self.access.has_capability(&identity, Capability::Administrator) {
            return Err(GovernanceError::AdministratorAlreadyExists);
        }

        self.access.grant(identity.clone(), Capability::Administrator);

        info!(administrator = %identity, granted_by = %caller, "administrator granted");
        self.commit(vec![GovernanceEvent::AdministratorGranted { identity }]);
        Ok(())
    }

    pub fn revoke_administrator(&mut self, caller: &AccountId, identity: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        if !self.access.has_capability(identity, Capability::Administrator) {
            return Err(GovernanceError::AdministratorNotFound);
        }
        if self.access.administrator_count() == 1 {
            return Err(GovernanceError::LastAdministrator);
        }

        self.access.revoke(identity, Capability::Administrator);

        info!(administrator = %identity, revoked_by = %caller, "administrator revoked");
        self.commit(vec![GovernanceEvent::AdministratorRevoked {
            identity: identity.clone(),
        }]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Workflow
    // ------------------------------------------------------------------

    pub fn start_proposal_registration(&mut self, caller: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.workflow.require(WorkflowPhase::RegisteringVoters)?;
        if !self.membership.counts().is_bicameral() {
            return Err(GovernanceError::InsufficientMembers);
        }

        self.advance(WorkflowPhase::RegisteringVoters)
    }

    pub fn create_proposal(&mut self, caller: &AccountId, value: Price) -> GovernanceResult<ProposalId> {
        self.access.require(caller, Capability::Administrator)?;
        self.workflow
            .require(WorkflowPhase::ProposalRegistrationStarted)?;
        self.proposals.check_create(value)?;

        let snapshot = self.membership.counts();
        let proposal_id = self.proposals.create(value, snapshot)?;

        info!(
            proposal_id,
            value,
            producers = snapshot.producers,
            consumers = snapshot.consumers,
            "proposal created"
        );
        self.commit(vec![GovernanceEvent::ProposalCreated { proposal_id, value }]);
        Ok(proposal_id)
    }

    pub fn end_proposal_registration(&mut self, caller: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.workflow
            .require(WorkflowPhase::ProposalRegistrationStarted)?;
        if self.proposals.current().is_none() {
            return Err(GovernanceError::NoActiveProposal);
        }

        self.advance(WorkflowPhase::ProposalRegistrationStarted)
    }

    pub fn start_voting_session(&mut self, caller: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.workflow
            .require(WorkflowPhase::ProposalRegistrationEnded)?;
        if self.proposals.current().is_none() {
            return Err(GovernanceError::NoActiveProposal);
        }

        self.proposals.activate()?;
        self.advance(WorkflowPhase::ProposalRegistrationEnded)
    }

    pub fn end_voting_session(&mut self, caller: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.advance(WorkflowPhase::VotingSessionStarted)
    }

    pub fn reset_workflow(&mut self, caller: &AccountId) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Administrator)?;
        self.advance(WorkflowPhase::VotesTallied)
    }

    fn advance(&mut self, from: WorkflowPhase) -> GovernanceResult<()> {
        let (previous, current) = self.workflow.advance(from)?;
        info!(%previous, %current, "workflow phase changed");
        self.commit(vec![GovernanceEvent::WorkflowStatusChange { previous, current }]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Voting
    // ------------------------------------------------------------------

    pub fn vote(&mut self, caller: &AccountId, choice: VoteChoice) -> GovernanceResult<()> {
        self.access.require(caller, Capability::Member)?;
        self.workflow.require(WorkflowPhase::VotingSessionStarted)?;
        let proposal_id = self
            .proposals
            .current()
            .map(|p| p.id)
            .ok_or(GovernanceError::NoActiveProposal)?;
        let college = self
            .membership
            .role(caller)
            .ok_or(GovernanceError::Unauthorized)?;
        self.ballots.check_record(proposal_id, caller, choice)?;

        self.ballots.record(proposal_id, caller.clone(), choice)?;
        self.proposals.count_vote(college, choice)?;

        info!(proposal_id, voter = %caller, college = %college, %choice, "vote cast");
        self.commit(vec![GovernanceEvent::VoteCast {
            proposal_id,
            voter: caller.clone(),
            is_producer: college.is_producer(),
            choice,
        }]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Tally the current proposal, commit its value if it passes, and close it.
    ///
    /// The proposal is marked applied whatever the outcome. `PriceChanged` is
    /// only emitted when the committed value differs from the old price.
    ///
    /// A repeated call fails the phase check (`InvalidWorkflowStatus`).
    /// `current()` never yields an applied proposal, so the write-once guard
    /// in the proposal store is the only source of `ProposalAlreadyApplied`.
    pub fn execute_proposal(&mut self, caller: &AccountId) -> GovernanceResult<ExecutionOutcome> {
        self.access.require(caller, Capability::Administrator)?;
        self.workflow.require(WorkflowPhase::VotingSessionEnded)?;
        let proposal = self
            .proposals
            .current()
            .ok_or(GovernanceError::NoActiveProposal)?;

        let proposal_id = proposal.id;
        let tally = weighting::tally(&proposal.votes);
        debug!(
            proposal_id,
            producer_for = tally.producer_for,
            producer_against = tally.producer_against,
            consumer_for = tally.consumer_for,
            consumer_against = tally.consumer_against,
            "weighted tally"
        );

        let old_price = self.price;
        let new_price = if tally.passes() { proposal.value } else { old_price };
        let outcome = ExecutionOutcome {
            proposal_id,
            tally,
            old_price,
            new_price,
        };

        self.proposals
            .mark_applied(proposal_id, tally, outcome.price_changed())?;
        self.price = new_price;
        let (previous, current) = self.workflow.advance(WorkflowPhase::VotingSessionEnded)?;

        info!(
            proposal_id,
            total_for = tally.total_for,
            total_against = tally.total_against,
            passed = tally.passes(),
            price = new_price,
            "proposal executed"
        );

        let mut events = Vec::with_capacity(2);
        if outcome.price_changed() {
            events.push(GovernanceEvent::PriceChanged {
                proposal_id,
                old_price,
                new_price,
            });
        }
        events.push(GovernanceEvent::WorkflowStatusChange { previous, current });
        self.commit(events);
        Ok(outcome)
    }

    fn commit(&mut self, events: Vec<GovernanceEvent>) {
        self.events.append(events);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_vote(&self, proposal_id: ProposalId, voter: &AccountId) -> VoteChoice {
        self.ballots.get(proposal_id, voter)
    }

    pub fn get_proposal(&self, proposal_id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(proposal_id)
    }

    pub fn current_proposal(&self) -> Option<&Proposal> {
        self.proposals.current()
    }

    /// All proposals, ascending id.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Weighted tally of a proposal's counters as they stand now.
    pub fn tally(&self, proposal_id: ProposalId) -> Option<WeightedTally> {
        self.proposals
            .get(proposal_id)
            .map(|p| weighting::tally(&p.votes))
    }

    pub fn ballots(&self, proposal_id: ProposalId) -> Vec<(AccountId, VoteChoice)> {
        self.ballots.ballots_for(proposal_id)
    }

    pub fn current_price(&self) -> Price {
        self.price
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.workflow.phase()
    }

    pub fn member_counts(&self) -> MemberCounts {
        self.membership.counts()
    }

    pub fn member_role(&self, identity: &AccountId) -> Option<College> {
        self.membership.role(identity)
    }

    pub fn members(&self) -> impl Iterator<Item = (&AccountId, College)> {
        self.membership.members()
    }

    pub fn is_administrator(&self, identity: &AccountId) -> bool {
        self.access
            .has_capability(identity, Capability::Administrator)
    }

    pub fn administrators(&self) -> impl Iterator<Item = &AccountId> {
        self.access.administrators()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn query_events(&self, query: &EventQuery) -> Vec<EventRecord> {
        self.events.query(query)
    }

    /// Structural checks for state that did not come through the operations
    /// above, e.g. a snapshot read from disk.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut counts = MemberCounts::default();
        for (identity, college) in self.membership.members() {
            identity.validate().map_err(|e| e.to_string())?;
            if !self.access.has_capability(identity, Capability::Member) {
                return Err(format!("member {} lacks member capability", identity));
            }
            match college {
                College::Producer => counts.producers += 1,
                College::Consumer => counts.consumers += 1,
            }
        }
        if counts != self.membership.counts() {
            return Err("member counters disagree with role table".to_string());
        }
        if self.access.administrator_count() == 0 {
            return Err("no administrators".to_string());
        }
        if self.price == 0 {
            return Err("price is zero".to_string());
        }
        let open = self.proposals.iter().filter(|p| p.is_open()).count();
        if open > 1 {
            return Err(format!("{} open proposals", open));
        }
        Ok(())
    }
}
