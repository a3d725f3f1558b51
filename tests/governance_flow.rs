//! Integration tests for complete governance rounds.
//!
//! Each test drives the engine through the six-phase workflow:
//! 1. Register producers and consumers
//! 2. Open registration, create a proposal, close registration
//! 3. Open voting, cast ballots, close voting
//! 4. Execute (weighted tally, price commit)
//! 5. Reset for the next round

use accord::governance::{
    EventKind, EventQuery, GovernanceEngine, GovernanceError, GovernanceEvent, ProposalId,
    ProposalStatus, VoteChoice, WorkflowPhase,
};
use accord::identity::AccountId;

const INITIAL_PRICE: u64 = 100;
const PROPOSED_PRICE: u64 = 150;

fn id(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn admin() -> AccountId {
    id("admin")
}

/// Engine with `producers` p0.. and `consumers` c0.., voting open on a
/// proposal for `PROPOSED_PRICE`.
fn open_vote(producers: usize, consumers: usize) -> (GovernanceEngine, ProposalId) {
    let admin = admin();
    let mut engine = GovernanceEngine::new([admin.clone()], INITIAL_PRICE).unwrap();
    for i in 0..producers {
        engine
            .add_member(&admin, id(&format!("p{}", i)), true)
            .unwrap();
    }
    for i in 0..consumers {
        engine
            .add_member(&admin, id(&format!("c{}", i)), false)
            .unwrap();
    }
    engine.start_proposal_registration(&admin).unwrap();
    let proposal_id = engine.create_proposal(&admin, PROPOSED_PRICE).unwrap();
    engine.end_proposal_registration(&admin).unwrap();
    engine.start_voting_session(&admin).unwrap();
    (engine, proposal_id)
}

fn close_and_execute(engine: &mut GovernanceEngine) -> accord::governance::ExecutionOutcome {
    engine.end_voting_session(&admin()).unwrap();
    engine.execute_proposal(&admin()).unwrap()
}

#[test]
fn test_unanimous_round_updates_price() {
    let (mut engine, proposal_id) = open_vote(2, 2);
    for voter in ["p0", "p1", "c0", "c1"] {
        engine.vote(&id(voter), VoteChoice::For).unwrap();
    }

    let outcome = close_and_execute(&mut engine);

    assert_eq!(outcome.tally.producer_for, 5000);
    assert_eq!(outcome.tally.consumer_for, 5000);
    assert_eq!(outcome.tally.total_for, 10000);
    assert_eq!(outcome.tally.total_against, 0);
    assert_eq!(engine.current_price(), PROPOSED_PRICE);
    assert_eq!(engine.phase(), WorkflowPhase::VotesTallied);

    let proposal = engine.get_proposal(proposal_id).unwrap();
    assert!(matches!(
        proposal.status,
        ProposalStatus::Applied {
            price_changed: true,
            ..
        }
    ));
}

#[test]
fn test_split_producers_still_pass() {
    let (mut engine, _) = open_vote(2, 2);
    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    engine.vote(&id("p1"), VoteChoice::Against).unwrap();
    engine.vote(&id("c0"), VoteChoice::For).unwrap();
    engine.vote(&id("c1"), VoteChoice::For).unwrap();

    let outcome = close_and_execute(&mut engine);

    assert_eq!(
        (outcome.tally.producer_for, outcome.tally.producer_against),
        (2500, 2500)
    );
    assert_eq!(
        (outcome.tally.consumer_for, outcome.tally.consumer_against),
        (5000, 0)
    );
    assert_eq!(outcome.tally.total_for, 7500);
    assert_eq!(outcome.tally.total_against, 2500);
    assert_eq!(engine.current_price(), PROPOSED_PRICE);
}

#[test]
fn test_silent_college_is_not_redistributed() {
    let (mut engine, _) = open_vote(2, 2);
    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    engine.vote(&id("p1"), VoteChoice::For).unwrap();

    let outcome = close_and_execute(&mut engine);

    assert_eq!(outcome.tally.consumer_for, 0);
    assert_eq!(outcome.tally.consumer_against, 0);
    assert_eq!(outcome.tally.total_for, 5000);
    assert_eq!(outcome.tally.total_against, 0);
    assert_eq!(engine.current_price(), PROPOSED_PRICE);
}

#[test]
fn test_tie_keeps_price() {
    let (mut engine, proposal_id) = open_vote(2, 2);
    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    engine.vote(&id("p1"), VoteChoice::For).unwrap();
    engine.vote(&id("c0"), VoteChoice::Against).unwrap();
    engine.vote(&id("c1"), VoteChoice::Against).unwrap();

    let outcome = close_and_execute(&mut engine);

    assert_eq!(outcome.tally.total_for, outcome.tally.total_against);
    assert!(!outcome.price_changed());
    assert_eq!(engine.current_price(), INITIAL_PRICE);

    // Failed proposals are still applied and emit no price change.
    assert!(engine.get_proposal(proposal_id).unwrap().is_applied());
    let price_events = engine.query_events(&EventQuery {
        kind: Some(EventKind::PriceChanged),
        ..EventQuery::default()
    });
    assert!(price_events.is_empty());
}

#[test]
fn test_abstentions_carry_no_weight() {
    let (mut engine, _) = open_vote(1, 3);
    engine.vote(&id("p0"), VoteChoice::Against).unwrap();
    engine.vote(&id("c0"), VoteChoice::For).unwrap();
    engine.vote(&id("c1"), VoteChoice::Abstain).unwrap();
    engine.vote(&id("c2"), VoteChoice::Abstain).unwrap();

    let outcome = close_and_execute(&mut engine);

    assert_eq!(outcome.tally.consumer_for, 5000);
    assert_eq!(outcome.tally.producer_against, 5000);
    assert!(!outcome.tally.passes());
    assert_eq!(engine.current_price(), INITIAL_PRICE);
}

#[test]
fn test_double_vote_rejected_without_side_effects() {
    let (mut engine, proposal_id) = open_vote(2, 2);
    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    let before = engine.clone();

    assert_eq!(
        engine.vote(&id("p0"), VoteChoice::Against),
        Err(GovernanceError::AlreadyVoted)
    );
    assert_eq!(engine, before);

    let proposal = engine.get_proposal(proposal_id).unwrap();
    assert_eq!(proposal.votes.producers_for, 1);
    assert_eq!(proposal.votes.producers_against, 0);
    assert_eq!(engine.get_vote(proposal_id, &id("p0")), VoteChoice::For);
}

#[test]
fn test_reset_only_from_tallied() {
    let (mut engine, first_id) = open_vote(1, 1);

    let before = engine.phase();
    assert!(matches!(
        engine.reset_workflow(&admin()),
        Err(GovernanceError::InvalidWorkflowStatus { .. })
    ));
    assert_eq!(engine.phase(), before);

    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    close_and_execute(&mut engine);
    engine.reset_workflow(&admin()).unwrap();
    assert_eq!(engine.phase(), WorkflowPhase::RegisteringVoters);

    engine.start_proposal_registration(&admin()).unwrap();
    let second_id = engine.create_proposal(&admin(), 175).unwrap();
    assert_eq!(second_id, first_id + 1);
    assert_eq!(engine.current_proposal().map(|p| p.id), Some(second_id));

    // Ballots are per proposal; p0 may vote again on the new one.
    engine.end_proposal_registration(&admin()).unwrap();
    engine.start_voting_session(&admin()).unwrap();
    engine.vote(&id("p0"), VoteChoice::Against).unwrap();
    assert_eq!(engine.get_vote(first_id, &id("p0")), VoteChoice::For);
    assert_eq!(engine.get_vote(second_id, &id("p0")), VoteChoice::Against);
}

#[test]
fn test_membership_locked_during_voting() {
    let (mut engine, _) = open_vote(1, 1);

    assert_eq!(
        engine.add_member(&admin(), id("late"), true),
        Err(GovernanceError::VotingInProgress)
    );
    assert_eq!(
        engine.remove_member(&admin(), &id("p0")),
        Err(GovernanceError::VotingInProgress)
    );

    engine.end_voting_session(&admin()).unwrap();
    engine.add_member(&admin(), id("late"), true).unwrap();
}

#[test]
fn test_event_log_records_round() {
    let (mut engine, proposal_id) = open_vote(1, 1);
    engine.vote(&id("p0"), VoteChoice::For).unwrap();
    engine.vote(&id("c0"), VoteChoice::For).unwrap();
    close_and_execute(&mut engine);

    let round = engine.query_events(&EventQuery {
        proposal_id: Some(proposal_id),
        limit: None,
        ..EventQuery::default()
    });
    // Newest first: PriceChanged, two VoteCast, ProposalCreated.
    assert_eq!(round.len(), 4);
    assert_eq!(
        round[0].event,
        GovernanceEvent::PriceChanged {
            proposal_id,
            old_price: INITIAL_PRICE,
            new_price: PROPOSED_PRICE,
        }
    );
    assert_eq!(
        round[3].event,
        GovernanceEvent::ProposalCreated {
            proposal_id,
            value: PROPOSED_PRICE,
        }
    );

    let sequences: Vec<u64> = engine.events().records().iter().map(|r| r.sequence).collect();
    let expected: Vec<u64> = (1..=engine.events().len() as u64).collect();
    assert_eq!(sequences, expected);
    assert!(engine.check_consistency().is_ok());
}
