//! Property-based tests for the governance engine
//!
//! Tests for:
//! - Weighting: basis-point bounds, college cap, strict-majority rule
//! - Ballots: one counted vote per voter, counters bounded by the snapshot
//! - Workflow: failed calls never change state, phases only move forward

use super::ballots::VoteChoice;
use super::engine::GovernanceEngine;
use super::proposals::VoteCounts;
use super::weighting::{tally, BASIS_POINTS, COLLEGE_SHARE};
use super::workflow::WorkflowPhase;
use crate::identity::AccountId;
use proptest::prelude::*;

fn id(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn admin() -> AccountId {
    id("admin")
}

fn choice_strategy() -> impl Strategy<Value = VoteChoice> {
    prop_oneof![
        Just(VoteChoice::None),
        Just(VoteChoice::For),
        Just(VoteChoice::Against),
        Just(VoteChoice::Abstain),
    ]
}

fn engine_with(producers: usize, consumers: usize) -> GovernanceEngine {
    let mut engine = GovernanceEngine::new([admin()], 100).unwrap();
    for i in 0..producers {
        engine.add_member(&admin(), id(&format!("p{}", i)), true).unwrap();
    }
    for i in 0..consumers {
        engine.add_member(&admin(), id(&format!("c{}", i)), false).unwrap();
    }
    engine
}

// ============================================================================
// WEIGHTING PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: totals stay inside the basis-point scale
    #[test]
    fn weighting_bounded_by_basis_points(
        pf in 0u64..1_000_000,
        pa in 0u64..1_000_000,
        cf in 0u64..1_000_000,
        ca in 0u64..1_000_000,
    ) {
        let t = tally(&VoteCounts {
            producers_for: pf,
            producers_against: pa,
            consumers_for: cf,
            consumers_against: ca,
        });

        prop_assert!(t.total_for <= BASIS_POINTS);
        prop_assert!(t.total_against <= BASIS_POINTS);
        prop_assert!(t.total_for + t.total_against <= BASIS_POINTS);
        prop_assert!(t.producer_for + t.producer_against <= COLLEGE_SHARE);
        prop_assert!(t.consumer_for + t.consumer_against <= COLLEGE_SHARE);
    }

    /// Property: a college that cast nothing contributes nothing
    #[test]
    fn weighting_silent_college_is_zero(pf in 0u64..10_000, pa in 0u64..10_000) {
        let t = tally(&VoteCounts {
            producers_for: pf,
            producers_against: pa,
            consumers_for: 0,
            consumers_against: 0,
        });
        prop_assert_eq!(t.consumer_for, 0);
        prop_assert_eq!(t.consumer_against, 0);
        prop_assert!(t.total_for <= COLLEGE_SHARE);
    }

    /// Property: college size does not change its weight, only its split does
    #[test]
    fn weighting_scale_invariant(f in 0u64..100, a in 0u64..100, k in 1u64..100) {
        prop_assume!(f + a > 0);
        let small = tally(&VoteCounts { producers_for: f, producers_against: a, ..Default::default() });
        let large = tally(&VoteCounts { producers_for: f * k, producers_against: a * k, ..Default::default() });
        prop_assert_eq!(small, large);
    }
}

// ============================================================================
// VOTING PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: counted ballots never exceed the creation snapshot, and the
    /// price moves exactly when for outweighs against
    #[test]
    fn voting_round_respects_snapshot_and_majority(
        producers in 1usize..6,
        consumers in 1usize..6,
        ballots in prop::collection::vec((any::<bool>(), 0usize..6, choice_strategy()), 0..40),
        value in 1u64..1_000,
    ) {
        let mut engine = engine_with(producers, consumers);
        engine.start_proposal_registration(&admin()).unwrap();
        let pid = engine.create_proposal(&admin(), value).unwrap();
        engine.end_proposal_registration(&admin()).unwrap();
        engine.start_voting_session(&admin()).unwrap();

        for (is_producer, idx, choice) in ballots {
            let voter = if is_producer {
                id(&format!("p{}", idx % producers))
            } else {
                id(&format!("c{}", idx % consumers))
            };
            let before = engine.clone();
            if engine.vote(&voter, choice).is_err() {
                prop_assert_eq!(&engine, &before);
            }
        }

        engine.end_voting_session(&admin()).unwrap();
        let old_price = engine.current_price();
        let outcome = engine.execute_proposal(&admin()).unwrap();

        let proposal = engine.get_proposal(pid).unwrap();
        prop_assert!(proposal.is_applied());
        prop_assert!(proposal.votes.producers_cast() <= proposal.snapshot.producers);
        prop_assert!(proposal.votes.consumers_cast() <= proposal.snapshot.consumers);

        if outcome.tally.total_for > outcome.tally.total_against {
            prop_assert_eq!(engine.current_price(), value);
        } else {
            prop_assert_eq!(engine.current_price(), old_price);
        }
    }
}

// ============================================================================
// WORKFLOW PROPERTY TESTS
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    StartRegistration,
    Create(u64),
    EndRegistration,
    StartVoting,
    Vote(usize, VoteChoice),
    EndVoting,
    Execute,
    Reset,
    AddMember(usize, bool),
    RemoveMember(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::StartRegistration),
        (0u64..300).prop_map(Op::Create),
        Just(Op::EndRegistration),
        Just(Op::StartVoting),
        (0usize..4, choice_strategy()).prop_map(|(i, c)| Op::Vote(i, c)),
        Just(Op::EndVoting),
        Just(Op::Execute),
        Just(Op::Reset),
        (0usize..6, any::<bool>()).prop_map(|(i, p)| Op::AddMember(i, p)),
        (0usize..6).prop_map(Op::RemoveMember),
    ]
}

fn member(i: usize) -> AccountId {
    id(&format!("m{}", i))
}

fn apply(engine: &mut GovernanceEngine, op: &Op) -> bool {
    let result = match op {
        Op::StartRegistration => engine.start_proposal_registration(&admin()),
        Op::Create(v) => engine.create_proposal(&admin(), *v).map(|_| ()),
        Op::EndRegistration => engine.end_proposal_registration(&admin()),
        Op::StartVoting => engine.start_voting_session(&admin()),
        Op::Vote(i, c) => engine.vote(&member(*i), *c),
        Op::EndVoting => engine.end_voting_session(&admin()),
        Op::Execute => engine.execute_proposal(&admin()).map(|_| ()),
        Op::Reset => engine.reset_workflow(&admin()),
        Op::AddMember(i, p) => engine.add_member(&admin(), member(*i), *p),
        Op::RemoveMember(i) => engine.remove_member(&admin(), &member(*i)),
    };
    result.is_ok()
}

proptest! {
    /// Property: a rejected call is a no-op; an accepted one moves the phase
    /// to its successor or leaves it in place
    #[test]
    fn workflow_failures_are_atomic(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut engine = GovernanceEngine::new([admin()], 100).unwrap();

        for op in &ops {
            let before = engine.clone();
            let phase = engine.phase();
            if apply(&mut engine, op) {
                let now = engine.phase();
                prop_assert!(now == phase || now == phase.successor());
            } else {
                prop_assert_eq!(&engine, &before);
            }
        }
        prop_assert!(engine.check_consistency().is_ok());
    }

    /// Property: `applied` is set once and never cleared
    #[test]
    fn applied_flag_is_monotonic(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut engine = GovernanceEngine::new([admin()], 100).unwrap();
        let mut applied: Vec<u64> = Vec::new();

        for op in &ops {
            apply(&mut engine, op);
            for pid in &applied {
                prop_assert!(engine.get_proposal(*pid).unwrap().is_applied());
            }
            applied = engine.proposals().filter(|p| p.is_applied()).map(|p| p.id).collect();
            if engine.phase() == WorkflowPhase::VotesTallied {
                prop_assert!(engine.current_proposal().is_none());
            }
        }
    }
}
