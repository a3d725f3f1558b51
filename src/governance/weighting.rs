//! Bi-college weighting.
//!
//! Weights are basis points: 10000 is the whole vote and each college owns
//! at most 5000 of it, whatever its size. Within a college the share is
//! split by integer division between for and against. A college that cast no
//! for/against ballots contributes 0 to both sides; its half is not handed
//! to the other college.
//!
//! A proposal passes only when `total_for > total_against`. Ties fail.

use super::proposals::VoteCounts;
use serde::{Deserialize, Serialize};

/// Whole-vote scale.
pub const BASIS_POINTS: u64 = 10_000;

/// Share owned by each college.
pub const COLLEGE_SHARE: u64 = BASIS_POINTS / 2;

/// Weighted outcome of a proposal's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeightedTally {
    pub producer_for: u64,
    pub producer_against: u64,
    pub consumer_for: u64,
    pub consumer_against: u64,
    pub total_for: u64,
    pub total_against: u64,
}

impl WeightedTally {
    pub fn passes(&self) -> bool {
        self.total_for > self.total_against
    }
}

/// Split one college's share between for and against.
pub fn college_weight(voted_for: u64, voted_against: u64) -> (u64, u64) {
    let cast = voted_for as u128 + voted_against as u128;
    if cast == 0 {
        return (0, 0);
    }
    let share = COLLEGE_SHARE as u128;
    let weight_for = voted_for as u128 * share / cast;
    let weight_against = voted_against as u128 * share / cast;
    // Both quotients are bounded by COLLEGE_SHARE.
    (weight_for as u64, weight_against as u64)
}

pub fn tally(votes: &VoteCounts) -> WeightedTally {
    let (producer_for, producer_against) =
        college_weight(votes.producers_for, votes.producers_against);
    let (consumer_for, consumer_against) =
        college_weight(votes.consumers_for, votes.consumers_against);

    WeightedTally {
        producer_for,
        producer_against,
        consumer_for,
        consumer_against,
        total_for: producer_for + consumer_for,
        total_against: producer_against + consumer_against,
    }
}
