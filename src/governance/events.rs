//! Governance signals and the append-only event log.
//!
//! Every committed operation appends one or more events. The log is part of
//! the persisted state and is never truncated; queries filter a copy.

use super::ballots::VoteChoice;
use super::proposals::ProposalId;
use super::workflow::WorkflowPhase;
use super::Price;
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Signal emitted by a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    MemberAdded {
        identity: AccountId,
        is_producer: bool,
    },
    MemberRemoved {
        identity: AccountId,
        was_producer: bool,
    },
    AdministratorGranted {
        identity: AccountId,
    },
    AdministratorRevoked {
        identity: AccountId,
    },
    WorkflowStatusChange {
        previous: WorkflowPhase,
        current: WorkflowPhase,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        value: Price,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: AccountId,
        is_producer: bool,
        choice: VoteChoice,
    },
    PriceChanged {
        proposal_id: ProposalId,
        old_price: Price,
        new_price: Price,
    },
}

/// Discriminant of [`GovernanceEvent`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MemberAdded,
    MemberRemoved,
    AdministratorGranted,
    AdministratorRevoked,
    WorkflowStatusChange,
    ProposalCreated,
    VoteCast,
    PriceChanged,
}

impl GovernanceEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MemberAdded { .. } => EventKind::MemberAdded,
            Self::MemberRemoved { .. } => EventKind::MemberRemoved,
            Self::AdministratorGranted { .. } => EventKind::AdministratorGranted,
            Self::AdministratorRevoked { .. } => EventKind::AdministratorRevoked,
            Self::WorkflowStatusChange { .. } => EventKind::WorkflowStatusChange,
            Self::ProposalCreated { .. } => EventKind::ProposalCreated,
            Self::VoteCast { .. } => EventKind::VoteCast,
            Self::PriceChanged { .. } => EventKind::PriceChanged,
        }
    }

    /// Proposal the event refers to, if any.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Self::ProposalCreated { proposal_id, .. }
            | Self::VoteCast { proposal_id, .. }
            | Self::PriceChanged { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        }
    }
}

impl fmt::Display for GovernanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemberAdded {
                identity,
                is_producer,
            } => write!(
                f,
                "member added: {} ({})",
                identity,
                if *is_producer { "producer" } else { "consumer" }
            ),
            Self::MemberRemoved {
                identity,
                was_producer,
            } => write!(
                f,
                "member removed: {} ({})",
                identity,
                if *was_producer { "producer" } else { "consumer" }
            ),
            Self::AdministratorGranted { identity } => {
                write!(f, "administrator granted: {}", identity)
            }
            Self::AdministratorRevoked { identity } => {
                write!(f, "administrator revoked: {}", identity)
            }
            Self::WorkflowStatusChange { previous, current } => {
                write!(f, "phase {} -> {}", previous, current)
            }
            Self::ProposalCreated { proposal_id, value } => {
                write!(f, "proposal #{} created: price {}", proposal_id, value)
            }
            Self::VoteCast {
                proposal_id,
                voter,
                is_producer,
                choice,
            } => write!(
                f,
                "vote on #{}: {} ({}) voted {}",
                proposal_id,
                voter,
                if *is_producer { "producer" } else { "consumer" },
                choice
            ),
            Self::PriceChanged {
                proposal_id,
                old_price,
                new_price,
            } => write!(
                f,
                "price changed by #{}: {} -> {}",
                proposal_id, old_price, new_price
            ),
        }
    }
}

/// Logged event with its position and commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based position in the log.
    pub sequence: u64,
    /// Unix timestamp (seconds since epoch).
    pub timestamp: u64,
    pub event: GovernanceEvent,
}

impl EventRecord {
    /// Age of the record relative to now, e.g. "3m 12s".
    pub fn age_display(&self) -> String {
        let now = unix_now();
        if now < self.timestamp {
            return format!("Unix: {}", self.timestamp);
        }
        let elapsed = std::time::Duration::from_secs(now - self.timestamp);
        format!("{} ago", humantime::format_duration(elapsed))
    }
}

/// Filters for [`EventLog::query`].
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub kind: Option<EventKind>,
    pub proposal_id: Option<ProposalId>,
    /// Only records with a larger sequence number.
    pub after_sequence: Option<u64>,
    /// Most recent N after filtering.
    pub limit: Option<usize>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            kind: None,
            proposal_id: None,
            after_sequence: None,
            limit: Some(50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records appended after the first `offset` ones.
    pub fn since(&self, offset: usize) -> &[EventRecord] {
        self.records.get(offset..).unwrap_or(&[])
    }

    pub(crate) fn append(&mut self, events: Vec<GovernanceEvent>) {
        let timestamp = unix_now();
        for event in events {
            let sequence = self.records.len() as u64 + 1;
            self.records.push(EventRecord {
                sequence,
                timestamp,
                event,
            });
        }
    }

    /// Matching records, most recent first.
    pub fn query(&self, query: &EventQuery) -> Vec<EventRecord> {
        let mut matched: Vec<EventRecord> = self
            .records
            .iter()
            .rev()
            .filter(|record| {
                if let Some(kind) = query.kind {
                    if record.event.kind() != kind {
                        return false;
                    }
                }
                if let Some(id) = query.proposal_id {
                    if record.event.proposal_id() != Some(id) {
                        return false;
                    }
                }
                if let Some(after) = query.after_sequence {
                    if record.sequence <= after {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
