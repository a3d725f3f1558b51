//! Membership registry.
//!
//! Each identity holds at most one role. Counters track the live size of
//! each college and are only touched through `insert` / `remove`.

use super::error::{GovernanceError, GovernanceResult};
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the two voter constituencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum College {
    Producer,
    Consumer,
}

impl College {
    pub fn from_is_producer(is_producer: bool) -> Self {
        if is_producer {
            Self::Producer
        } else {
            Self::Consumer
        }
    }

    pub fn is_producer(self) -> bool {
        self == Self::Producer
    }
}

impl fmt::Display for College {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Consumer => f.write_str("consumer"),
        }
    }
}

/// Live college sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberCounts {
    pub producers: u64,
    pub consumers: u64,
}

impl MemberCounts {
    /// Both colleges have at least one member.
    pub fn is_bicameral(&self) -> bool {
        self.producers > 0 && self.consumers > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MembershipRegistry {
    roles: BTreeMap<AccountId, College>,
    counts: MemberCounts,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self, identity: &AccountId) -> Option<College> {
        self.roles.get(identity).copied()
    }

    pub fn counts(&self) -> MemberCounts {
        self.counts
    }

    pub fn members(&self) -> impl Iterator<Item = (&AccountId, College)> {
        self.roles.iter().map(|(id, college)| (id, *college))
    }

    /// Fail unless `identity` could be inserted.
    pub fn check_insert(&self, identity: &AccountId) -> GovernanceResult<()> {
        identity.validate()?;
        if self.roles.contains_key(identity) {
            return Err(GovernanceError::MemberAlreadyExists);
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, identity: AccountId, college: College) -> GovernanceResult<()> {
        self.check_insert(&identity)?;
        match college {
            College::Producer => self.counts.producers += 1,
            College::Consumer => self.counts.consumers += 1,
        }
        self.roles.insert(identity, college);
        Ok(())
    }

    /// Clear the role and return the college it belonged to.
    pub(crate) fn remove(&mut self, identity: &AccountId) -> GovernanceResult<College> {
        let college = self
            .roles
            .remove(identity)
            .ok_or(GovernanceError::MemberNotFound)?;
        match college {
            College::Producer => self.counts.producers -= 1,
            College::Consumer => self.counts.consumers -= 1,
        }
        Ok(college)
    }
}
