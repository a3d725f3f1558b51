//! Capability sets.
//!
//! Two sets: administrators and members. Membership capability is granted
//! and revoked only by the engine alongside the role table.

use super::error::{GovernanceError, GovernanceResult};
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capability required by a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Administrator,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessControl {
    administrators: BTreeSet<AccountId>,
    members: BTreeSet<AccountId>,
}

impl AccessControl {
    pub fn with_administrators(administrators: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            administrators: administrators.into_iter().collect(),
            members: BTreeSet::new(),
        }
    }

    pub fn has_capability(&self, identity: &AccountId, capability: Capability) -> bool {
        match capability {
            Capability::Administrator => self.administrators.contains(identity),
            Capability::Member => self.members.contains(identity),
        }
    }

    pub fn require(&self, identity: &AccountId, capability: Capability) -> GovernanceResult<()> {
        if self.has_capability(identity, capability) {
            Ok(())
        } else {
            Err(GovernanceError::Unauthorized)
        }
    }

    pub fn administrators(&self) -> impl Iterator<Item = &AccountId> {
        self.administrators.iter()
    }

    pub fn administrator_count(&self) -> usize {
        self.administrators.len()
    }

    pub(crate) fn grant(&mut self, identity: AccountId, capability: Capability) -> bool {
        match capability {
            Capability::Administrator => self.administrators.insert(identity),
            Capability::Member => self.members.insert(identity),
        }
    }

    pub(crate) fn revoke(&mut self, identity: &AccountId, capability: Capability) -> bool {
        match capability {
            Capability::Administrator => self.administrators.remove(identity),
            Capability::Member => self.members.remove(identity),
        }
    }
}
