//! Account identities.
//!
//! The hosting environment authenticates callers; the engine only sees an
//! opaque identifier. An identifier is rejected when it is empty, contains
//! whitespace, or is the all-zero address (`0x000...0`), which hosts use as
//! the "no account" sentinel.

use crate::governance::error::{GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, validated account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Validate and wrap an identifier.
    pub fn new(raw: impl Into<String>) -> GovernanceResult<Self> {
        let raw = raw.into();
        if !is_valid(&raw) {
            return Err(GovernanceError::InvalidAddress);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-check an identifier that may have come from a snapshot or a
    /// deserialized request rather than through [`AccountId::new`].
    pub fn validate(&self) -> GovernanceResult<()> {
        if is_valid(&self.0) {
            Ok(())
        } else {
            Err(GovernanceError::InvalidAddress)
        }
    }
}

fn is_valid(raw: &str) -> bool {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return false;
    }
    !is_zero_address(raw)
}

fn is_zero_address(raw: &str) -> bool {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(digits) => digits.chars().all(|c| c == '0'),
        None => false,
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
