// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock records and the outcomes of lock transitions
//!
//! A resource's lock is either absent (`UNLOCKED`) or a single [`LockRecord`]
//! (`LOCKED(token)`). Mismatched acquire, release, or peek never transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque, caller-chosen lock credential
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockToken(pub String);

impl LockToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for LockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An exclusive, advisory claim on one resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    pub token: LockToken,
    /// Caller-supplied description of the holder, passed through verbatim
    pub holder: Value,
    pub created: DateTime<Utc>,
}

impl LockRecord {
    pub fn is_held_by(&self, token: &LockToken) -> bool {
        &self.token == token
    }
}

/// Result of trying to create a lock
#[derive(Clone, Debug, PartialEq)]
pub enum Acquire {
    Acquired(LockRecord),
    Conflict(LockRecord),
}

/// Result of releasing a lock by token
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
    Released,
    /// A different token holds the lock; it was left in place
    Mismatch(LockRecord),
    NotLocked,
}

/// Result of verifying a token without mutating anything
#[derive(Clone, Debug, PartialEq)]
pub enum Peek {
    /// The presented token holds the lock
    Held,
    Conflict(LockRecord),
    Unlocked,
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
