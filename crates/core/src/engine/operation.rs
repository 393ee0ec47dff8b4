// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of engine operations and their results

use crate::coordination::{LockRecord, LockToken};
use crate::id::ResourceId;
use serde_json::Value;

/// A request to the engine, parsed by the transport
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    GetState {
        id: ResourceId,
    },
    PutState {
        id: ResourceId,
        body: Vec<u8>,
        token: Option<LockToken>,
    },
    DeleteState {
        id: ResourceId,
        token: Option<LockToken>,
    },
    Lock {
        id: ResourceId,
        token: LockToken,
        holder: Value,
    },
    Unlock {
        id: ResourceId,
        token: LockToken,
    },
    LockStatus {
        id: ResourceId,
    },
    ForceUnlock {
        id: ResourceId,
    },
}

impl Operation {
    pub fn id(&self) -> &ResourceId {
        match self {
            Operation::GetState { id }
            | Operation::PutState { id, .. }
            | Operation::DeleteState { id, .. }
            | Operation::Lock { id, .. }
            | Operation::Unlock { id, .. }
            | Operation::LockStatus { id }
            | Operation::ForceUnlock { id } => id,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetState { .. } => "get_state",
            Operation::PutState { .. } => "put_state",
            Operation::DeleteState { .. } => "delete_state",
            Operation::Lock { .. } => "lock",
            Operation::Unlock { .. } => "unlock",
            Operation::LockStatus { .. } => "lock_status",
            Operation::ForceUnlock { .. } => "force_unlock",
        }
    }
}

/// Result of a lock-checked write or delete
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOutcome {
    Applied,
    /// Another token holds the lock; nothing was changed
    Conflict(LockRecord),
    /// No lock is held and the policy requires one
    LockRequired,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LockOutcome {
    Locked,
    Conflict(LockRecord),
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnlockOutcome {
    Unlocked,
    /// The presented token does not hold the lock; it was left in place
    Mismatch(LockRecord),
    /// Only reported under strict unlock policy
    NotLocked,
}

/// Result of [`Operation`] execution
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Document bytes, empty when nothing was ever written
    State(Vec<u8>),
    Written(WriteOutcome),
    Deleted(WriteOutcome),
    Lock(LockOutcome),
    Unlock(UnlockOutcome),
    LockStatus(Option<LockRecord>),
    /// The record that was removed, if any
    ForceUnlocked(Option<LockRecord>),
}
