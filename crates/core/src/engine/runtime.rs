// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine runtime
//!
//! Combines the document store and the lock registry. A write is checked and
//! applied while holding the resource's registry entry, so a lock cannot be
//! released or taken between the token check and the write.

use super::operation::{LockOutcome, Operation, Reply, UnlockOutcome, WriteOutcome};
use crate::clock::{Clock, SystemClock};
use crate::coordination::{Acquire, LockRecord, LockRegistry, LockToken, Peek, Release};
use crate::id::ResourceId;
use crate::store::{DocumentStore, LockStore, StoreError};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that end a request
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("lock token must not be empty")]
    EmptyToken,
}

/// Deployment policy, fixed at construction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    /// Reject writes to resources nobody has locked
    pub require_lock_for_write: bool,
    /// Report unlocking an unlocked resource instead of treating it as success
    pub strict_unlock: bool,
}

/// Object-safe view of an engine, for transports that share one behind an `Arc`
pub trait Coordinator: Send + Sync {
    fn execute(&self, op: Operation) -> Result<Reply, EngineError>;
}

pub struct Engine<S, C = SystemClock> {
    documents: S,
    locks: LockRegistry<S, C>,
    policy: Policy,
}

impl<S, C> Engine<S, C>
where
    S: DocumentStore + LockStore + Clone,
    C: Clock,
{
    pub fn new(store: S, clock: C, policy: Policy) -> Self {
        Self {
            documents: store.clone(),
            locks: LockRegistry::new(store, clock),
            policy,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn locks(&self) -> &LockRegistry<S, C> {
        &self.locks
    }

    /// Dispatch one operation
    pub fn execute(&self, op: Operation) -> Result<Reply, EngineError> {
        match op {
            Operation::GetState { id } => self.get_state(&id).map(Reply::State),
            Operation::PutState { id, body, token } => self
                .put_state(&id, &body, token.as_ref())
                .map(Reply::Written),
            Operation::DeleteState { id, token } => {
                self.delete_state(&id, token.as_ref()).map(Reply::Deleted)
            }
            Operation::Lock { id, token, holder } => {
                self.lock_state(&id, token, holder).map(Reply::Lock)
            }
            Operation::Unlock { id, token } => self.unlock_state(&id, &token).map(Reply::Unlock),
            Operation::LockStatus { id } => self.lock_status(&id).map(Reply::LockStatus),
            Operation::ForceUnlock { id } => {
                self.force_unlock_state(&id).map(Reply::ForceUnlocked)
            }
        }
    }

    /// Current document, or empty when none was ever written
    pub fn get_state(&self, id: &ResourceId) -> Result<Vec<u8>, EngineError> {
        match self.documents.read(id) {
            Ok(bytes) => Ok(bytes),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn put_state(
        &self,
        id: &ResourceId,
        bytes: &[u8],
        token: Option<&LockToken>,
    ) -> Result<WriteOutcome, EngineError> {
        let outcome = self.checked(id, token, || self.documents.write(id, bytes))?;
        if outcome == WriteOutcome::Applied {
            info!(%id, bytes = bytes.len(), "state written");
        }
        Ok(outcome)
    }

    pub fn delete_state(
        &self,
        id: &ResourceId,
        token: Option<&LockToken>,
    ) -> Result<WriteOutcome, EngineError> {
        let outcome = self.checked(id, token, || self.documents.remove(id))?;
        if outcome == WriteOutcome::Applied {
            info!(%id, "state deleted");
        }
        Ok(outcome)
    }

    pub fn lock_state(
        &self,
        id: &ResourceId,
        token: LockToken,
        holder: Value,
    ) -> Result<LockOutcome, EngineError> {
        if token.is_empty() {
            return Err(EngineError::EmptyToken);
        }
        match self.locks.acquire(id, token, holder)? {
            Acquire::Acquired(record) => {
                info!(%id, token = %record.token, "lock acquired");
                Ok(LockOutcome::Locked)
            }
            Acquire::Conflict(existing) => {
                warn!(%id, held_by = %existing.token, "lock already held");
                Ok(LockOutcome::Conflict(existing))
            }
        }
    }

    pub fn unlock_state(
        &self,
        id: &ResourceId,
        token: &LockToken,
    ) -> Result<UnlockOutcome, EngineError> {
        match self.locks.release(id, token)? {
            Release::Released => {
                info!(%id, %token, "lock released");
                Ok(UnlockOutcome::Unlocked)
            }
            Release::Mismatch(existing) => {
                warn!(%id, %token, held_by = %existing.token, "unlock token mismatch");
                Ok(UnlockOutcome::Mismatch(existing))
            }
            Release::NotLocked if self.policy.strict_unlock => {
                warn!(%id, %token, "unlock of unlocked resource");
                Ok(UnlockOutcome::NotLocked)
            }
            Release::NotLocked => Ok(UnlockOutcome::Unlocked),
        }
    }

    /// Administrative unlock, bypassing the token check
    pub fn force_unlock_state(&self, id: &ResourceId) -> Result<Option<LockRecord>, EngineError> {
        let removed = self.locks.force_release(id)?;
        if let Some(record) = &removed {
            warn!(%id, token = %record.token, "lock force-released");
        }
        Ok(removed)
    }

    pub fn lock_status(&self, id: &ResourceId) -> Result<Option<LockRecord>, EngineError> {
        Ok(self.locks.status(id)?)
    }

    /// Verify `token` against the lock, then run `apply` under the same entry
    fn checked(
        &self,
        id: &ResourceId,
        token: Option<&LockToken>,
        apply: impl FnOnce() -> Result<(), StoreError>,
    ) -> Result<WriteOutcome, EngineError> {
        // An empty token is what clients send when they hold no lock
        let token = token.filter(|t| !t.is_empty());

        let entry = self.locks.entry(id);
        match entry.peek(token)? {
            Peek::Held => {}
            Peek::Unlocked if self.policy.require_lock_for_write => {
                warn!(%id, "write without lock rejected");
                return Ok(WriteOutcome::LockRequired);
            }
            Peek::Unlocked => {}
            Peek::Conflict(existing) => {
                warn!(
                    %id,
                    presented = token.map(LockToken::as_str).unwrap_or(""),
                    held_by = %existing.token,
                    "write rejected by lock"
                );
                return Ok(WriteOutcome::Conflict(existing));
            }
        }

        apply()?;
        drop(entry);
        Ok(WriteOutcome::Applied)
    }
}

impl<S, C> Coordinator for Engine<S, C>
where
    S: DocumentStore + LockStore + Clone,
    C: Clock,
{
    fn execute(&self, op: Operation) -> Result<Reply, EngineError> {
        Engine::execute(self, op)
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
