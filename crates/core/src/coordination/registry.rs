// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock registry: per-resource lock bookkeeping over a [`LockStore`]
//!
//! Every check-then-act sequence runs while holding that resource's entry in
//! a [`KeyedMutex`], so two acquires for one resource can never both succeed.

use super::keyed::{KeyGuard, KeyedMutex};
use super::lock::{Acquire, LockRecord, LockToken, Peek, Release};
use crate::clock::Clock;
use crate::id::ResourceId;
use crate::store::{LockStore, StoreError};
use serde_json::Value;

pub struct LockRegistry<S, C> {
    store: S,
    clock: C,
    keys: KeyedMutex,
}

impl<S: LockStore, C: Clock> LockRegistry<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            keys: KeyedMutex::new(),
        }
    }

    /// Take exclusive access to one resource's lock
    ///
    /// Operations on the returned entry, and anything else done while it is
    /// alive, are serialized against every other entry for the same resource.
    pub fn entry(&self, id: &ResourceId) -> LockEntry<'_, S, C> {
        LockEntry {
            guard: self.keys.lock(id),
            registry: self,
            id: id.clone(),
        }
    }

    pub fn acquire(
        &self,
        id: &ResourceId,
        token: LockToken,
        holder: Value,
    ) -> Result<Acquire, StoreError> {
        self.entry(id).acquire(token, holder)
    }

    pub fn release(&self, id: &ResourceId, token: &LockToken) -> Result<Release, StoreError> {
        self.entry(id).release(token)
    }

    pub fn peek(&self, id: &ResourceId, token: Option<&LockToken>) -> Result<Peek, StoreError> {
        self.entry(id).peek(token)
    }

    pub fn force_release(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError> {
        self.entry(id).force_release()
    }

    pub fn status(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError> {
        self.entry(id).status()
    }

    /// Forget mutexes for resources nobody is using
    pub fn prune(&self) -> usize {
        self.keys.prune()
    }
}

/// Exclusive handle on one resource's lock bookkeeping
pub struct LockEntry<'a, S, C> {
    // Held for the lifetime of the entry
    #[allow(dead_code)]
    guard: KeyGuard,
    registry: &'a LockRegistry<S, C>,
    id: ResourceId,
}

impl<S: LockStore, C: Clock> LockEntry<'_, S, C> {
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn status(&self) -> Result<Option<LockRecord>, StoreError> {
        self.registry.store.load_lock(&self.id)
    }

    /// Verify a presented token without changing anything
    ///
    /// With no token, any existing lock is a conflict.
    pub fn peek(&self, token: Option<&LockToken>) -> Result<Peek, StoreError> {
        Ok(match self.status()? {
            None => Peek::Unlocked,
            Some(record) if token.is_some_and(|t| record.is_held_by(t)) => Peek::Held,
            Some(record) => Peek::Conflict(record),
        })
    }

    /// Create the lock if none exists
    pub fn acquire(&self, token: LockToken, holder: Value) -> Result<Acquire, StoreError> {
        if let Some(existing) = self.status()? {
            return Ok(Acquire::Conflict(existing));
        }

        let record = LockRecord {
            token,
            holder,
            created: self.registry.clock.now(),
        };
        self.registry.store.save_lock(&self.id, &record)?;
        Ok(Acquire::Acquired(record))
    }

    /// Remove the lock only if `token` holds it
    pub fn release(&self, token: &LockToken) -> Result<Release, StoreError> {
        match self.status()? {
            None => Ok(Release::NotLocked),
            Some(record) if record.is_held_by(token) => {
                self.registry.store.remove_lock(&self.id)?;
                Ok(Release::Released)
            }
            Some(record) => Ok(Release::Mismatch(record)),
        }
    }

    /// Remove the lock regardless of token, returning what was removed
    pub fn force_release(&self) -> Result<Option<LockRecord>, StoreError> {
        let existing = self.status()?;
        if existing.is_some() {
            self.registry.store.remove_lock(&self.id)?;
        }
        Ok(existing)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
