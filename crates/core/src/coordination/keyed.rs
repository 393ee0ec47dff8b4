// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource mutual exclusion

use crate::id::ResourceId;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Held while a resource's lock bookkeeping is being read or changed
pub type KeyGuard = parking_lot::lock_api::ArcMutexGuard<RawMutex, ()>;

/// One mutex per [`ResourceId`], created on first use
///
/// The table lock is only held to look up or insert an entry; waiting on a
/// busy resource never blocks other resources.
#[derive(Default)]
pub struct KeyedMutex {
    entries: Mutex<HashMap<ResourceId, Arc<Mutex<()>>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the mutex for `id` is held
    pub fn lock(&self, id: &ResourceId) -> KeyGuard {
        let entry = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(id.clone()).or_default())
        };
        entry.lock_arc()
    }

    /// Try to take the mutex for `id` without waiting
    pub fn try_lock(&self, id: &ResourceId) -> Option<KeyGuard> {
        let entry = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(id.clone()).or_default())
        };
        entry.try_lock_arc()
    }

    /// Drop entries nobody is holding or waiting on
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| Arc::strong_count(entry) > 1);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "keyed_tests.rs"]
mod tests;
