// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DocumentStore, LockStore, StoreError};
use crate::coordination::LockRecord;
use crate::id::ResourceId;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory store with failure injection for mutating calls
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<HashMap<ResourceId, Vec<u8>>>>,
    locks: Arc<Mutex<HashMap<ResourceId, LockRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write, save, and remove fail with an I/O error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn check_failing(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::other("injected storage failure")));
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, id: &ResourceId) -> Result<Vec<u8>, StoreError> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn write(&self, id: &ResourceId, bytes: &[u8]) -> Result<(), StoreError> {
        self.check_failing()?;
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        self.check_failing()?;
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        Ok(())
    }
}

impl LockStore for MemoryStore {
    fn load_lock(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError> {
        Ok(self
            .locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned())
    }

    fn save_lock(&self, id: &ResourceId, record: &LockRecord) -> Result<(), StoreError> {
        self.check_failing()?;
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), record.clone());
        Ok(())
    }

    fn remove_lock(&self, id: &ResourceId) -> Result<bool, StoreError> {
        self.check_failing()?;
        Ok(self
            .locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some())
    }
}
