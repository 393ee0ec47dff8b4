// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for state documents and lock records

mod fs;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod traced;

pub use fs::FsStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use traced::TracedStore;

use crate::coordination::LockRecord;
use crate::id::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {id}")]
    NotFound { id: String },
}

impl StoreError {
    pub fn not_found(id: &ResourceId) -> Self {
        StoreError::NotFound { id: id.to_string() }
    }
}

/// Raw state document bytes, one per resource
pub trait DocumentStore: Send + Sync {
    /// Last successfully written bytes, or `NotFound`
    fn read(&self, id: &ResourceId) -> Result<Vec<u8>, StoreError>;

    /// Replace the document; readers see either the old or the new bytes
    fn write(&self, id: &ResourceId, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove the document; absent documents are not an error
    fn remove(&self, id: &ResourceId) -> Result<(), StoreError>;
}

/// Persisted lock records, at most one per resource
pub trait LockStore: Send + Sync {
    fn load_lock(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError>;

    fn save_lock(&self, id: &ResourceId, record: &LockRecord) -> Result<(), StoreError>;

    /// Returns whether a record existed
    fn remove_lock(&self, id: &ResourceId) -> Result<bool, StoreError>;
}
