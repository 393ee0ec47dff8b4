// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use super::{DocumentStore, LockStore, StoreError};
use crate::coordination::LockRecord;
use crate::id::ResourceId;
use std::time::Instant;

/// Wrapper that adds tracing to any store
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn log_result<T>(result: &Result<T, StoreError>, start: Instant, op: &str) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(elapsed_ms, "{op} done"),
        Err(StoreError::NotFound { .. }) => tracing::debug!(elapsed_ms, "{op}: not found"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "{op} failed"),
    }
}

impl<S: DocumentStore> DocumentStore for TracedStore<S> {
    fn read(&self, id: &ResourceId) -> Result<Vec<u8>, StoreError> {
        let span = tracing::info_span!("store.read", %id);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.read(id);
        log_result(&result, start, "read");
        if let Ok(bytes) = &result {
            tracing::trace!(bytes = bytes.len(), "document loaded");
        }
        result
    }

    fn write(&self, id: &ResourceId, bytes: &[u8]) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.write", %id, bytes = bytes.len());
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.write(id, bytes);
        log_result(&result, start, "write");
        result
    }

    fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.remove", %id);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.remove(id);
        log_result(&result, start, "remove");
        result
    }
}

impl<S: LockStore> LockStore for TracedStore<S> {
    fn load_lock(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError> {
        let span = tracing::info_span!("store.load_lock", %id);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.load_lock(id);
        log_result(&result, start, "load_lock");
        result
    }

    fn save_lock(&self, id: &ResourceId, record: &LockRecord) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.save_lock", %id, token = %record.token);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.save_lock(id, record);
        log_result(&result, start, "save_lock");
        result
    }

    fn remove_lock(&self, id: &ResourceId) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.remove_lock", %id);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.remove_lock(id);
        log_result(&result, start, "remove_lock");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
