// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! tfstated-core: state and lock coordination for the tfstated backend
//!
//! This crate provides:
//! - Resource identifiers derived from (user, project) path segments
//! - Durable document and lock-record storage with atomic replace
//! - A lock registry with per-resource mutual exclusion
//! - The coordination engine enforcing lock-checked writes

pub mod clock;
pub mod coordination;
pub mod engine;
pub mod id;
pub mod store;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use coordination::{Acquire, LockRecord, LockRegistry, LockToken, Peek, Release};
pub use engine::{
    Coordinator, Engine, EngineError, LockOutcome, Operation, Policy, Reply, UnlockOutcome,
    WriteOutcome,
};
pub use id::{IdError, ResourceId};
pub use store::{DocumentStore, FsStore, LockStore, StoreError, TracedStore};

#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
