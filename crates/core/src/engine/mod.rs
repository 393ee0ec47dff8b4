// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination engine: lock-checked access to state documents

pub mod operation;
pub mod runtime;

// Re-exports
pub use operation::{LockOutcome, Operation, Reply, UnlockOutcome, WriteOutcome};
pub use runtime::{Coordinator, Engine, EngineError, Policy};
