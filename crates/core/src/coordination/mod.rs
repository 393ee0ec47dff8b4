// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock coordination for state resources
//!
//! This module provides:
//! - **LockRecord** - The persisted exclusive claim on one resource
//! - **KeyedMutex** - Per-resource mutual exclusion
//! - **LockRegistry** - Acquire, release, peek, and force-release over a lock store

pub mod keyed;
pub mod lock;
pub mod registry;

pub use keyed::{KeyGuard, KeyedMutex};
pub use lock::{Acquire, LockRecord, LockToken, Peek, Release};
pub use registry::{LockEntry, LockRegistry};
