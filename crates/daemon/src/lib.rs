// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfstated-daemon: HTTP transport for the tfstated backend
//!
//! Exposes the Terraform `http` backend protocol (GET/POST/DELETE/LOCK/UNLOCK
//! on `/state/{user}/{project}`) over an axum server.

pub mod config;
pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use config::{Config, ConfigError};
pub use lifecycle::{startup, Daemon, DaemonEngine, LifecycleError};
pub use server::{router, AppState};
