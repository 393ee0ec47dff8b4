// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, serving, shutdown.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use fs2::FileExt;
use tfstated_core::{Coordinator, Engine, FsStore, StoreError, SystemClock, TracedStore};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::server::{self, AppState};

/// How often idle per-resource mutexes are dropped
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Engine with concrete store types (wrapped with tracing)
pub type DaemonEngine = Engine<TracedStore<FsStore>, SystemClock>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock on {0}: daemon already running?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A started daemon, bound but not yet serving
pub struct Daemon {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    lock_file: File,
    listener: TcpListener,
    engine: Arc<DaemonEngine>,
    pub start_time: Instant,
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    match startup_inner(config).await {
        Ok(daemon) => Ok(daemon),
        Err(e) => {
            // The pid file belongs to the running daemon when we lost the lock race
            if !matches!(e, LifecycleError::LockFailed(..)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<Daemon, LifecycleError> {
    // 1. Data directory
    std::fs::create_dir_all(&config.data_dir)?;

    // 2. Acquire lock file FIRST; truncate only once we own it
    let pid_path = config.pid_path();
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&pid_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(pid_path.clone(), e))?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Open the store (creates state/ and lock/)
    let store = TracedStore::new(FsStore::open(&config.data_dir)?);
    let engine = Arc::new(Engine::new(store, SystemClock, config.engine_policy()));

    // 4. Bind LAST, only after everything else succeeded
    let listener = TcpListener::bind(&config.listen)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.listen.clone(), e))?;

    info!(
        data_dir = %config.data_dir.display(),
        listen = %config.listen,
        policy = ?config.policy,
        "daemon started"
    );

    Ok(Daemon {
        config: config.clone(),
        lock_file,
        listener,
        engine,
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    let pid_path = config.pid_path();
    if pid_path.exists() {
        if let Err(e) = std::fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file after failed startup: {}", e);
        }
    }
}

impl Daemon {
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn engine(&self) -> &Arc<DaemonEngine> {
        &self.engine
    }

    pub fn router(&self) -> Router {
        let engine: Arc<dyn Coordinator> = self.engine.clone();
        server::router(
            AppState::new(engine, self.config.policy.allow_force_unlock)
                .with_max_body_bytes(self.config.max_body_bytes),
        )
    }

    /// Serve until `shutdown` resolves, then remove the pid file
    pub async fn run<F>(self, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let Daemon {
            config,
            lock_file,
            listener,
            engine,
            start_time,
        } = self;

        let pruner = tokio::spawn(async move {
            let mut tick = tokio::time::interval(PRUNE_INTERVAL);
            tick.tick().await;
            loop {
                tick.tick().await;
                let pruned = engine.locks().prune();
                if pruned > 0 {
                    debug!(pruned, "dropped idle resource mutexes");
                }
            }
        });

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        pruner.abort();

        info!(
            uptime_secs = start_time.elapsed().as_secs(),
            "Shutting down daemon..."
        );
        let pid_path = config.pid_path();
        if pid_path.exists() {
            if let Err(e) = std::fs::remove_file(&pid_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        // Lock released here, after the pid file is gone
        drop(lock_file);

        served?;
        info!("Daemon shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
