// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration
//!
//! Loaded once at startup from TOML, then overridden by environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tfstated_core::Policy;
use thiserror::Error;

use crate::server::DEFAULT_MAX_BODY_BYTES;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "tfstated.toml";

/// Environment variable overriding `listen`
pub const ENV_LISTEN: &str = "TFSTATED_LISTEN";
/// Environment variable overriding `data_dir`
pub const ENV_DATA_DIR: &str = "TFSTATED_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen: String,
    /// Root of the state and lock directories
    pub data_dir: PathBuf,
    /// Largest accepted request body, state documents included
    pub max_body_bytes: usize,
    pub policy: PolicyConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub require_lock_for_write: bool,
    pub strict_unlock: bool,
    /// Expose `DELETE /lock/{user}/{project}`
    pub allow_force_unlock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
    /// Log file; stderr when unset
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            data_dir: PathBuf::from("."),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            policy: PolicyConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            path: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply environment overrides using `lookup` (normally `std::env::var`)
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(listen) = lookup(ENV_LISTEN) {
            self.listen = listen;
        }
        if let Some(data_dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir);
        }
        self
    }

    /// Engine policy derived from the `[policy]` table
    pub fn engine_policy(&self) -> Policy {
        Policy {
            require_lock_for_write: self.policy.require_lock_for_write,
            strict_unlock: self.policy.strict_unlock,
        }
    }

    /// PID file guarding the data directory against a second daemon
    pub fn pid_path(&self) -> PathBuf {
        self.data_dir.join("tfstated.pid")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
