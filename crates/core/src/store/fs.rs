// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed store
//!
//! Layout under the root:
//! - `state/{user}/{project}.tfstate` raw document bytes
//! - `lock/{user}/{project}.lock` JSON lock record

use super::{DocumentStore, LockStore, StoreError};
use crate::coordination::LockRecord;
use crate::id::ResourceId;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const STATE_DIR: &str = "state";
const LOCK_DIR: &str = "lock";

#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating its directories
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(STATE_DIR))?;
        fs::create_dir_all(root.join(LOCK_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self, id: &ResourceId) -> PathBuf {
        self.root
            .join(STATE_DIR)
            .join(id.user())
            .join(format!("{}.tfstate", id.project()))
    }

    pub fn lock_path(&self, id: &ResourceId) -> PathBuf {
        self.root
            .join(LOCK_DIR)
            .join(id.user())
            .join(format!("{}.lock", id.project()))
    }
}

impl DocumentStore for FsStore {
    fn read(&self, id: &ResourceId) -> Result<Vec<u8>, StoreError> {
        match fs::read(self.state_path(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, id: &ResourceId, bytes: &[u8]) -> Result<(), StoreError> {
        replace(&self.state_path(id), bytes)?;
        Ok(())
    }

    fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        remove_if_exists(&self.state_path(id))?;
        Ok(())
    }
}

impl LockStore for FsStore {
    fn load_lock(&self, id: &ResourceId) -> Result<Option<LockRecord>, StoreError> {
        let bytes = match fs::read(self.lock_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save_lock(&self, id: &ResourceId, record: &LockRecord) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(record)?;
        replace(&self.lock_path(id), &json)?;
        Ok(())
    }

    fn remove_lock(&self, id: &ResourceId) -> Result<bool, StoreError> {
        Ok(remove_if_exists(&self.lock_path(id))?)
    }
}

/// Write to a temp file beside `path`, fsync, then rename over it
fn replace(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // Persist the rename itself
    #[cfg(unix)]
    fs::File::open(dir)?.sync_all()?;

    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
