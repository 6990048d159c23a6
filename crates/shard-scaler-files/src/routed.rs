// crates/shard-scaler-files/src/routed.rs
// ============================================================================
// Module: Routed File Access
// Description: File operations routed to the shard owning each logical path.
// Purpose: Give consumers one logical namespace over many mounted shards.
// Dependencies: shard-scaler-core, thiserror
// ============================================================================

//! ## Overview
//! [`ShardedFiles`] places every logical path against the full length of the
//! directory read at startup, never against the subset that mounted. When
//! the owning shard is not mounted locally the operation fails with
//! [`FileAccessError::ShardUnavailable`] rather than reading or writing a
//! different shard.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use shard_scaler_core::EventLog;
use shard_scaler_core::PlacementError;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardRoots;
use thiserror::Error;

use crate::mount::MountReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Routed file access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileAccessError {
    /// Directory holds no shards.
    #[error("no shards available")]
    NoShards,
    /// Owning shard is not mounted on this host.
    #[error("shard {shard} at index {index} is not mounted")]
    ShardUnavailable {
        /// Directory position of the owning shard.
        index: usize,
        /// Owning shard identifier.
        shard: ShardId,
    },
    /// Placement rejected the request.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// Filesystem operation failed.
    #[error("file access failed for {path}: {message}")]
    Io {
        /// Physical path involved.
        path: String,
        /// Underlying error description.
        message: String,
    },
}

impl FileAccessError {
    /// Wraps an I/O error with the physical path it concerns.
    fn io(path: &Path, err: &io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Routed Files
// ============================================================================

/// Path-routed file operations over the locally mounted shards.
pub struct ShardedFiles {
    /// Root naming scheme.
    roots: ShardRoots,
    /// Directory entries, in publication order.
    shards: Vec<ShardId>,
    /// Directory positions mounted on this host.
    mounted: BTreeSet<usize>,
    /// Event destination.
    log: EventLog,
}

impl ShardedFiles {
    /// Creates routed access from a directory and the positions mounted locally.
    #[must_use]
    pub fn new(
        roots: ShardRoots,
        directory: &ShardDirectory,
        mounted: impl IntoIterator<Item = usize>,
        log: EventLog,
    ) -> Self {
        Self {
            roots,
            shards: directory.shards().iter().map(|shard| shard.id.clone()).collect(),
            mounted: mounted.into_iter().filter(|index| *index < directory.len()).collect(),
            log,
        }
    }

    /// Creates routed access from the outcome of [`crate::initialize`].
    #[must_use]
    pub fn from_report(roots: ShardRoots, report: &MountReport, log: EventLog) -> Self {
        Self::new(roots, &report.directory, report.mounted_indices(), log)
    }

    /// Returns the directory length used for placement.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns true when the shard at `index` is mounted locally.
    #[must_use]
    pub fn is_mounted(&self, index: usize) -> bool {
        self.mounted.contains(&index)
    }

    /// Resolves the physical path owning a logical path.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError::NoShards`] for an empty directory and
    /// [`FileAccessError::ShardUnavailable`] when the owner is not mounted.
    pub fn physical_path(&self, path: &str) -> Result<PathBuf, FileAccessError> {
        if self.shards.is_empty() {
            return Err(FileAccessError::NoShards);
        }
        let decision = self.roots.place(path, self.shards.len())?;
        if !self.mounted.contains(&decision.shard_index) {
            let shard = self
                .shards
                .get(decision.shard_index)
                .cloned()
                .ok_or(FileAccessError::NoShards)?;
            return Err(FileAccessError::ShardUnavailable {
                index: decision.shard_index,
                shard,
            });
        }
        Ok(decision.physical_path)
    }

    /// Reads the whole file as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError`] when routing or the read fails.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, FileAccessError> {
        let physical = self.route(path)?;
        fs::read(&physical).map_err(|err| self.failed(path, &physical, &err))
    }

    /// Reads the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError`] when routing or the read fails.
    pub fn read_to_string(&self, path: &str) -> Result<String, FileAccessError> {
        let physical = self.route(path)?;
        fs::read_to_string(&physical).map_err(|err| self.failed(path, &physical, &err))
    }

    /// Replaces the file contents, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError`] when routing or the write fails.
    pub fn write(&self, path: &str, contents: &[u8]) -> Result<PathBuf, FileAccessError> {
        let physical = self.route(path)?;
        self.create_parent(path, &physical)?;
        fs::write(&physical, contents).map_err(|err| self.failed(path, &physical, &err))?;
        Ok(physical)
    }

    /// Appends to the file, creating it and its parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError`] when routing or the write fails.
    pub fn append(&self, path: &str, contents: &[u8]) -> Result<PathBuf, FileAccessError> {
        let physical = self.route(path)?;
        self.create_parent(path, &physical)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&physical)
            .and_then(|mut file| file.write_all(contents))
            .map_err(|err| self.failed(path, &physical, &err))?;
        Ok(physical)
    }

    /// Returns true when the file exists on its owning shard.
    ///
    /// An empty directory owns no files, so this returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError::ShardUnavailable`] when the owner is not
    /// mounted, since absence cannot be confirmed.
    pub fn exists(&self, path: &str) -> Result<bool, FileAccessError> {
        match self.route(path) {
            Ok(physical) => Ok(physical.exists()),
            Err(FileAccessError::NoShards) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Deletes the file; returns false when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`FileAccessError`] when routing or the removal fails.
    pub fn delete(&self, path: &str) -> Result<bool, FileAccessError> {
        let physical = self.route(path)?;
        match fs::remove_file(&physical) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.failed(path, &physical, &err)),
        }
    }

    /// Resolves a path, logging routing failures.
    fn route(&self, path: &str) -> Result<PathBuf, FileAccessError> {
        self.physical_path(path).inspect_err(|err| {
            self.log.error(ScalingStep::FileAccess, format!("cannot route {path}: {err}"));
        })
    }

    /// Creates the parent directory of a physical path.
    fn create_parent(&self, path: &str, physical: &Path) -> Result<(), FileAccessError> {
        match physical.parent() {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| self.failed(path, parent, &err))
            }
            None => Ok(()),
        }
    }

    /// Logs and wraps an I/O failure.
    fn failed(&self, path: &str, physical: &Path, err: &io::Error) -> FileAccessError {
        let error = FileAccessError::io(physical, err);
        self.log.error(ScalingStep::FileAccess, format!("{path}: {error}"));
        error
    }
}
