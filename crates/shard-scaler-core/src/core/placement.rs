// crates/shard-scaler-core/src/core/placement.rs
// ============================================================================
// Module: Placement Engine
// Description: Hash-and-modulo mapping from logical paths to shard roots.
// Purpose: Resolve every logical path to exactly one shard for a given count.
// Dependencies: sha2, thiserror
// ============================================================================

//! ## Overview
//! Placement hashes the UTF-8 bytes of a logical path with SHA-256, reads the
//! digest as a big-endian unsigned integer, and reduces it modulo the shard
//! count. The reduction runs byte by byte over the fixed-size digest, so the
//! hot path allocates nothing and holds no shared state.
//!
//! This is modulo placement, not consistent hashing. Growing the shard count
//! remaps most existing paths to a different shard; files already written are
//! not migrated and stay on the shard that was canonical when they were
//! written. Callers that grow the directory must accept that older files are
//! only reachable under the shard count they were written with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default parent directory of shard mount points.
pub const DEFAULT_MOUNT_BASE: &str = "/mnt";
/// Default prefix of shard mount point names.
pub const DEFAULT_MOUNT_PREFIX: &str = "efs-";
/// Path separator used for shard-relative paths.
const SEPARATOR: char = '/';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Placement errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Caller supplied an argument outside the contract.
    #[error("invalid placement argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// SECTION: Placement
// ============================================================================

/// Returns the shard index owning `path` for `shard_count` shards.
///
/// # Errors
///
/// Returns [`PlacementError::InvalidArgument`] when `shard_count` is zero.
pub fn placement(path: &str, shard_count: usize) -> Result<usize, PlacementError> {
    if shard_count == 0 {
        return Err(PlacementError::InvalidArgument(
            "shard count must be greater than 0".to_string(),
        ));
    }
    let digest = Sha256::digest(path.as_bytes());
    let modulus = shard_count as u128;
    let mut remainder: u128 = 0;
    for byte in digest {
        // remainder < modulus <= 2^64, so the shifted value fits in 72 bits.
        remainder = ((remainder << 8) | u128::from(byte)) % modulus;
    }
    usize::try_from(remainder)
        .map_err(|_| PlacementError::InvalidArgument("shard index overflow".to_string()))
}

/// Derived placement for one logical path; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDecision {
    /// Logical path as supplied by the caller.
    pub path: String,
    /// Positional shard index.
    pub shard_index: usize,
    /// Physical path under the shard root.
    pub physical_path: PathBuf,
}

// ============================================================================
// SECTION: Shard Roots
// ============================================================================

/// Naming scheme for per-shard local roots (`{base}/{prefix}{index}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRoots {
    /// Normalized parent directory without a trailing separator.
    base: String,
    /// Mount point name prefix.
    prefix: String,
}

impl Default for ShardRoots {
    fn default() -> Self {
        Self::new(DEFAULT_MOUNT_BASE, DEFAULT_MOUNT_PREFIX)
    }
}

impl ShardRoots {
    /// Creates a root scheme from a base directory and name prefix.
    ///
    /// Repeated separators in `base` are collapsed and a trailing separator is
    /// dropped, so roots never contain doubled separators.
    #[must_use]
    pub fn new(base: impl AsRef<str>, prefix: impl Into<String>) -> Self {
        let raw = base.as_ref();
        let mut base = String::with_capacity(raw.len());
        for segment in raw.split(SEPARATOR).filter(|segment| !segment.is_empty()) {
            if !base.is_empty() || raw.starts_with(SEPARATOR) {
                base.push(SEPARATOR);
            }
            base.push_str(segment);
        }
        if base.is_empty() && raw.starts_with(SEPARATOR) {
            base.push(SEPARATOR);
        }
        Self {
            base,
            prefix: prefix.into().replace(SEPARATOR, ""),
        }
    }

    /// Returns the local root of the shard at `index`.
    #[must_use]
    pub fn root(&self, index: usize) -> PathBuf {
        PathBuf::from(self.root_string(index))
    }

    /// Joins a logical path under the root of shard `index`.
    ///
    /// Leading separators are stripped, repeated separators collapse, `.`
    /// segments are dropped, and `..` never climbs above the shard root.
    #[must_use]
    pub fn resolve_path(&self, path: &str, index: usize) -> PathBuf {
        let mut resolved = self.root_string(index);
        let relative = clean_relative_path(path);
        if !relative.is_empty() {
            resolved.push(SEPARATOR);
            resolved.push_str(&relative);
        }
        PathBuf::from(resolved)
    }

    /// Computes the full placement decision for a logical path.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidArgument`] when `shard_count` is zero.
    pub fn place(&self, path: &str, shard_count: usize) -> Result<PlacementDecision, PlacementError> {
        let shard_index = placement(path, shard_count)?;
        Ok(PlacementDecision {
            path: path.to_string(),
            shard_index,
            physical_path: self.resolve_path(path, shard_index),
        })
    }

    /// Formats the root string for a shard index.
    fn root_string(&self, index: usize) -> String {
        if self.base.is_empty() {
            format!("{}{index}", self.prefix)
        } else if self.base.ends_with(SEPARATOR) {
            format!("{}{}{index}", self.base, self.prefix)
        } else {
            format!("{}{SEPARATOR}{}{index}", self.base, self.prefix)
        }
    }
}

/// Joins a logical path under the default root of shard `index`.
#[must_use]
pub fn resolve_path(path: &str, index: usize) -> PathBuf {
    ShardRoots::default().resolve_path(path, index)
}

/// Normalizes a logical path into a clean shard-relative path.
#[must_use]
pub fn clean_relative_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
