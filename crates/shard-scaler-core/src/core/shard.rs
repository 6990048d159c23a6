// crates/shard-scaler-core/src/core/shard.rs
// ============================================================================
// Module: Shard Model
// Description: Shards, partitions, lifecycle states, and the shard directory.
// Purpose: Hold the directory invariants every other component relies on.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ShardDirectory`] is the ordered list of published shards. Index is
//! positional and drives placement, so the directory never reorders entries:
//! merges only append. Construction enforces that every entry is
//! [`ShardLifecycle::Available`], that ids are unique, and that no two entries
//! share a partition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ShardId;
use crate::core::identifiers::SubnetId;
use crate::core::identifiers::ZoneName;

// ============================================================================
// SECTION: Partitions
// ============================================================================

/// Isolation domain that may host at most one shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// Availability zone of the partition.
    pub zone: ZoneName,
    /// Subnet the shard endpoint is placed in.
    pub subnet_id: SubnetId,
}

impl Partition {
    /// Creates a partition from its zone and subnet.
    #[must_use]
    pub fn new(zone: impl Into<ZoneName>, subnet_id: impl Into<SubnetId>) -> Self {
        Self {
            zone: zone.into(),
            subnet_id: subnet_id.into(),
        }
    }

    /// Returns true when both partitions claim the same subnet or zone.
    ///
    /// A zone hosts at most one endpoint per resource group, so a second
    /// subnet in an occupied zone counts as occupied.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.subnet_id == other.subnet_id || self.zone == other.zone
    }
}

// ============================================================================
// SECTION: Shards
// ============================================================================

/// Lifecycle state of a shard endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardLifecycle {
    /// Creation requested, endpoint not yet usable.
    Provisioning,
    /// Endpoint usable and eligible for publication.
    Available,
    /// Creation failed or endpoint is being torn down.
    Failed,
}

impl ShardLifecycle {
    /// Returns a stable label for the lifecycle state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Available => "available",
            Self::Failed => "failed",
        }
    }
}

/// One physical storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Stable identifier, never reused.
    pub id: ShardId,
    /// Network address used to reach the endpoint.
    pub address: IpAddr,
    /// Partition the endpoint lives in.
    pub partition: Partition,
    /// Transient lifecycle state; never published.
    pub lifecycle: ShardLifecycle,
}

impl Shard {
    /// Returns true when the shard may be placed or published.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lifecycle == ShardLifecycle::Available
    }
}

// ============================================================================
// SECTION: Directory Errors
// ============================================================================

/// Directory invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Entry is not available for placement.
    #[error("shard {0} is not available")]
    NotAvailable(ShardId),
    /// Entry id appears twice.
    #[error("shard {0} appears more than once")]
    DuplicateShard(ShardId),
    /// Two entries share a partition.
    #[error("shard {shard} shares a partition with shard {existing}")]
    DuplicatePartition {
        /// Offending shard.
        shard: ShardId,
        /// Shard already holding the partition.
        existing: ShardId,
    },
}

// ============================================================================
// SECTION: Shard Directory
// ============================================================================

/// Ordered list of published shards; index is positional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardDirectory {
    /// Shards in publication order.
    shards: Vec<Shard>,
}

/// Reason a candidate was left out of a merged directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedShard {
    /// Candidate shard identifier.
    pub shard_id: ShardId,
    /// Invariant the candidate would have violated.
    pub reason: DirectoryError,
}

impl ShardDirectory {
    /// Returns an empty directory.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            shards: Vec::new(),
        }
    }

    /// Builds a directory, enforcing availability and uniqueness invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] on the first entry that breaks an invariant.
    pub fn try_from_shards(shards: Vec<Shard>) -> Result<Self, DirectoryError> {
        let mut directory = Self::empty();
        for shard in shards {
            directory.check_candidate(&shard)?;
            directory.shards.push(shard);
        }
        Ok(directory)
    }

    /// Returns a copy with eligible candidates appended in order.
    ///
    /// Existing entries keep their positions. Candidates already present (by
    /// id) are ignored silently; candidates that are not available or whose
    /// partition is taken are reported as skipped.
    #[must_use]
    pub fn with_appended<I>(&self, candidates: I) -> (Self, Vec<SkippedShard>)
    where
        I: IntoIterator<Item = Shard>,
    {
        let mut merged = self.clone();
        let mut skipped = Vec::new();
        for candidate in candidates {
            if merged.contains(&candidate.id) {
                continue;
            }
            match merged.check_candidate(&candidate) {
                Ok(()) => merged.shards.push(candidate),
                Err(reason) => skipped.push(SkippedShard {
                    shard_id: candidate.id,
                    reason,
                }),
            }
        }
        (merged, skipped)
    }

    /// Returns the number of shards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Returns true when no shard is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Returns the shards in positional order.
    #[must_use]
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Returns the shard at a positional index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Shard> {
        self.shards.get(index)
    }

    /// Returns true when a shard with the id is present.
    #[must_use]
    pub fn contains(&self, id: &ShardId) -> bool {
        self.shards.iter().any(|shard| &shard.id == id)
    }

    /// Returns the shard occupying an overlapping partition, if any.
    #[must_use]
    pub fn occupant(&self, partition: &Partition) -> Option<&Shard> {
        self.shards.iter().find(|shard| shard.partition.overlaps(partition))
    }

    /// Verifies a candidate against the current entries.
    fn check_candidate(&self, candidate: &Shard) -> Result<(), DirectoryError> {
        if !candidate.is_available() {
            return Err(DirectoryError::NotAvailable(candidate.id.clone()));
        }
        if self.contains(&candidate.id) {
            return Err(DirectoryError::DuplicateShard(candidate.id.clone()));
        }
        if let Some(existing) = self.occupant(&candidate.partition) {
            return Err(DirectoryError::DuplicatePartition {
                shard: candidate.id.clone(),
                existing: existing.id.clone(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
