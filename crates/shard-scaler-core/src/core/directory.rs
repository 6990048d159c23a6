// crates/shard-scaler-core/src/core/directory.rs
// ============================================================================
// Module: Directory Wire Format
// Description: JSON record stored under the configuration store key.
// Purpose: Encode and decode shard directories without transient fields.
// Dependencies: crate::core::shard, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The published record is `{"mount_targets": [...]}` with one entry per
//! shard holding `mount_target_id`, `ip_address`, `availability_zone`, and
//! `subnet_id`. Lifecycle is never written. Decoding ignores unknown fields,
//! so older records that still carry `lifecycle_state` decode cleanly; every
//! decoded entry is treated as available.

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
use crate::core::shard::DirectoryError;
use crate::core::shard::Partition;
use crate::core::shard::Shard;
use crate::core::shard::ShardDirectory;
use crate::core::shard::ShardLifecycle;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Serialized directory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Entries in positional order.
    #[serde(default)]
    pub mount_targets: Vec<MountTargetRecord>,
}

/// Serialized directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTargetRecord {
    /// Shard identifier.
    pub mount_target_id: String,
    /// Endpoint address.
    pub ip_address: String,
    /// Availability zone.
    pub availability_zone: String,
    /// Subnet reference.
    pub subnet_id: String,
}

impl From<&Shard> for MountTargetRecord {
    fn from(shard: &Shard) -> Self {
        Self {
            mount_target_id: shard.id.as_str().to_string(),
            ip_address: shard.address.to_string(),
            availability_zone: shard.partition.zone.as_str().to_string(),
            subnet_id: shard.partition.subnet_id.as_str().to_string(),
        }
    }
}

impl From<&ShardDirectory> for DirectoryRecord {
    fn from(directory: &ShardDirectory) -> Self {
        Self {
            mount_targets: directory.shards().iter().map(MountTargetRecord::from).collect(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Directory codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryCodecError {
    /// Record is not valid JSON for the expected shape.
    #[error("directory record is malformed: {0}")]
    Malformed(String),
    /// Entry carries an unparseable address.
    #[error("shard {shard} has invalid address {address}")]
    InvalidAddress {
        /// Offending shard.
        shard: String,
        /// Raw address text.
        address: String,
    },
    /// Entries break a directory invariant.
    #[error("directory record violates invariants: {0}")]
    Invariant(#[from] DirectoryError),
    /// Record could not be serialized.
    #[error("directory record serialization failed: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Encodes a directory as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`DirectoryCodecError::Serialize`] when serialization fails.
pub fn encode_directory(directory: &ShardDirectory) -> Result<String, DirectoryCodecError> {
    serde_json::to_string_pretty(&DirectoryRecord::from(directory))
        .map_err(|err| DirectoryCodecError::Serialize(err.to_string()))
}

/// Decodes a stored record into a validated directory.
///
/// # Errors
///
/// Returns [`DirectoryCodecError`] when the record is malformed, carries an
/// invalid address, or lists duplicate shards or partitions.
pub fn decode_directory(raw: &str) -> Result<ShardDirectory, DirectoryCodecError> {
    let record: DirectoryRecord =
        serde_json::from_str(raw).map_err(|err| DirectoryCodecError::Malformed(err.to_string()))?;
    let mut shards = Vec::with_capacity(record.mount_targets.len());
    for entry in record.mount_targets {
        let address: IpAddr =
            entry.ip_address.parse().map_err(|_| DirectoryCodecError::InvalidAddress {
                shard: entry.mount_target_id.clone(),
                address: entry.ip_address.clone(),
            })?;
        shards.push(Shard {
            id: ShardId::new(entry.mount_target_id),
            address,
            partition: Partition {
                zone: ZoneName::new(entry.availability_zone),
                subnet_id: SubnetId::new(entry.subnet_id),
            },
            lifecycle: ShardLifecycle::Available,
        });
    }
    Ok(ShardDirectory::try_from_shards(shards)?)
}
