// crates/shard-scaler-core/src/core/mod.rs
// ============================================================================
// Module: Shard Scaler Core Types
// Description: Shard model, placement, directory wire format, and outcomes.
// Purpose: Provide stable, pure types shared by the runtime and adapters.
// Dependencies: serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types are pure: nothing here performs I/O or holds shared state.
//! Placement and the directory invariants live here so every consumer, the
//! control loop and routed file access alike, agrees on them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod directory;
pub mod events;
pub mod identifiers;
pub mod outcome;
pub mod placement;
pub mod shard;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use directory::DirectoryCodecError;
pub use directory::DirectoryRecord;
pub use directory::MountTargetRecord;
pub use directory::decode_directory;
pub use directory::encode_directory;
pub use events::EventLevel;
pub use events::ScalingEvent;
pub use events::ScalingStep;
pub use identifiers::ClusterName;
pub use identifiers::NetworkGroupId;
pub use identifiers::ResourceGroupId;
pub use identifiers::RunId;
pub use identifiers::SecurityGroupId;
pub use identifiers::ServiceName;
pub use identifiers::ShardId;
pub use identifiers::SubnetId;
pub use identifiers::ZoneName;
pub use outcome::OutcomeStatus;
pub use outcome::ScalingOutcome;
pub use placement::DEFAULT_MOUNT_BASE;
pub use placement::DEFAULT_MOUNT_PREFIX;
pub use placement::PlacementDecision;
pub use placement::PlacementError;
pub use placement::ShardRoots;
pub use placement::clean_relative_path;
pub use placement::placement;
pub use placement::resolve_path;
pub use shard::DirectoryError;
pub use shard::Partition;
pub use shard::Shard;
pub use shard::ShardDirectory;
pub use shard::ShardLifecycle;
pub use shard::SkippedShard;
