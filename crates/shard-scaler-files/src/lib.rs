// crates/shard-scaler-files/src/lib.rs
// ============================================================================
// Module: Shard Scaler Files Library
// Description: Consumer-side shard mounting and routed file access.
// Purpose: Mount the published shards and route paths to their owners.
// Dependencies: shard-scaler-core, tokio
// ============================================================================

//! ## Overview
//! Consumers call [`initialize`] once at startup and then do all file I/O
//! through [`ShardedFiles`]. The directory is not re-read while running; a
//! redeploy is the reload signal.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod mount;
pub mod routed;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use mount::CommandMountRunner;
pub use mount::DEFAULT_MOUNT_TIMEOUT;
pub use mount::MountError;
pub use mount::MountFailure;
pub use mount::MountReport;
pub use mount::MountRunner;
pub use mount::MountedShard;
pub use mount::NFS_MOUNT_OPTIONS;
pub use mount::initialize;
pub use mount::nfs_mount_args;
pub use routed::FileAccessError;
pub use routed::ShardedFiles;
