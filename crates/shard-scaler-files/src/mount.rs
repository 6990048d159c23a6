// crates/shard-scaler-files/src/mount.rs
// ============================================================================
// Module: Shard Mounting
// Description: Mounts every published shard at its positional local root.
// Purpose: Prepare a consumer to route file access across shards.
// Dependencies: shard-scaler-core, tokio
// ============================================================================

//! ## Overview
//! [`initialize`] reads the directory once, then mounts entry `i` at
//! `roots.root(i)`. A shard that cannot be mounted is logged and skipped; the
//! remaining shards still mount. Mount execution goes through
//! [`MountRunner`] so tests never shell out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use shard_scaler_core::ConfigStore;
use shard_scaler_core::EventLog;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardRegistry;
use shard_scaler_core::ShardRoots;
use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Runtime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default limit for a single mount command.
pub const DEFAULT_MOUNT_TIMEOUT: Duration = Duration::from_secs(30);
/// NFS options used for every shard mount.
pub const NFS_MOUNT_OPTIONS: &str = "nfsvers=4.1,rsize=1048576,wsize=1048576,hard,timeo=600,retrans=2";

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Mount execution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// Mount command could not be started.
    #[error("mount command could not start: {0}")]
    Spawn(String),
    /// Mount command exited unsuccessfully.
    #[error("mount command failed: {0}")]
    Failed(String),
    /// Mount command exceeded its time limit.
    #[error("mount command timed out after {0}s")]
    TimedOut(u64),
}

/// Attaches a shard endpoint to a local directory.
pub trait MountRunner {
    /// Mounts the endpoint at `address` onto `mount_point`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError`] when the mount does not complete.
    fn mount(&self, address: IpAddr, mount_point: &Path) -> Result<(), MountError>;
}

/// Builds the `mount` arguments for an NFS 4.1 shard endpoint.
#[must_use]
pub fn nfs_mount_args(address: IpAddr, mount_point: &Path) -> Vec<String> {
    let source = match address {
        IpAddr::V4(v4) => format!("{v4}:/"),
        IpAddr::V6(v6) => format!("[{v6}]:/"),
    };
    vec![
        "-t".to_string(),
        "nfs4".to_string(),
        "-o".to_string(),
        NFS_MOUNT_OPTIONS.to_string(),
        source,
        mount_point.display().to_string(),
    ]
}

/// Runs the system `mount` command under a time limit.
pub struct CommandMountRunner {
    /// Program invoked for each mount.
    program: String,
    /// Limit for a single mount.
    timeout: Duration,
    /// Runtime driving the child process.
    runtime: Runtime,
}

impl CommandMountRunner {
    /// Creates a runner invoking `mount` with the given time limit.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::Spawn`] when the process runtime cannot start.
    pub fn new(timeout: Duration) -> Result<Self, MountError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| MountError::Spawn(err.to_string()))?;
        Ok(Self {
            program: "mount".to_string(),
            timeout,
            runtime,
        })
    }

    /// Replaces the program invoked for each mount.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the mount time limit.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl MountRunner for CommandMountRunner {
    fn mount(&self, address: IpAddr, mount_point: &Path) -> Result<(), MountError> {
        let mut command = Command::new(&self.program);
        command
            .args(nfs_mount_args(address, mount_point))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        self.runtime.block_on(async {
            let output = tokio::time::timeout(self.timeout, command.output())
                .await
                .map_err(|_| MountError::TimedOut(self.timeout.as_secs()))?
                .map_err(|err| MountError::Spawn(err.to_string()))?;
            if output.status.success() {
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                Err(MountError::Failed(format!("{}: {stderr}", output.status)))
            }
        })
    }
}

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Shard mounted at its local root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedShard {
    /// Directory position of the shard.
    pub index: usize,
    /// Shard identifier.
    pub shard_id: ShardId,
    /// Local mount point.
    pub mount_point: PathBuf,
}

/// Shard that could not be mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountFailure {
    /// Directory position of the shard.
    pub index: usize,
    /// Shard identifier.
    pub shard_id: ShardId,
    /// Failure description.
    pub reason: String,
}

/// Result of consumer initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountReport {
    /// Directory read at startup; routing uses its full length.
    pub directory: ShardDirectory,
    /// Shards mounted successfully, in directory order.
    pub mounted: Vec<MountedShard>,
    /// Shards skipped after a failure, in directory order.
    pub failed: Vec<MountFailure>,
}

impl MountReport {
    /// Returns the directory positions that are mounted locally.
    #[must_use]
    pub fn mounted_indices(&self) -> Vec<usize> {
        self.mounted.iter().map(|shard| shard.index).collect()
    }
}

/// Reads the directory and mounts every shard at its positional root.
#[must_use]
pub fn initialize<S, M>(
    registry: &ShardRegistry<S>,
    roots: &ShardRoots,
    runner: &M,
    log: &EventLog,
) -> MountReport
where
    S: ConfigStore,
    M: MountRunner,
{
    let directory = registry.read();
    if directory.is_empty() {
        log.warn(ScalingStep::Mount, "directory is empty; no shards to mount");
    }
    let mut mounted = Vec::new();
    let mut failed = Vec::new();
    for (index, shard) in directory.shards().iter().enumerate() {
        let mount_point = roots.root(index);
        match mount_one(runner, shard.address, &mount_point) {
            Ok(()) => {
                log.info(
                    ScalingStep::Mount,
                    format!("mounted {} ({}) at {}", shard.id, shard.address, mount_point.display()),
                );
                mounted.push(MountedShard {
                    index,
                    shard_id: shard.id.clone(),
                    mount_point,
                });
            }
            Err(reason) => {
                log.error(
                    ScalingStep::Mount,
                    format!("skipping {} at {}: {reason}", shard.id, mount_point.display()),
                );
                failed.push(MountFailure {
                    index,
                    shard_id: shard.id.clone(),
                    reason,
                });
            }
        }
    }
    if mounted.is_empty() && !directory.is_empty() {
        log.error(ScalingStep::Mount, "no shards mounted; file access will fail");
    } else {
        log.info(
            ScalingStep::Mount,
            format!("mounted {}/{} shards", mounted.len(), directory.len()),
        );
    }
    MountReport {
        directory,
        mounted,
        failed,
    }
}

/// Creates the mount point and runs the mount.
fn mount_one<M: MountRunner>(
    runner: &M,
    address: IpAddr,
    mount_point: &Path,
) -> Result<(), String> {
    fs::create_dir_all(mount_point)
        .map_err(|err| format!("cannot create mount point: {err}"))?;
    runner.mount(address, mount_point).map_err(|err| err.to_string())
}
