// crates/shard-scaler-files/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Helpers
// Description: Recording mount runner and directory builders.
// Purpose: Exercise mounting and routing without touching real NFS.
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use shard_scaler_core::EventLog;
use shard_scaler_core::InMemoryConfigStore;
use shard_scaler_core::MemoryEventSink;
use shard_scaler_core::Partition;
use shard_scaler_core::Shard;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardLifecycle;
use shard_scaler_core::ShardRegistry;
use shard_scaler_core::ShardRoots;
use shard_scaler_core::encode_directory;
use shard_scaler_core::placement;
use shard_scaler_files::MountError;
use shard_scaler_files::MountRunner;

/// Config store key used by every scenario.
pub const DIRECTORY_KEY: &str = "/efs/mount-targets";

/// Returns an available shard in zone/subnet `n` at `10.0.n.10`.
pub fn shard(id: &str, n: u8) -> Shard {
    Shard {
        id: ShardId::new(id),
        address: IpAddr::V4(Ipv4Addr::new(10, 0, n, 10)),
        partition: Partition::new(format!("az-{n}"), format!("subnet-{n}")),
        lifecycle: ShardLifecycle::Available,
    }
}

/// Builds a directory of `count` shards.
pub fn directory(count: u8) -> ShardDirectory {
    let shards = (0 .. count).map(|n| shard(&format!("fsmt-{n}"), n)).collect();
    ShardDirectory::try_from_shards(shards).unwrap()
}

/// Returns a registry holding the encoded directory.
pub fn registry(directory: &ShardDirectory, log: EventLog) -> ShardRegistry<InMemoryConfigStore> {
    let store =
        InMemoryConfigStore::with_value(DIRECTORY_KEY, &encode_directory(directory).unwrap());
    ShardRegistry::new(store, DIRECTORY_KEY, log)
}

/// Returns shard roots under a temporary base directory.
pub fn roots_under(base: &Path) -> ShardRoots {
    ShardRoots::new(base.to_str().unwrap(), "efs-")
}

/// Returns an event log backed by a fresh memory sink.
pub fn memory_log() -> (EventLog, MemoryEventSink) {
    let events = MemoryEventSink::new();
    (EventLog::new(Arc::new(events.clone())), events)
}

/// Finds a logical path owned by shard `index` out of `count`.
pub fn path_owned_by(index: usize, count: usize) -> String {
    (0 ..)
        .map(|n| format!("data/file-{n}.txt"))
        .find(|path| placement(path, count).unwrap() == index)
        .unwrap()
}

/// Mount runner that records calls and fails for selected addresses.
#[derive(Clone, Default)]
pub struct RecordingMountRunner {
    /// Addresses whose mounts fail.
    failing: Arc<Mutex<BTreeSet<IpAddr>>>,
    /// Successful and failed calls, in order.
    calls: Arc<Mutex<Vec<(IpAddr, PathBuf)>>>,
}

impl RecordingMountRunner {
    /// Makes mounts of `address` fail.
    pub fn fail_address(&self, address: IpAddr) {
        self.failing.lock().unwrap().insert(address);
    }

    /// Returns recorded calls.
    pub fn calls(&self) -> Vec<(IpAddr, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MountRunner for RecordingMountRunner {
    fn mount(&self, address: IpAddr, mount_point: &Path) -> Result<(), MountError> {
        self.calls.lock().unwrap().push((address, mount_point.to_path_buf()));
        if self.failing.lock().unwrap().contains(&address) {
            return Err(MountError::Failed("exit status: 32: access denied".to_string()));
        }
        Ok(())
    }
}
