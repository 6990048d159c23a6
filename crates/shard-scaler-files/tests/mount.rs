// crates/shard-scaler-files/tests/mount.rs
// ============================================================================
// Module: Mount Initialization Tests
// Description: Directory-driven mounting with per-shard failure isolation.
// Purpose: Ensure every shard mounts at its positional root or is skipped.
// ============================================================================

//! Mount initialization tests for the shard scaler files crate.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use common::RecordingMountRunner;
use common::directory;
use common::memory_log;
use common::registry;
use common::roots_under;
use shard_scaler_core::EventLevel;
use shard_scaler_core::EventLog;
use shard_scaler_core::InMemoryConfigStore;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::ShardRegistry;
use shard_scaler_files::CommandMountRunner;
use shard_scaler_files::MountError;
use shard_scaler_files::MountRunner;
use shard_scaler_files::NFS_MOUNT_OPTIONS;
use shard_scaler_files::initialize;
use shard_scaler_files::nfs_mount_args;

/// Tests every shard is mounted at the root matching its directory index.
#[test]
fn initialize_mounts_each_shard_at_its_index() {
    let base = tempfile::tempdir().unwrap();
    let roots = roots_under(base.path());
    let (log, _events) = memory_log();
    let runner = RecordingMountRunner::default();
    let report = initialize(&registry(&directory(3), log.clone()), &roots, &runner, &log);

    assert_eq!(report.directory.len(), 3);
    assert_eq!(report.mounted_indices(), vec![0, 1, 2]);
    assert!(report.failed.is_empty());
    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    for (index, (address, mount_point)) in calls.iter().enumerate() {
        let octet = u8::try_from(index).unwrap();
        assert_eq!(*address, IpAddr::V4(Ipv4Addr::new(10, 0, octet, 10)));
        assert_eq!(mount_point, &roots.root(index));
        assert!(mount_point.is_dir());
    }
}

/// Tests a failed mount is logged and skipped while later shards still mount.
#[test]
fn initialize_skips_failed_mounts() {
    let base = tempfile::tempdir().unwrap();
    let roots = roots_under(base.path());
    let (log, events) = memory_log();
    let runner = RecordingMountRunner::default();
    runner.fail_address(IpAddr::V4(Ipv4Addr::new(10, 0, 1, 10)));
    let report = initialize(&registry(&directory(3), log.clone()), &roots, &runner, &log);

    assert_eq!(report.mounted_indices(), vec![0, 2]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].shard_id.as_str(), "fsmt-1");
    assert!(report.failed[0].reason.contains("access denied"));
    let errors: Vec<_> = events
        .events_for(ScalingStep::Mount)
        .into_iter()
        .filter(|event| event.level == EventLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("fsmt-1"));
}

/// Tests a missing directory mounts nothing and reports an empty directory.
#[test]
fn initialize_with_absent_directory_mounts_nothing() {
    let base = tempfile::tempdir().unwrap();
    let (log, events) = memory_log();
    let runner = RecordingMountRunner::default();
    let registry = ShardRegistry::new(InMemoryConfigStore::new(), "/missing", log.clone());
    let report = initialize(&registry, &roots_under(base.path()), &runner, &log);

    assert!(report.directory.is_empty());
    assert!(report.mounted.is_empty());
    assert!(runner.calls().is_empty());
    assert!(!events.events_for(ScalingStep::Mount).is_empty());
}

/// Tests a mount point that cannot be created is skipped without mounting.
#[test]
fn initialize_skips_uncreatable_mount_point() {
    let base = tempfile::tempdir().unwrap();
    let blocker = base.path().join("efs-0");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let runner = RecordingMountRunner::default();
    let report = initialize(
        &registry(&directory(2), EventLog::disabled()),
        &roots_under(base.path()),
        &runner,
        &EventLog::disabled(),
    );

    assert_eq!(report.mounted_indices(), vec![1]);
    assert_eq!(report.failed[0].index, 0);
    assert_eq!(runner.calls().len(), 1);
}

/// Tests the NFS arguments match the shard mount contract.
#[test]
fn nfs_arguments_use_fixed_options() {
    let args = nfs_mount_args(IpAddr::V4(Ipv4Addr::new(10, 0, 1, 25)), Path::new("/mnt/efs-0"));
    assert_eq!(args, vec!["-t", "nfs4", "-o", NFS_MOUNT_OPTIONS, "10.0.1.25:/", "/mnt/efs-0"]);
    assert_eq!(
        NFS_MOUNT_OPTIONS,
        "nfsvers=4.1,rsize=1048576,wsize=1048576,hard,timeo=600,retrans=2"
    );
    let v6 = nfs_mount_args("fd00::5".parse().unwrap(), Path::new("/mnt/efs-1"));
    assert_eq!(v6[4], "[fd00::5]:/");
}

/// Tests the command runner reports exit status and spawn failures.
#[cfg(unix)]
#[test]
fn command_runner_reports_process_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let address = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

    let ok = CommandMountRunner::new(Duration::from_secs(5)).unwrap().with_program("true");
    assert_eq!(ok.mount(address, dir.path()), Ok(()));

    let failing = CommandMountRunner::new(Duration::from_secs(5)).unwrap().with_program("false");
    assert!(matches!(failing.mount(address, dir.path()), Err(MountError::Failed(_))));

    let missing = CommandMountRunner::new(Duration::from_secs(5))
        .unwrap()
        .with_program("shard-scaler-no-such-mount-binary");
    assert!(matches!(missing.mount(address, dir.path()), Err(MountError::Spawn(_))));
}
