// crates/shard-scaler-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Helpers
// Description: Builders for shards, partitions, and wired controllers.
// Purpose: Keep scaling scenarios short and consistent across test files.
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shard_scaler_core::ClusterName;
use shard_scaler_core::EventLog;
use shard_scaler_core::FakeControlPlane;
use shard_scaler_core::InMemoryConfigStore;
use shard_scaler_core::MemoryEventSink;
use shard_scaler_core::NetworkGroupId;
use shard_scaler_core::Partition;
use shard_scaler_core::PollPolicy;
use shard_scaler_core::ProvisionScope;
use shard_scaler_core::RecordingNotifier;
use shard_scaler_core::ResourceGroupId;
use shard_scaler_core::ScalingController;
use shard_scaler_core::ScalingTargets;
use shard_scaler_core::ServiceName;
use shard_scaler_core::Shard;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardLifecycle;
use shard_scaler_core::ShardProvisioner;
use shard_scaler_core::ShardRegistry;
use shard_scaler_core::StaticUtilization;
use shard_scaler_core::UtilizationMonitor;
use shard_scaler_core::VirtualSleeper;
use shard_scaler_core::encode_directory;

/// Config store key used by every scenario.
pub const DIRECTORY_KEY: &str = "/efs/mount-targets";

/// Controller type wired with in-memory collaborators.
pub type FakeController = ScalingController<
    StaticUtilization,
    InMemoryConfigStore,
    FakeControlPlane,
    RecordingNotifier,
    VirtualSleeper,
>;

/// Returns the partition for zone index `n` (`az-n` / `subnet-n`).
pub fn partition(n: u8) -> Partition {
    Partition::new(format!("az-{n}"), format!("subnet-{n}"))
}

/// Returns an available shard in partition `n`.
pub fn shard(id: &str, n: u8) -> Shard {
    Shard {
        id: ShardId::new(id),
        address: IpAddr::V4(Ipv4Addr::new(10, 0, n, 10)),
        partition: partition(n),
        lifecycle: ShardLifecycle::Available,
    }
}

/// Returns the encoded directory for the shards.
pub fn encoded(shards: Vec<Shard>) -> String {
    encode_directory(&ShardDirectory::try_from_shards(shards).unwrap()).unwrap()
}

/// Handles kept by a test after the controller takes ownership of clones.
pub struct Harness {
    /// Controller under test.
    pub controller: FakeController,
    /// Store shared with the controller.
    pub store: InMemoryConfigStore,
    /// Control plane shared with the controller.
    pub plane: FakeControlPlane,
    /// Notifier shared with the controller.
    pub notifier: RecordingNotifier,
    /// Sleeper shared with the controller.
    pub sleeper: VirtualSleeper,
    /// Event sink shared with the controller.
    pub events: MemoryEventSink,
}

/// Wires a controller around fakes.
pub fn harness(
    utilization: StaticUtilization,
    threshold: u64,
    store: InMemoryConfigStore,
    plane: FakeControlPlane,
) -> Harness {
    let notifier = RecordingNotifier::new();
    let sleeper = VirtualSleeper::new();
    let events = MemoryEventSink::new();
    let log = EventLog::new(Arc::new(events.clone()));
    let scope = ProvisionScope {
        resource_group: ResourceGroupId::new("fs-12345678"),
        network_group: NetworkGroupId::new("vpc-12345678"),
        security_group: None,
    };
    let policy = PollPolicy::new(Duration::from_secs(10), Duration::from_secs(300)).unwrap();
    let controller = ScalingController::new(
        UtilizationMonitor::new(utilization, threshold),
        ShardRegistry::new(store.clone(), DIRECTORY_KEY, log.clone()),
        ShardProvisioner::new(plane.clone(), sleeper.clone(), scope, policy),
        notifier.clone(),
        ScalingTargets {
            measurement_target: PathBuf::from("/mnt/efs/data"),
            cluster: ClusterName::new("file-cluster"),
            service: ServiceName::new("file-service"),
        },
        log,
    );
    Harness {
        controller,
        store,
        plane,
        notifier,
        sleeper,
        events,
    }
}
