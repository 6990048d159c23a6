// crates/shard-scaler-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Collaborators
// Description: Deterministic fakes for stores, control planes, and notifiers.
// Purpose: Exercise the scaling runtime without cloud access or real delays.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! These collaborators back tests and local demos. They are cheap to clone:
//! clones share state, so a test can keep a handle for inspection after
//! moving the original into a controller. They are not intended for
//! production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::identifiers::ClusterName;
use crate::core::identifiers::NetworkGroupId;
use crate::core::identifiers::ResourceGroupId;
use crate::core::identifiers::ServiceName;
use crate::core::identifiers::ShardId;
use crate::core::shard::Partition;
use crate::core::shard::Shard;
use crate::core::shard::ShardLifecycle;
use crate::interfaces::ConfigStore;
use crate::interfaces::ConfigStoreError;
use crate::interfaces::ControlPlaneError;
use crate::interfaces::CreateShardRequest;
use crate::interfaces::MeasureError;
use crate::interfaces::NotifyError;
use crate::interfaces::RedeployNotifier;
use crate::interfaces::RedeployReceipt;
use crate::interfaces::ResourceControlPlane;
use crate::interfaces::Sleeper;
use crate::interfaces::UtilizationSource;

// ============================================================================
// SECTION: Config Store
// ============================================================================

/// Shared state of the in-memory config store.
#[derive(Debug, Default)]
struct ConfigStoreState {
    /// Stored values by key.
    values: BTreeMap<String, String>,
    /// Error returned by every read when set.
    get_failure: Option<ConfigStoreError>,
    /// Error returned by every write when set.
    put_failure: Option<ConfigStoreError>,
    /// Number of write attempts.
    put_calls: usize,
}

/// In-memory configuration store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConfigStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<ConfigStoreState>>,
}

impl InMemoryConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.values.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Makes every subsequent read fail with `failure`.
    pub fn fail_reads(&self, failure: Option<ConfigStoreError>) {
        if let Ok(mut state) = self.state.lock() {
            state.get_failure = failure;
        }
    }

    /// Makes every subsequent write fail with `failure`.
    pub fn fail_writes(&self, failure: Option<ConfigStoreError>) {
        if let Ok(mut state) = self.state.lock() {
            state.put_failure = failure;
        }
    }

    /// Returns the stored value for a key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.lock().ok().and_then(|state| state.values.get(key).cloned())
    }

    /// Returns the number of write attempts.
    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.state.lock().map(|state| state.put_calls).unwrap_or_default()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ConfigStoreError::Backend("config store mutex poisoned".to_string()))?;
        if let Some(failure) = &state.get_failure {
            return Err(failure.clone());
        }
        Ok(state.values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str, overwrite: bool) -> Result<(), ConfigStoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ConfigStoreError::Backend("config store mutex poisoned".to_string()))?;
        state.put_calls += 1;
        if let Some(failure) = &state.put_failure {
            return Err(failure.clone());
        }
        if !overwrite && state.values.contains_key(key) {
            return Err(ConfigStoreError::Backend(format!("key {key} already exists")));
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// SECTION: Control Plane
// ============================================================================

/// Shared state of the fake control plane.
#[derive(Debug, Default)]
struct ControlPlaneState {
    /// Shards in creation order.
    shards: Vec<Shard>,
    /// Partitions in listing order.
    partitions: Vec<Partition>,
    /// Lifecycle states reported by successive polls of a new shard.
    creation_script: VecDeque<ShardLifecycle>,
    /// State reported once the script is exhausted (available when unset).
    creation_settles_to: Option<ShardLifecycle>,
    /// Error returned by the next creation request.
    create_failure: Option<ControlPlaneError>,
    /// Error returned by shard listings.
    list_failure: Option<ControlPlaneError>,
    /// Number of creation requests.
    create_calls: usize,
    /// Number of describe calls.
    describe_calls: usize,
    /// Counter used to allocate ids and addresses.
    next_serial: u32,
}

/// Fake resource control plane with scripted creation lifecycles.
///
/// New shards start provisioning. Each describe call pops the next state from
/// the creation script and applies it. Once the script is exhausted the shard
/// settles to the scripted final state, available by default.
#[derive(Debug, Default, Clone)]
pub struct FakeControlPlane {
    /// Control plane state protected by a mutex.
    state: Arc<Mutex<ControlPlaneState>>,
}

impl FakeControlPlane {
    /// Creates a control plane with the given partitions and no shards.
    #[must_use]
    pub fn new(partitions: Vec<Partition>) -> Self {
        let plane = Self::default();
        if let Ok(mut state) = plane.state.lock() {
            state.partitions = partitions;
        }
        plane
    }

    /// Adds an existing shard.
    #[must_use]
    pub fn with_shard(self, shard: Shard) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.shards.push(shard);
        }
        self
    }

    /// Sets the states successive polls report for new shards and the state
    /// they settle to afterwards.
    pub fn script_creation(&self, lifecycles: Vec<ShardLifecycle>, settles_to: ShardLifecycle) {
        if let Ok(mut state) = self.state.lock() {
            state.creation_script = lifecycles.into();
            state.creation_settles_to = Some(settles_to);
        }
    }

    /// Makes the next creation request fail.
    pub fn fail_next_create(&self, failure: ControlPlaneError) {
        if let Ok(mut state) = self.state.lock() {
            state.create_failure = Some(failure);
        }
    }

    /// Makes shard listings fail.
    pub fn fail_listing(&self, failure: Option<ControlPlaneError>) {
        if let Ok(mut state) = self.state.lock() {
            state.list_failure = failure;
        }
    }

    /// Returns a snapshot of every shard.
    #[must_use]
    pub fn shards(&self) -> Vec<Shard> {
        self.state.lock().map(|state| state.shards.clone()).unwrap_or_default()
    }

    /// Returns the number of creation requests.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state.lock().map(|state| state.create_calls).unwrap_or_default()
    }

    /// Returns the number of describe calls.
    #[must_use]
    pub fn describe_calls(&self) -> usize {
        self.state.lock().map(|state| state.describe_calls).unwrap_or_default()
    }

    /// Locks the state, mapping poisoning to a backend error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ControlPlaneState>, ControlPlaneError> {
        self.state
            .lock()
            .map_err(|_| ControlPlaneError::Backend("control plane mutex poisoned".to_string()))
    }
}

impl ResourceControlPlane for FakeControlPlane {
    fn list_shards(&self, _resource_group: &ResourceGroupId) -> Result<Vec<Shard>, ControlPlaneError> {
        let state = self.lock()?;
        if let Some(failure) = &state.list_failure {
            return Err(failure.clone());
        }
        Ok(state.shards.clone())
    }

    fn list_partitions(
        &self,
        _network_group: &NetworkGroupId,
    ) -> Result<Vec<Partition>, ControlPlaneError> {
        Ok(self.lock()?.partitions.clone())
    }

    fn create_shard(&self, request: &CreateShardRequest) -> Result<ShardId, ControlPlaneError> {
        let mut state = self.lock()?;
        state.create_calls += 1;
        if let Some(failure) = state.create_failure.take() {
            return Err(failure);
        }
        if state.shards.iter().any(|shard| shard.partition.overlaps(&request.partition)) {
            return Err(ControlPlaneError::Conflict(format!(
                "partition {} already hosts a shard",
                request.partition.subnet_id
            )));
        }
        state.next_serial = state.next_serial.saturating_add(1);
        let serial = state.next_serial;
        let id = ShardId::new(format!("fsmt-fake{serial:04}"));
        let [_, high, mid, low] = serial.to_be_bytes();
        state.shards.push(Shard {
            id: id.clone(),
            address: IpAddr::V4(Ipv4Addr::new(10, high, mid, low)),
            partition: request.partition.clone(),
            lifecycle: ShardLifecycle::Provisioning,
        });
        Ok(id)
    }

    fn describe_shard(&self, shard_id: &ShardId) -> Result<Option<Shard>, ControlPlaneError> {
        let mut state = self.lock()?;
        state.describe_calls += 1;
        let next = state
            .creation_script
            .pop_front()
            .or(state.creation_settles_to)
            .unwrap_or(ShardLifecycle::Available);
        let Some(shard) = state.shards.iter_mut().find(|shard| &shard.id == shard_id) else {
            return Ok(None);
        };
        if shard.lifecycle == ShardLifecycle::Provisioning {
            shard.lifecycle = next;
        }
        Ok(Some(shard.clone()))
    }
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Shared state of the recording notifier.
#[derive(Debug, Default)]
struct NotifierState {
    /// Redeploy requests received.
    calls: Vec<(ClusterName, ServiceName)>,
    /// Error returned by every request when set.
    failure: Option<NotifyError>,
}

/// Notifier that records redeploy requests.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    /// Notifier state protected by a mutex.
    state: Arc<Mutex<NotifierState>>,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent request fail with `failure`.
    pub fn fail_with(&self, failure: Option<NotifyError>) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = failure;
        }
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(ClusterName, ServiceName)> {
        self.state.lock().map(|state| state.calls.clone()).unwrap_or_default()
    }
}

impl RedeployNotifier for RecordingNotifier {
    fn force_redeploy(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<RedeployReceipt, NotifyError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| NotifyError::Backend("notifier mutex poisoned".to_string()))?;
        state.calls.push((cluster.clone(), service.clone()));
        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        Ok(RedeployReceipt {
            active_deployments: 2,
        })
    }
}

// ============================================================================
// SECTION: Utilization And Time
// ============================================================================

/// Utilization source returning a fixed result.
#[derive(Debug, Clone)]
pub struct StaticUtilization {
    /// Result returned for every target.
    result: Result<u64, MeasureError>,
}

impl StaticUtilization {
    /// Returns `count` for every target.
    #[must_use]
    pub const fn count(count: u64) -> Self {
        Self {
            result: Ok(count),
        }
    }

    /// Fails every measurement with `error`.
    #[must_use]
    pub const fn failing(error: MeasureError) -> Self {
        Self {
            result: Err(error),
        }
    }
}

impl UtilizationSource for StaticUtilization {
    fn measure(&self, _target: &Path) -> Result<u64, MeasureError> {
        self.result.clone()
    }
}

/// Sleeper that records requested delays without waiting.
#[derive(Debug, Default, Clone)]
pub struct VirtualSleeper {
    /// Requested delays in order.
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl VirtualSleeper {
    /// Creates a sleeper with no recorded delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sum of requested delays.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.slept.lock().map(|slept| slept.iter().sum()).unwrap_or_default()
    }

    /// Returns the number of sleeps requested.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.slept.lock().map(|slept| slept.len()).unwrap_or_default()
    }
}

impl Sleeper for VirtualSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}
