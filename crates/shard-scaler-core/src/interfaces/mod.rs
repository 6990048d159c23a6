// crates/shard-scaler-core/src/interfaces/mod.rs
// ============================================================================
// Module: Shard Scaler Interfaces
// Description: Backend-agnostic seams for stores, control planes, and sinks.
// Purpose: Define the contract surfaces the scaling runtime depends on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime talks to the outside world only through these traits, so the
//! controller runs unchanged against cloud adapters or in-memory fakes.
//! Implementations report failures as values; none of them may panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::core::events::ScalingEvent;
use crate::core::identifiers::ClusterName;
use crate::core::identifiers::NetworkGroupId;
use crate::core::identifiers::ResourceGroupId;
use crate::core::identifiers::SecurityGroupId;
use crate::core::identifiers::ServiceName;
use crate::core::identifiers::ShardId;
use crate::core::shard::Partition;
use crate::core::shard::Shard;

// ============================================================================
// SECTION: Configuration Store
// ============================================================================

/// Configuration store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigStoreError {
    /// Caller is not permitted to access the key.
    #[error("config store access denied: {0}")]
    AccessDenied(String),
    /// Store backend reported an error.
    #[error("config store error: {0}")]
    Backend(String),
}

/// Key-value store holding the published shard directory.
pub trait ConfigStore {
    /// Returns the stored value, or `None` when the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] when the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError>;

    /// Stores a value as a single atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] when the write is rejected.
    fn put(&self, key: &str, value: &str, overwrite: bool) -> Result<(), ConfigStoreError>;
}

// ============================================================================
// SECTION: Resource Control Plane
// ============================================================================

/// Resource control plane errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// A shard already exists in the requested partition.
    #[error("shard conflict: {0}")]
    Conflict(String),
    /// Referenced resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),
    /// Backend reported an error.
    #[error("control plane error: {0}")]
    Backend(String),
}

/// Shard creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShardRequest {
    /// Resource group owning the shard.
    pub resource_group: ResourceGroupId,
    /// Partition to place the shard in.
    pub partition: Partition,
    /// Optional security policy attached to the endpoint.
    pub security_group: Option<SecurityGroupId>,
}

/// Cloud surface that lists, creates, and describes shards.
pub trait ResourceControlPlane {
    /// Lists every shard of a resource group, in any lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError`] when the listing fails.
    fn list_shards(&self, resource_group: &ResourceGroupId) -> Result<Vec<Shard>, ControlPlaneError>;

    /// Lists every partition of a network group in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError`] when the listing fails.
    fn list_partitions(
        &self,
        network_group: &NetworkGroupId,
    ) -> Result<Vec<Partition>, ControlPlaneError>;

    /// Requests a new shard and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError::Conflict`] when the partition is already
    /// occupied, or another variant when the request fails.
    fn create_shard(&self, request: &CreateShardRequest) -> Result<ShardId, ControlPlaneError>;

    /// Describes one shard, or `None` when the backend returns no entry.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPlaneError`] when the lookup fails.
    fn describe_shard(&self, shard_id: &ShardId) -> Result<Option<Shard>, ControlPlaneError>;
}

// ============================================================================
// SECTION: Redeploy Notifier
// ============================================================================

/// Redeploy notifier errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Target cluster or service does not exist.
    #[error("redeploy target not found: {0}")]
    NotFound(String),
    /// Backend reported an error.
    #[error("redeploy error: {0}")]
    Backend(String),
}

/// Acknowledgement from a redeploy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeployReceipt {
    /// Deployments active on the service after the request.
    pub active_deployments: usize,
}

/// Asks consumers to restart and reload the directory.
pub trait RedeployNotifier {
    /// Forces a new deployment of the consumer service.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the request is rejected.
    fn force_redeploy(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<RedeployReceipt, NotifyError>;
}

// ============================================================================
// SECTION: Utilization Source
// ============================================================================

/// Utilization measurement errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// Target does not exist.
    #[error("measurement target not found: {0}")]
    NotFound(String),
    /// Target is not a directory.
    #[error("measurement target is not a directory: {0}")]
    NotADirectory(String),
    /// Target cannot be read.
    #[error("measurement target access denied: {0}")]
    AccessDenied(String),
    /// Other I/O failure while measuring.
    #[error("measurement io error: {0}")]
    Io(String),
}

/// Produces the fullness signal for a measurement target.
pub trait UtilizationSource {
    /// Measures utilization (file count) at the target.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError`] when the target is missing or unreadable.
    fn measure(&self, target: &Path) -> Result<u64, MeasureError>;
}

// ============================================================================
// SECTION: Sleeper
// ============================================================================

/// Cooperative wait used between provisioning polls.
pub trait Sleeper {
    /// Blocks the caller for the duration.
    fn sleep(&self, duration: Duration);
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Destination for structured scaling events.
pub trait ScalingEventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &ScalingEvent);
}
