// crates/shard-scaler-core/src/runtime/provisioner.rs
// ============================================================================
// Module: Shard Provisioner
// Description: Free-partition search and bounded shard creation polling.
// Purpose: Allocate at most one new shard per call without locks or retries.
// Dependencies: crate::core, crate::interfaces, crate::runtime::sinks
// ============================================================================

//! ## Overview
//! Creation is conflict tolerant: when a concurrent run already claimed the
//! partition, the control plane answers with a conflict and the provisioner
//! reports [`ProvisionOutcome::Conflict`] instead of an error. After a
//! successful request the shard is polled at a fixed interval until it is
//! available, failed, or the total wait reaches the timeout. A timed-out
//! shard is left for a later run to pick up from the live listing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::events::ScalingStep;
use crate::core::identifiers::NetworkGroupId;
use crate::core::identifiers::ResourceGroupId;
use crate::core::identifiers::SecurityGroupId;
use crate::core::identifiers::ShardId;
use crate::core::shard::Partition;
use crate::core::shard::Shard;
use crate::core::shard::ShardLifecycle;
use crate::interfaces::ControlPlaneError;
use crate::interfaces::CreateShardRequest;
use crate::interfaces::ResourceControlPlane;
use crate::interfaces::Sleeper;
use crate::runtime::sinks::EventLog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default delay between lifecycle polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default upper bound on total polling time.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);
/// Largest accepted polling timeout.
pub const MAX_POLL_TIMEOUT: Duration = Duration::from_secs(900);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provisioner errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// Poll policy outside the accepted range.
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(String),
    /// Live shards could not be listed.
    #[error("shard listing failed: {0}")]
    ShardListing(ControlPlaneError),
    /// Partitions could not be listed.
    #[error("partition listing failed: {0}")]
    PartitionListing(ControlPlaneError),
}

// ============================================================================
// SECTION: Poll Policy
// ============================================================================

/// Fixed-interval polling bounds for shard creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls.
    interval: Duration,
    /// Upper bound on total wait.
    timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollPolicy {
    /// Creates a validated poll policy.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidPolicy`] unless
    /// `1s <= interval <= timeout <= 900s`.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, ProvisionError> {
        if interval < Duration::from_secs(1) {
            return Err(ProvisionError::InvalidPolicy(
                "poll interval must be at least 1 second".to_string(),
            ));
        }
        if timeout < interval {
            return Err(ProvisionError::InvalidPolicy(
                "poll timeout must not be shorter than the interval".to_string(),
            ));
        }
        if timeout > MAX_POLL_TIMEOUT {
            return Err(ProvisionError::InvalidPolicy(format!(
                "poll timeout must not exceed {} seconds",
                MAX_POLL_TIMEOUT.as_secs()
            )));
        }
        Ok(Self {
            interval,
            timeout,
        })
    }

    /// Returns the delay between polls.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the total wait bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of one creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Shard reached the available state.
    Created(Shard),
    /// Partition was already taken; nothing was created by this call.
    Conflict(String),
    /// Creation was rejected or the shard entered the failed state.
    Failed(String),
    /// Shard did not become available within the poll timeout.
    TimedOut {
        /// Shard left in the provisioning state.
        shard_id: ShardId,
        /// Total time waited.
        waited: Duration,
    },
}

impl ProvisionOutcome {
    /// Returns the created shard, if any.
    #[must_use]
    pub fn into_shard(self) -> Option<Shard> {
        match self {
            Self::Created(shard) => Some(shard),
            Self::Conflict(_) | Self::Failed(_) | Self::TimedOut { .. } => None,
        }
    }
}

// ============================================================================
// SECTION: Sleepers
// ============================================================================

/// Sleeper that blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Identifiers a provisioner allocates shards within.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionScope {
    /// Resource group owning every shard.
    pub resource_group: ResourceGroupId,
    /// Network group supplying partitions.
    pub network_group: NetworkGroupId,
    /// Optional security policy for new shards.
    pub security_group: Option<SecurityGroupId>,
}

/// Allocates shards in unused partitions.
pub struct ShardProvisioner<C, T> {
    /// Cloud control plane.
    control_plane: C,
    /// Wait primitive between polls.
    sleeper: T,
    /// Allocation scope.
    scope: ProvisionScope,
    /// Polling bounds.
    policy: PollPolicy,
}

impl<C: ResourceControlPlane, T: Sleeper> ShardProvisioner<C, T> {
    /// Creates a provisioner.
    #[must_use]
    pub fn new(control_plane: C, sleeper: T, scope: ProvisionScope, policy: PollPolicy) -> Self {
        Self {
            control_plane,
            sleeper,
            scope,
            policy,
        }
    }

    /// Returns the allocation scope.
    #[must_use]
    pub const fn scope(&self) -> &ProvisionScope {
        &self.scope
    }

    /// Lists every live shard of the resource group.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::ShardListing`] when the control plane fails.
    pub fn list_shards(&self, log: &EventLog) -> Result<Vec<Shard>, ProvisionError> {
        let shards = self
            .control_plane
            .list_shards(&self.scope.resource_group)
            .map_err(ProvisionError::ShardListing)?;
        log.info(
            ScalingStep::ListShards,
            format!("found {} shards in {}", shards.len(), self.scope.resource_group),
        );
        for shard in &shards {
            log.info(
                ScalingStep::ListShards,
                format!(
                    "shard {} in {} (subnet {}) is {}",
                    shard.id,
                    shard.partition.zone,
                    shard.partition.subnet_id,
                    shard.lifecycle.as_str()
                ),
            );
        }
        Ok(shards)
    }

    /// Returns the first listed partition not used by any existing shard.
    ///
    /// Shards in every lifecycle state occupy their partition.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PartitionListing`] when the control plane
    /// fails.
    pub fn find_unused_partition(
        &self,
        existing: &[Shard],
        log: &EventLog,
    ) -> Result<Option<Partition>, ProvisionError> {
        let partitions = self
            .control_plane
            .list_partitions(&self.scope.network_group)
            .map_err(ProvisionError::PartitionListing)?;
        let found = partitions
            .into_iter()
            .find(|partition| !existing.iter().any(|shard| shard.partition.overlaps(partition)));
        match &found {
            Some(partition) => log.info(
                ScalingStep::FindPartition,
                format!("free partition {} in {}", partition.subnet_id, partition.zone),
            ),
            None => log.warn(
                ScalingStep::FindPartition,
                format!("no free partition in {}", self.scope.network_group),
            ),
        }
        Ok(found)
    }

    /// Creates a shard in the partition and polls until it settles.
    pub fn create_shard(&self, partition: &Partition, log: &EventLog) -> ProvisionOutcome {
        let request = CreateShardRequest {
            resource_group: self.scope.resource_group.clone(),
            partition: partition.clone(),
            security_group: self.scope.security_group.clone(),
        };
        log.info(
            ScalingStep::Provision,
            format!("creating shard in subnet {}", partition.subnet_id),
        );
        let shard_id = match self.control_plane.create_shard(&request) {
            Ok(shard_id) => shard_id,
            Err(ControlPlaneError::Conflict(detail)) => {
                log.warn(
                    ScalingStep::Provision,
                    format!("shard already exists in subnet {}: {detail}", partition.subnet_id),
                );
                return ProvisionOutcome::Conflict(detail);
            }
            Err(err) => {
                log.error(ScalingStep::Provision, format!("shard creation rejected: {err}"));
                return ProvisionOutcome::Failed(err.to_string());
            }
        };
        log.info(ScalingStep::Provision, format!("shard creation initiated: {shard_id}"));
        self.await_available(shard_id, log)
    }

    /// Polls a newly requested shard until available, failed, or timed out.
    fn await_available(&self, shard_id: ShardId, log: &EventLog) -> ProvisionOutcome {
        let mut waited = Duration::ZERO;
        while waited < self.policy.timeout {
            match self.control_plane.describe_shard(&shard_id) {
                Ok(Some(shard)) => {
                    log.info(
                        ScalingStep::Provision,
                        format!("shard {shard_id} state: {}", shard.lifecycle.as_str()),
                    );
                    match shard.lifecycle {
                        ShardLifecycle::Available => {
                            log.info(ScalingStep::Provision, format!("shard {shard_id} is available"));
                            return ProvisionOutcome::Created(shard);
                        }
                        ShardLifecycle::Failed => {
                            log.error(
                                ScalingStep::Provision,
                                format!("shard {shard_id} entered the failed state"),
                            );
                            return ProvisionOutcome::Failed(format!(
                                "shard {shard_id} entered the failed state"
                            ));
                        }
                        ShardLifecycle::Provisioning => {}
                    }
                }
                Ok(None) => log.warn(
                    ScalingStep::Provision,
                    format!("shard {shard_id} not yet visible"),
                ),
                Err(err) => log.warn(
                    ScalingStep::Provision,
                    format!("shard {shard_id} status check failed: {err}"),
                ),
            }
            self.sleeper.sleep(self.policy.interval);
            waited += self.policy.interval;
        }
        log.error(
            ScalingStep::Provision,
            format!("shard {shard_id} creation timed out after {} seconds", waited.as_secs()),
        );
        ProvisionOutcome::TimedOut {
            shard_id,
            waited,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
