// crates/shard-scaler-core/src/runtime/controller.rs
// ============================================================================
// Module: Scaling Controller
// Description: One-shot control loop from measurement to consumer redeploy.
// Purpose: Sequence the scaling steps and fold every failure into an outcome.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! A run walks `ReadConfig -> Measure -> ListShards -> FindPartition ->
//! Provision -> PublishDirectory -> Notify`, stopping at the first step that
//! settles the outcome. Each arrow is attempted once. At most one shard is
//! created per run, and consumers are only notified after a successful
//! publish. [`ScalingController::run`] never returns an error: every failure
//! becomes a terminal [`ScalingOutcome`].
//!
//! The published directory is the previously published one with newly live
//! shards appended, so existing entries keep their positions and every
//! already-placed path keeps its shard index. When the published directory
//! cannot be read the run stops before writing, since rebuilding it from the
//! live listing would reorder existing entries. An undecodable record is
//! replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::core::events::ScalingStep;
use crate::core::identifiers::ClusterName;
use crate::core::identifiers::RunId;
use crate::core::identifiers::ServiceName;
use crate::core::outcome::OutcomeStatus;
use crate::core::outcome::ScalingOutcome;
use crate::core::shard::Shard;
use crate::interfaces::ConfigStore;
use crate::interfaces::RedeployNotifier;
use crate::interfaces::ResourceControlPlane;
use crate::interfaces::Sleeper;
use crate::interfaces::UtilizationSource;
use crate::runtime::monitor::UtilizationMonitor;
use crate::runtime::provisioner::ProvisionOutcome;
use crate::runtime::provisioner::ShardProvisioner;
use crate::runtime::registry::ReadStatus;
use crate::runtime::registry::ShardRegistry;
use crate::runtime::sinks::EventLog;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Run inputs not owned by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingTargets {
    /// Directory whose file count drives scaling.
    pub measurement_target: PathBuf,
    /// Cluster hosting the consumer service.
    pub cluster: ClusterName,
    /// Consumer service to redeploy.
    pub service: ServiceName,
}

/// Orchestrates one scaling run.
pub struct ScalingController<U, S, C, N, T> {
    /// Utilization monitor.
    monitor: UtilizationMonitor<U>,
    /// Directory client.
    registry: ShardRegistry<S>,
    /// Shard allocator.
    provisioner: ShardProvisioner<C, T>,
    /// Consumer redeploy notifier.
    notifier: N,
    /// Run inputs.
    targets: ScalingTargets,
    /// Event destination.
    log: EventLog,
}

impl<U, S, C, N, T> ScalingController<U, S, C, N, T>
where
    U: UtilizationSource,
    S: ConfigStore,
    C: ResourceControlPlane,
    N: RedeployNotifier,
    T: Sleeper,
{
    /// Creates a controller from explicitly constructed collaborators.
    #[must_use]
    pub const fn new(
        monitor: UtilizationMonitor<U>,
        registry: ShardRegistry<S>,
        provisioner: ShardProvisioner<C, T>,
        notifier: N,
        targets: ScalingTargets,
        log: EventLog,
    ) -> Self {
        Self {
            monitor,
            registry,
            provisioner,
            notifier,
            targets,
            log,
        }
    }

    /// Returns the directory client.
    #[must_use]
    pub const fn registry(&self) -> &ShardRegistry<S> {
        &self.registry
    }

    /// Executes one run under a freshly generated run id.
    #[must_use]
    pub fn run(&self) -> ScalingOutcome {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        self.run_with_id(RunId::new(format!("run-{timestamp_ms}")))
    }

    /// Executes one run under the supplied run id.
    #[must_use]
    pub fn run_with_id(&self, run_id: RunId) -> ScalingOutcome {
        let log = self.log.for_run(run_id.clone());
        log.info(ScalingStep::ReadConfig, "scaling run started");
        let outcome = self.execute(ScalingOutcome::pending(run_id, self.monitor.threshold()), &log);
        let message = match &outcome.reason {
            Some(reason) => format!("run finished with {}: {reason}", outcome.status.as_str()),
            None => format!("run finished with {}", outcome.status.as_str()),
        };
        if outcome.status.is_failure() {
            log.error(ScalingStep::Done, message);
        } else {
            log.info(ScalingStep::Done, message);
        }
        outcome
    }

    /// Walks the state machine, returning at the first settled step.
    fn execute(&self, mut outcome: ScalingOutcome, log: &EventLog) -> ScalingOutcome {
        if let Some(missing) = self.missing_input() {
            let reason = format!("configuration error: {missing} is required");
            log.error(ScalingStep::ReadConfig, reason.clone());
            return outcome.finish(OutcomeStatus::ConfigurationError, Some(reason));
        }

        let target = &self.targets.measurement_target;
        log.info(ScalingStep::Measure, format!("counting files in {}", target.display()));
        let reading = match self.monitor.sample(target) {
            Ok(reading) => reading,
            Err(err) => {
                let reason = format!("failed to access measurement target: {err}");
                log.error(ScalingStep::Measure, reason.clone());
                return outcome.finish(OutcomeStatus::MeasurementFailed, Some(reason));
            }
        };
        outcome.file_count = reading.count;
        outcome.threshold_exceeded = reading.exceeded;
        if !reading.exceeded {
            log.info(
                ScalingStep::Measure,
                format!("threshold not exceeded: {} <= {}", reading.count, reading.threshold),
            );
            return outcome.finish(OutcomeStatus::NoAction, None);
        }
        log.warn(
            ScalingStep::Measure,
            format!("threshold exceeded: {} > {}", reading.count, reading.threshold),
        );

        let live = match self.provisioner.list_shards(log) {
            Ok(live) => live,
            Err(err) => {
                log.error(ScalingStep::ListShards, err.to_string());
                return outcome.finish(OutcomeStatus::ListingFailed, Some(err.to_string()));
            }
        };

        let partition = match self.provisioner.find_unused_partition(&live, log) {
            Ok(Some(partition)) => partition,
            Ok(None) => {
                return outcome.finish(
                    OutcomeStatus::NoFreePartition,
                    Some("no free partition: every partition already hosts a shard".to_string()),
                );
            }
            Err(err) => {
                log.error(ScalingStep::FindPartition, err.to_string());
                return outcome.finish(OutcomeStatus::ListingFailed, Some(err.to_string()));
            }
        };

        let shard = match self.provisioner.create_shard(&partition, log) {
            ProvisionOutcome::Created(shard) => shard,
            ProvisionOutcome::Conflict(detail) => {
                return outcome.finish(
                    OutcomeStatus::NoNewShard,
                    Some(format!("partition {} already claimed: {detail}", partition.subnet_id)),
                );
            }
            ProvisionOutcome::Failed(detail) => {
                return outcome.finish(
                    OutcomeStatus::ProvisioningFailed,
                    Some(format!("shard creation failed: {detail}")),
                );
            }
            ProvisionOutcome::TimedOut {
                shard_id,
                waited,
            } => {
                return outcome.finish(
                    OutcomeStatus::ProvisioningFailed,
                    Some(format!(
                        "shard {shard_id} creation timed out after {} seconds",
                        waited.as_secs()
                    )),
                );
            }
        };
        outcome.new_shard_id = Some(shard.id.clone());

        if let Err(reason) = self.publish(&live, shard, &mut outcome, log) {
            return outcome.finish(OutcomeStatus::PublishFailed, Some(reason));
        }

        log.info(
            ScalingStep::Notify,
            format!(
                "forcing redeploy of {} in {}",
                self.targets.service, self.targets.cluster
            ),
        );
        match self.notifier.force_redeploy(&self.targets.cluster, &self.targets.service) {
            Ok(receipt) => {
                log.info(
                    ScalingStep::Notify,
                    format!("redeploy triggered; active deployments: {}", receipt.active_deployments),
                );
                outcome.deployment_triggered = true;
                outcome.finish(OutcomeStatus::Scaled, None)
            }
            Err(err) => {
                let reason = format!("redeploy failed: {err}");
                log.error(ScalingStep::Notify, reason.clone());
                outcome.finish(OutcomeStatus::ScaledNotifyFailed, Some(reason))
            }
        }
    }

    /// Merges the new shard into the published directory and writes it.
    fn publish(
        &self,
        live: &[Shard],
        shard: Shard,
        outcome: &mut ScalingOutcome,
        log: &EventLog,
    ) -> Result<(), String> {
        let new_id = shard.id.clone();
        let read = self.registry.read_status_with(log);
        match &read.status {
            ReadStatus::Found | ReadStatus::Absent => {}
            ReadStatus::Malformed(detail) => {
                log.warn(
                    ScalingStep::PublishDirectory,
                    format!("replacing unreadable directory and its shard order: {detail}"),
                );
            }
            ReadStatus::Unreachable(detail) => {
                let reason = format!(
                    "cannot read published directory ({detail}); shard {new_id} is live and will \
                     be picked up next run"
                );
                log.error(ScalingStep::PublishDirectory, reason.clone());
                return Err(reason);
            }
        }
        let current = read.directory;
        let candidates = live
            .iter()
            .filter(|candidate| candidate.is_available() && candidate.id != new_id)
            .cloned()
            .chain(std::iter::once(shard));
        let (merged, skipped) = current.with_appended(candidates);
        for entry in &skipped {
            log.warn(
                ScalingStep::PublishDirectory,
                format!("left shard {} out of the directory: {}", entry.shard_id, entry.reason),
            );
        }
        if !merged.contains(&new_id) {
            let reason = format!("new shard {new_id} conflicts with a published entry");
            log.error(ScalingStep::PublishDirectory, reason.clone());
            return Err(reason);
        }
        if !self.registry.write_with(&merged, log) {
            let reason = format!(
                "directory publish failed; shard {new_id} is live and will be picked up next run"
            );
            log.error(ScalingStep::PublishDirectory, reason.clone());
            return Err(reason);
        }
        log.info(
            ScalingStep::PublishDirectory,
            format!("published directory with {} shards", merged.len()),
        );
        outcome.published = true;
        outcome.directory_size = Some(merged.len());
        Ok(())
    }

    /// Returns the name of the first missing required input.
    fn missing_input(&self) -> Option<&'static str> {
        let scope = self.provisioner.scope();
        if self.targets.measurement_target.as_os_str().is_empty() {
            Some("measurement target")
        } else if scope.resource_group.as_str().is_empty() {
            Some("resource group")
        } else if scope.network_group.as_str().is_empty() {
            Some("network group")
        } else if self.registry.key().is_empty() {
            Some("config store key")
        } else if self.targets.cluster.as_str().is_empty() {
            Some("cluster")
        } else if self.targets.service.as_str().is_empty() {
            Some("service")
        } else {
            None
        }
    }
}
