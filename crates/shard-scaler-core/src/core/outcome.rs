// crates/shard-scaler-core/src/core/outcome.rs
// ============================================================================
// Module: Scaling Outcome
// Description: Terminal result of one control-loop run.
// Purpose: Report what a run decided and did as a serializable value.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every run ends in exactly one [`OutcomeStatus`]. Statuses separate three
//! families: nothing was needed, something was needed but could not be done,
//! and the work completed. [`OutcomeStatus::status_code`] keeps the
//! HTTP-style codes scheduled invocations report (200, 400, 500).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::RunId;
use crate::core::identifiers::ShardId;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Terminal status of a control-loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Utilization at or below threshold.
    NoAction,
    /// Threshold exceeded but every partition is occupied.
    NoFreePartition,
    /// Creation conflicted with a concurrent run; nothing to publish.
    NoNewShard,
    /// Shard created, directory published, consumers notified.
    Scaled,
    /// Shard created and published; the redeploy request failed.
    ScaledNotifyFailed,
    /// Required configuration missing or invalid.
    ConfigurationError,
    /// Measurement target missing or unreadable.
    MeasurementFailed,
    /// Live shards or partitions could not be listed.
    ListingFailed,
    /// Creation failed or timed out.
    ProvisioningFailed,
    /// Directory write failed; the new shard is live but unpublished.
    PublishFailed,
}

impl OutcomeStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::NoFreePartition => "no_free_partition",
            Self::NoNewShard => "no_new_shard",
            Self::Scaled => "scaled",
            Self::ScaledNotifyFailed => "scaled_notify_failed",
            Self::ConfigurationError => "configuration_error",
            Self::MeasurementFailed => "measurement_failed",
            Self::ListingFailed => "listing_failed",
            Self::ProvisioningFailed => "provisioning_failed",
            Self::PublishFailed => "publish_failed",
        }
    }

    /// Returns the HTTP-style status code reported for the run.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NoAction
            | Self::NoFreePartition
            | Self::NoNewShard
            | Self::Scaled
            | Self::ScaledNotifyFailed => 200,
            Self::ConfigurationError => 400,
            Self::MeasurementFailed
            | Self::ListingFailed
            | Self::ProvisioningFailed
            | Self::PublishFailed => 500,
        }
    }

    /// Returns true when the run needed work it could not complete.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.status_code() != 200
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result record of one control-loop run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalingOutcome {
    /// Run identifier.
    pub run_id: RunId,
    /// Terminal status.
    pub status: OutcomeStatus,
    /// Explanation for non-success and no-action statuses.
    pub reason: Option<String>,
    /// Measured utilization (file count).
    pub file_count: u64,
    /// Threshold in effect.
    pub threshold: u64,
    /// Whether utilization exceeded the threshold.
    pub threshold_exceeded: bool,
    /// Identifier of the shard created by this run.
    pub new_shard_id: Option<ShardId>,
    /// Entry count of the directory this run published.
    pub directory_size: Option<usize>,
    /// Whether a directory write succeeded.
    pub published: bool,
    /// Whether the redeploy request succeeded.
    pub deployment_triggered: bool,
}

impl ScalingOutcome {
    /// Creates an outcome with nothing measured or done yet.
    #[must_use]
    pub const fn pending(run_id: RunId, threshold: u64) -> Self {
        Self {
            run_id,
            status: OutcomeStatus::NoAction,
            reason: None,
            file_count: 0,
            threshold,
            threshold_exceeded: false,
            new_shard_id: None,
            directory_size: None,
            published: false,
            deployment_triggered: false,
        }
    }

    /// Returns the HTTP-style status code for the outcome.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    /// Returns a copy with the terminal status and reason set.
    #[must_use]
    pub fn finish(mut self, status: OutcomeStatus, reason: Option<String>) -> Self {
        self.status = status;
        self.reason = reason;
        self
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
