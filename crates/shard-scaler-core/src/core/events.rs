// crates/shard-scaler-core/src/core/events.rs
// ============================================================================
// Module: Scaling Events
// Description: Structured log events emitted by the scaler and its consumers.
// Purpose: Give every step a JSON-line record with a stable shape.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Events are plain serializable records. Sinks decide where they go; the
//! record itself never performs I/O. Timestamps are taken at construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::identifiers::RunId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a scaling event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Normal progress.
    Info,
    /// Degraded but recoverable condition.
    Warn,
    /// Step failed.
    Error,
}

/// Step or component an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingStep {
    /// Configuration resolution.
    ReadConfig,
    /// Utilization measurement.
    Measure,
    /// Live shard listing.
    ListShards,
    /// Free partition search.
    FindPartition,
    /// Shard creation and polling.
    Provision,
    /// Directory publication.
    PublishDirectory,
    /// Consumer redeploy notification.
    Notify,
    /// Terminal outcome.
    Done,
    /// Directory store access outside the controller.
    Registry,
    /// Consumer mount initialization.
    Mount,
    /// Routed file access.
    FileAccess,
}

impl ScalingStep {
    /// Returns a stable label for the step.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadConfig => "read_config",
            Self::Measure => "measure",
            Self::ListShards => "list_shards",
            Self::FindPartition => "find_partition",
            Self::Provision => "provision",
            Self::PublishDirectory => "publish_directory",
            Self::Notify => "notify",
            Self::Done => "done",
            Self::Registry => "registry",
            Self::Mount => "mount",
            Self::FileAccess => "file_access",
        }
    }
}

/// Structured scaling event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalingEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Control-loop run identifier when the event belongs to a run.
    pub run_id: Option<RunId>,
    /// Severity.
    pub level: EventLevel,
    /// Step or component.
    pub step: ScalingStep,
    /// Human-readable detail.
    pub message: String,
}

impl ScalingEvent {
    /// Creates a new event with a consistent timestamp.
    #[must_use]
    pub fn new(
        run_id: Option<RunId>,
        level: EventLevel,
        step: ScalingStep,
        message: impl Into<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "shard_scaler",
            timestamp_ms,
            run_id,
            level,
            step,
            message: message.into(),
        }
    }
}
