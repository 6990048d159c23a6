// crates/shard-scaler-core/src/lib.rs
// ============================================================================
// Module: Shard Scaler Core Library
// Description: Public API surface for shard placement and the scaling loop.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Shard scaler core spreads files across network file system endpoints
//! ("shards") by hashing their logical paths, and grows the shard set when a
//! file-count threshold is crossed. Placement is pure and allocation-free;
//! the control loop talks to cloud services only through the traits in
//! [`interfaces`], so it runs unchanged against the in-memory fakes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ConfigStore;
pub use interfaces::ConfigStoreError;
pub use interfaces::ControlPlaneError;
pub use interfaces::CreateShardRequest;
pub use interfaces::MeasureError;
pub use interfaces::NotifyError;
pub use interfaces::RedeployNotifier;
pub use interfaces::RedeployReceipt;
pub use interfaces::ResourceControlPlane;
pub use interfaces::ScalingEventSink;
pub use interfaces::Sleeper;
pub use interfaces::UtilizationSource;
pub use runtime::DirectoryFileCounter;
pub use runtime::EventLog;
pub use runtime::FakeControlPlane;
pub use runtime::FileEventSink;
pub use runtime::InMemoryConfigStore;
pub use runtime::MemoryEventSink;
pub use runtime::NoopEventSink;
pub use runtime::PollPolicy;
pub use runtime::ProvisionError;
pub use runtime::ProvisionOutcome;
pub use runtime::ProvisionScope;
pub use runtime::ReadStatus;
pub use runtime::RecordingNotifier;
pub use runtime::RegistryRead;
pub use runtime::ScalingController;
pub use runtime::ScalingTargets;
pub use runtime::ShardProvisioner;
pub use runtime::ShardRegistry;
pub use runtime::StaticUtilization;
pub use runtime::StderrEventSink;
pub use runtime::ThreadSleeper;
pub use runtime::UtilizationMonitor;
pub use runtime::UtilizationReading;
pub use runtime::VirtualSleeper;
pub use runtime::exceeds;
