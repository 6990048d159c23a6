// crates/shard-scaler-core/src/runtime/mod.rs
// ============================================================================
// Module: Shard Scaler Runtime
// Description: Registry client, provisioner, monitor, controller, and sinks.
// Purpose: Run the scaling control loop against injected collaborators.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the stateful halves of the scaler. Every external
//! call goes through an [`crate::interfaces`] trait, so production adapters
//! and the in-memory fakes in [`memory`] drive the same code paths.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod controller;
pub mod memory;
pub mod monitor;
pub mod provisioner;
pub mod registry;
pub mod sinks;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use controller::ScalingController;
pub use controller::ScalingTargets;
pub use memory::FakeControlPlane;
pub use memory::InMemoryConfigStore;
pub use memory::RecordingNotifier;
pub use memory::StaticUtilization;
pub use memory::VirtualSleeper;
pub use monitor::DirectoryFileCounter;
pub use monitor::UtilizationMonitor;
pub use monitor::UtilizationReading;
pub use monitor::exceeds;
pub use provisioner::DEFAULT_POLL_INTERVAL;
pub use provisioner::DEFAULT_POLL_TIMEOUT;
pub use provisioner::MAX_POLL_TIMEOUT;
pub use provisioner::PollPolicy;
pub use provisioner::ProvisionError;
pub use provisioner::ProvisionOutcome;
pub use provisioner::ProvisionScope;
pub use provisioner::ShardProvisioner;
pub use provisioner::ThreadSleeper;
pub use registry::ReadStatus;
pub use registry::RegistryRead;
pub use registry::ShardRegistry;
pub use sinks::EventLog;
pub use sinks::FileEventSink;
pub use sinks::MemoryEventSink;
pub use sinks::NoopEventSink;
pub use sinks::StderrEventSink;
