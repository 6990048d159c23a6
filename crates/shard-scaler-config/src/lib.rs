// crates/shard-scaler-config/src/lib.rs
// ============================================================================
// Module: Shard Scaler Config Library
// Description: Canonical config model and validation for the shard scaler.
// Purpose: Single source of truth for shard-scaler.toml and its env overlay.
// Dependencies: shard-scaler-core, serde, toml
// ============================================================================

//! ## Overview
//! `shard-scaler-config` defines the configuration model for the scaling
//! loop and consumer mounts. Values come from `shard-scaler.toml` and the
//! deployment environment, and are validated fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
