// crates/shard-scaler-core/src/runtime/registry.rs
// ============================================================================
// Module: Shard Registry Client
// Description: Reads and publishes the shard directory through a config store.
// Purpose: Own the wire format and degrade store failures to values.
// Dependencies: crate::core, crate::interfaces, crate::runtime::sinks
// ============================================================================

//! ## Overview
//! [`ShardRegistry::read`] never fails: an absent key, a malformed record, or
//! an unreachable store all yield the empty directory and a logged event.
//! [`ShardRegistry::write`] reports success as a boolean and always performs
//! a full overwrite of the key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::directory::decode_directory;
use crate::core::directory::encode_directory;
use crate::core::events::ScalingStep;
use crate::core::shard::ShardDirectory;
use crate::interfaces::ConfigStore;
use crate::runtime::sinks::EventLog;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a directory read resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStatus {
    /// Record found and decoded.
    Found,
    /// Key does not exist.
    Absent,
    /// Record exists but could not be decoded.
    Malformed(String),
    /// Store could not be reached.
    Unreachable(String),
}

/// Directory together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRead {
    /// Directory to use; empty unless the status is [`ReadStatus::Found`].
    pub directory: ShardDirectory,
    /// Read resolution.
    pub status: ReadStatus,
}

/// Client for the published shard directory.
pub struct ShardRegistry<S> {
    /// Backing configuration store.
    store: S,
    /// Key holding the directory record.
    key: String,
    /// Event destination.
    log: EventLog,
}

impl<S: ConfigStore> ShardRegistry<S> {
    /// Creates a registry client for a store key.
    #[must_use]
    pub fn new(store: S, key: impl Into<String>, log: EventLog) -> Self {
        Self {
            store,
            key: key.into(),
            log,
        }
    }

    /// Returns the store key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the directory, degrading every failure to an empty directory.
    #[must_use]
    pub fn read(&self) -> ShardDirectory {
        self.read_status().directory
    }

    /// Reads the directory and reports how the read resolved.
    #[must_use]
    pub fn read_status(&self) -> RegistryRead {
        self.read_status_with(&self.log)
    }

    /// Publishes the directory as a full overwrite; returns false on failure.
    #[must_use]
    pub fn write(&self, directory: &ShardDirectory) -> bool {
        self.write_with(directory, &self.log)
    }

    /// Reads the directory, logging through `log`.
    pub(crate) fn read_status_with(&self, log: &EventLog) -> RegistryRead {
        let status = match self.store.get(&self.key) {
            Ok(Some(raw)) => match decode_directory(&raw) {
                Ok(directory) => {
                    log.info(
                        ScalingStep::Registry,
                        format!("loaded directory {} with {} shards", self.key, directory.len()),
                    );
                    return RegistryRead {
                        directory,
                        status: ReadStatus::Found,
                    };
                }
                Err(err) => {
                    log.warn(
                        ScalingStep::Registry,
                        format!("directory {} is malformed, treating as empty: {err}", self.key),
                    );
                    ReadStatus::Malformed(err.to_string())
                }
            },
            Ok(None) => {
                log.warn(
                    ScalingStep::Registry,
                    format!("directory {} not found, treating as empty", self.key),
                );
                ReadStatus::Absent
            }
            Err(err) => {
                log.error(
                    ScalingStep::Registry,
                    format!("directory {} unreachable, treating as empty: {err}", self.key),
                );
                ReadStatus::Unreachable(err.to_string())
            }
        };
        RegistryRead {
            directory: ShardDirectory::empty(),
            status,
        }
    }

    /// Publishes the directory, logging through `log`.
    pub(crate) fn write_with(&self, directory: &ShardDirectory, log: &EventLog) -> bool {
        let payload = match encode_directory(directory) {
            Ok(payload) => payload,
            Err(err) => {
                log.error(ScalingStep::Registry, format!("directory encode failed: {err}"));
                return false;
            }
        };
        match self.store.put(&self.key, &payload, true) {
            Ok(()) => {
                log.info(
                    ScalingStep::Registry,
                    format!("published directory {} with {} shards", self.key, directory.len()),
                );
                true
            }
            Err(err) => {
                log.error(
                    ScalingStep::Registry,
                    format!("directory {} publish failed: {err}", self.key),
                );
                false
            }
        }
    }
}
