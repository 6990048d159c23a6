//! Directory wire format and registry client tests for the shard scaler core.
// crates/shard-scaler-core/tests/directory_registry.rs
// ============================================================================
// Module: Directory And Registry Tests
// Description: Wire format checks and store degradation behavior.
// Purpose: Ensure the published record is stable and reads never fail.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use serde_json::Value;
use shard_scaler_core::ConfigStoreError;
use shard_scaler_core::DirectoryCodecError;
use shard_scaler_core::DirectoryError;
use shard_scaler_core::EventLevel;
use shard_scaler_core::EventLog;
use shard_scaler_core::InMemoryConfigStore;
use shard_scaler_core::MemoryEventSink;
use shard_scaler_core::ReadStatus;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardRegistry;
use shard_scaler_core::decode_directory;
use shard_scaler_core::encode_directory;

use crate::common::DIRECTORY_KEY;
use crate::common::encoded;
use crate::common::shard;

/// Builds a registry with a memory sink.
fn registry(store: InMemoryConfigStore) -> (ShardRegistry<InMemoryConfigStore>, MemoryEventSink) {
    let events = MemoryEventSink::new();
    let log = EventLog::new(Arc::new(events.clone()));
    (ShardRegistry::new(store, DIRECTORY_KEY, log), events)
}

/// Tests encoded records carry exactly the four wire fields per entry.
#[test]
fn encode_omits_lifecycle() {
    let raw = encoded(vec![shard("fsmt-1", 1), shard("fsmt-2", 2)]);
    let value: Value = serde_json::from_str(&raw).unwrap();
    let entries = value["mount_targets"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let keys: Vec<&str> = entries[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 4);
    for key in ["mount_target_id", "ip_address", "availability_zone", "subnet_id"] {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert_eq!(entries[0]["mount_target_id"], "fsmt-1");
    assert_eq!(entries[1]["ip_address"], "10.0.2.10");
}

/// Tests decoding restores order and marks every entry available.
#[test]
fn decode_round_trips_order() {
    let directory =
        ShardDirectory::try_from_shards(vec![shard("fsmt-b", 2), shard("fsmt-a", 1)]).unwrap();
    let decoded = decode_directory(&encode_directory(&directory).unwrap()).unwrap();
    assert_eq!(decoded, directory);
    assert!(decoded.shards().iter().all(|entry| entry.is_available()));
}

/// Tests legacy records with lifecycle_state decode and a missing list is empty.
#[test]
fn decode_tolerates_legacy_and_empty_records() {
    let legacy = r#"{"mount_targets":[{"mount_target_id":"fsmt-1","ip_address":"10.0.1.100",
        "availability_zone":"ap-northeast-1a","subnet_id":"subnet-1","lifecycle_state":"available"}]}"#;
    assert_eq!(decode_directory(legacy).unwrap().len(), 1);
    assert!(decode_directory("{}").unwrap().is_empty());
}

/// Tests invalid addresses and duplicate partitions are rejected.
#[test]
fn decode_rejects_invalid_records() {
    let bad_ip = r#"{"mount_targets":[{"mount_target_id":"fsmt-1","ip_address":"not-an-ip",
        "availability_zone":"az-1","subnet_id":"subnet-1"}]}"#;
    assert!(matches!(decode_directory(bad_ip), Err(DirectoryCodecError::InvalidAddress { .. })));
    let duplicate = r#"{"mount_targets":[
        {"mount_target_id":"fsmt-1","ip_address":"10.0.1.1","availability_zone":"az-1","subnet_id":"subnet-1"},
        {"mount_target_id":"fsmt-2","ip_address":"10.0.1.2","availability_zone":"az-1","subnet_id":"subnet-1"}]}"#;
    assert!(matches!(
        decode_directory(duplicate),
        Err(DirectoryCodecError::Invariant(DirectoryError::DuplicatePartition { .. }))
    ));
    assert!(matches!(decode_directory("[1,2"), Err(DirectoryCodecError::Malformed(_))));
}

/// Tests an absent key reads as an empty directory with a warning.
#[test]
fn registry_absent_key_is_empty() {
    let (registry, events) = registry(InMemoryConfigStore::new());
    let read = registry.read_status();
    assert_eq!(read.status, ReadStatus::Absent);
    assert!(read.directory.is_empty());
    let logged = events.events_for(ScalingStep::Registry);
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].level, EventLevel::Warn);
}

/// Tests a malformed record reads as an empty directory.
#[test]
fn registry_malformed_record_is_empty() {
    let (registry, _) = registry(InMemoryConfigStore::with_value(DIRECTORY_KEY, "not json"));
    let read = registry.read_status();
    assert!(matches!(read.status, ReadStatus::Malformed(_)));
    assert!(registry.read().is_empty());
}

/// Tests an unreachable store reads as an empty directory with an error event.
#[test]
fn registry_unreachable_store_is_empty() {
    let store = InMemoryConfigStore::with_value(DIRECTORY_KEY, &encoded(vec![shard("fsmt-1", 1)]));
    store.fail_reads(Some(ConfigStoreError::AccessDenied("ssm:GetParameter".to_string())));
    let (registry, events) = registry(store);
    assert!(registry.read().is_empty());
    assert!(events.events().iter().any(|event| event.level == EventLevel::Error));
}

/// Tests writes overwrite the key and failures report false.
#[test]
fn registry_write_overwrites_and_reports_failure() {
    let store = InMemoryConfigStore::with_value(DIRECTORY_KEY, &encoded(vec![shard("fsmt-1", 1)]));
    let (registry, _) = registry(store.clone());
    let grown =
        ShardDirectory::try_from_shards(vec![shard("fsmt-1", 1), shard("fsmt-2", 2)]).unwrap();
    assert!(registry.write(&grown));
    assert_eq!(registry.read(), grown);

    store.fail_writes(Some(ConfigStoreError::Backend("throttled".to_string())));
    assert!(!registry.write(&ShardDirectory::empty()));
    assert_eq!(registry.read(), grown);
}
