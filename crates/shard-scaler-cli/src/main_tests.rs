// crates/shard-scaler-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and output rendering.
// Purpose: Ensure outcomes, routes, and mount summaries render as documented.
// Dependencies: shard-scaler-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises the pure helpers behind each command without AWS access.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use shard_scaler_config::EventSinkKind;
use shard_scaler_config::EventsConfig;
use shard_scaler_core::EventLog;
use shard_scaler_core::MemoryEventSink;
use shard_scaler_core::OutcomeStatus;
use shard_scaler_core::Partition;
use shard_scaler_core::RunId;
use shard_scaler_core::ScalingOutcome;
use shard_scaler_core::ScalingStep;
use shard_scaler_core::Shard;
use shard_scaler_core::ShardDirectory;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardLifecycle;
use shard_scaler_core::ShardRoots;
use shard_scaler_core::decode_directory;
use shard_scaler_core::placement;
use shard_scaler_files::MountFailure;
use shard_scaler_files::MountReport;
use shard_scaler_files::MountedShard;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::DirectoryCommand;
use super::build_event_log;
use super::configuration_outcome;
use super::mount_summary;
use super::outcome_exit_code;
use super::render_directory;
use super::render_outcome;
use super::render_route;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn shard(id: &str, n: u8) -> Shard {
    Shard {
        id: ShardId::new(id),
        address: IpAddr::V4(Ipv4Addr::new(10, 0, n, 10)),
        partition: Partition::new(format!("az-{n}"), format!("subnet-{n}")),
        lifecycle: ShardLifecycle::Available,
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_every_command() {
    assert!(matches!(parse(&["shard-scaler", "run"]).command, Commands::Run(_)));
    match parse(&["shard-scaler", "run", "--config", "/etc/scaler.toml"]).command {
        Commands::Run(args) => assert_eq!(args.config, Some(PathBuf::from("/etc/scaler.toml"))),
        other => panic!("unexpected command {other:?}"),
    }
    assert!(matches!(
        parse(&["shard-scaler", "config", "validate"]).command,
        Commands::Config {
            command: ConfigCommand::Validate(_)
        }
    ));
    assert!(matches!(
        parse(&["shard-scaler", "directory", "show"]).command,
        Commands::Directory {
            command: DirectoryCommand::Show(_)
        }
    ));
    assert!(matches!(parse(&["shard-scaler", "mount"]).command, Commands::Mount(_)));
}

#[test]
fn route_defaults_to_standard_mount_roots() {
    match parse(&["shard-scaler", "route", "a/b.txt", "--shards", "3"]).command {
        Commands::Route(command) => {
            assert_eq!(command.path, "a/b.txt");
            assert_eq!(command.shards, 3);
            assert_eq!(command.mount_root, "/mnt");
            assert_eq!(command.prefix, "efs-");
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert!(Cli::try_parse_from(["shard-scaler", "route", "a/b.txt"]).is_err());
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

#[test]
fn outcome_json_carries_status_code() {
    let outcome = ScalingOutcome::pending(RunId::new("run-1"), 100)
        .finish(OutcomeStatus::PublishFailed, Some("store down".to_string()));
    let value: Value = serde_json::from_str(&render_outcome(&outcome).unwrap()).unwrap();
    assert_eq!(value["run_id"], "run-1");
    assert_eq!(value["status"], "publish_failed");
    assert_eq!(value["status_code"], 500);
    assert_eq!(value["reason"], "store down");
    assert_eq!(value["threshold"], 100);
    assert_eq!(value["published"], false);
}

#[test]
fn exit_code_follows_failure_statuses() {
    let base = ScalingOutcome::pending(RunId::new("run-2"), 10);
    assert_eq!(outcome_exit_code(&base.clone()), ExitCode::SUCCESS);
    let notify_failed = base.clone().finish(OutcomeStatus::ScaledNotifyFailed, None);
    assert_eq!(outcome_exit_code(&notify_failed), ExitCode::SUCCESS);
    let listing = base.finish(OutcomeStatus::ListingFailed, None);
    assert_eq!(outcome_exit_code(&listing), ExitCode::FAILURE);
}

#[test]
fn configuration_errors_report_400_and_log() {
    let events = MemoryEventSink::new();
    let log = EventLog::new(Arc::new(events.clone()));
    let outcome = configuration_outcome(&log, 100_000, "TARGET_DIRECTORY is required");
    assert_eq!(outcome.status, OutcomeStatus::ConfigurationError);
    assert_eq!(outcome.status_code(), 400);
    assert_eq!(outcome.reason.as_deref(), Some("TARGET_DIRECTORY is required"));
    assert!(outcome.run_id.as_str().starts_with("run-"));
    let logged = events.events_for(ScalingStep::ReadConfig);
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].run_id.as_ref(), Some(&outcome.run_id));
    assert_eq!(outcome_exit_code(&outcome), ExitCode::FAILURE);
}

// ============================================================================
// SECTION: Directory and Route Rendering
// ============================================================================

#[test]
fn directory_renders_in_wire_format() {
    let directory =
        ShardDirectory::try_from_shards(vec![shard("fsmt-a", 1), shard("fsmt-b", 2)]).unwrap();
    let rendered = render_directory(&directory).unwrap();
    let value: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["mount_targets"][0]["mount_target_id"], "fsmt-a");
    assert_eq!(value["mount_targets"][1]["ip_address"], "10.0.2.10");
    assert_eq!(decode_directory(&rendered).unwrap(), directory);

    let empty: Value =
        serde_json::from_str(&render_directory(&ShardDirectory::empty()).unwrap()).unwrap();
    assert_eq!(empty["mount_targets"].as_array().map(Vec::len), Some(0));
}

#[test]
fn route_renders_the_placement_decision() {
    let roots = ShardRoots::new("/srv/", "vol-");
    let decision = roots.place("/logs/app.log", 4).unwrap();
    let value: Value = serde_json::from_str(&render_route(&decision, 4).unwrap()).unwrap();
    let index = placement("/logs/app.log", 4).unwrap();
    assert_eq!(value["shard_index"], index);
    assert_eq!(value["shard_count"], 4);
    assert_eq!(value["physical_path"], format!("/srv/vol-{index}/logs/app.log"));
}

// ============================================================================
// SECTION: Mount Summary and Event Sinks
// ============================================================================

#[test]
fn mount_summary_lists_mounted_and_failed_shards() {
    let report = MountReport {
        directory: ShardDirectory::try_from_shards(vec![shard("fsmt-a", 1), shard("fsmt-b", 2)])
            .unwrap(),
        mounted: vec![MountedShard {
            index: 0,
            shard_id: ShardId::new("fsmt-a"),
            mount_point: PathBuf::from("/mnt/efs-0"),
        }],
        failed: vec![MountFailure {
            index: 1,
            shard_id: ShardId::new("fsmt-b"),
            reason: "mount command timed out after 30s".to_string(),
        }],
    };
    let value = mount_summary(&report);
    assert_eq!(value["directory_size"], 2);
    assert_eq!(value["mounted"][0]["mount_point"], "/mnt/efs-0");
    assert_eq!(value["failed"][0]["shard_id"], "fsmt-b");
}

#[test]
fn file_event_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let events = EventsConfig {
        sink: EventSinkKind::File,
        path: Some(path.display().to_string()),
    };
    let log = build_event_log(&events).unwrap();
    log.info(ScalingStep::Measure, "file count 5 vs threshold 10");
    log.warn(ScalingStep::Registry, "directory absent");
    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> =
        written.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "shard_scaler");
    assert_eq!(lines[0]["step"], "measure");
    assert_eq!(lines[1]["level"], "warn");

    let missing_path = EventsConfig {
        sink: EventSinkKind::File,
        path: None,
    };
    assert!(build_event_log(&missing_path).is_err());
}
