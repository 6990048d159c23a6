// crates/shard-scaler-aws/src/efs/tests.rs
// ============================================================================
// Module: EFS Control Plane Unit Tests
// Description: Unit tests for lifecycle and error mapping helpers.
// Purpose: Validate EFS translation without live AWS services.
// ============================================================================

use std::net::IpAddr;
use std::net::Ipv4Addr;

use shard_scaler_core::ControlPlaneError;
use shard_scaler_core::ShardLifecycle;

use super::MountTargetView;
use super::control_plane_error;
use super::lifecycle_from_state;

fn view(state: &str, ip: Option<&str>) -> MountTargetView {
    MountTargetView {
        id: "fsmt-0a1".to_string(),
        ip_address: ip.map(str::to_string),
        zone: Some("us-east-1a".to_string()),
        subnet_id: "subnet-1".to_string(),
        state: state.to_string(),
    }
}

#[test]
fn lifecycle_states_collapse_to_three_buckets() {
    assert_eq!(lifecycle_from_state("creating"), ShardLifecycle::Provisioning);
    assert_eq!(lifecycle_from_state("updating"), ShardLifecycle::Provisioning);
    assert_eq!(lifecycle_from_state("available"), ShardLifecycle::Available);
    assert_eq!(lifecycle_from_state("deleting"), ShardLifecycle::Failed);
    assert_eq!(lifecycle_from_state("deleted"), ShardLifecycle::Failed);
    assert_eq!(lifecycle_from_state("error"), ShardLifecycle::Failed);
    assert_eq!(lifecycle_from_state("something-new"), ShardLifecycle::Failed);
}

#[test]
fn available_target_maps_to_available_shard() {
    let shard = view("available", Some("10.0.1.25")).into_shard();
    assert_eq!(shard.id.as_str(), "fsmt-0a1");
    assert_eq!(shard.address, IpAddr::V4(Ipv4Addr::new(10, 0, 1, 25)));
    assert_eq!(shard.partition.zone.as_str(), "us-east-1a");
    assert_eq!(shard.partition.subnet_id.as_str(), "subnet-1");
    assert!(shard.is_available());
}

#[test]
fn available_target_without_address_is_failed() {
    let shard = view("available", None).into_shard();
    assert_eq!(shard.lifecycle, ShardLifecycle::Failed);
    let garbled = view("available", Some("not-an-ip")).into_shard();
    assert_eq!(garbled.lifecycle, ShardLifecycle::Failed);
}

#[test]
fn creating_target_without_address_still_occupies() {
    let shard = view("creating", None).into_shard();
    assert_eq!(shard.lifecycle, ShardLifecycle::Provisioning);
    assert_eq!(shard.partition.subnet_id.as_str(), "subnet-1");
}

#[test]
fn conflict_and_not_found_codes_are_classified() {
    assert_eq!(
        control_plane_error(Some("MountTargetConflict"), "taken".to_string()),
        ControlPlaneError::Conflict("taken".to_string())
    );
    assert_eq!(
        control_plane_error(Some("MountTargetNotFound"), "gone".to_string()),
        ControlPlaneError::NotFound("gone".to_string())
    );
    assert_eq!(
        control_plane_error(Some("InvalidVpcID.NotFound"), "vpc".to_string()),
        ControlPlaneError::NotFound("vpc".to_string())
    );
    assert_eq!(
        control_plane_error(Some("ThrottlingException"), "slow".to_string()),
        ControlPlaneError::Backend("slow".to_string())
    );
    assert_eq!(
        control_plane_error(None, "io".to_string()),
        ControlPlaneError::Backend("io".to_string())
    );
}
