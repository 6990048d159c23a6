// crates/shard-scaler-aws/src/efs.rs
// ============================================================================
// Module: EFS Control Plane
// Description: Mount targets as shards and VPC subnets as partitions.
// Purpose: Implement ResourceControlPlane on EFS and EC2.
// Dependencies: aws-sdk-efs, aws-sdk-ec2, shard-scaler-core
// ============================================================================

//! ## Overview
//! Each EFS mount target is one shard: its IP address is the endpoint and its
//! subnet plus availability zone is the partition. Subnets of the VPC are the
//! candidate partitions. EFS lifecycle states collapse onto the three shard
//! lifecycles, and `MountTargetConflict` surfaces as
//! [`ControlPlaneError::Conflict`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::Ipv4Addr;

use aws_sdk_ec2::types::Filter;
use aws_sdk_efs::error::ProvideErrorMetadata;
use aws_sdk_efs::types::MountTargetDescription;
use shard_scaler_core::ControlPlaneError;
use shard_scaler_core::CreateShardRequest;
use shard_scaler_core::NetworkGroupId;
use shard_scaler_core::Partition;
use shard_scaler_core::ResourceControlPlane;
use shard_scaler_core::ResourceGroupId;
use shard_scaler_core::Shard;
use shard_scaler_core::ShardId;
use shard_scaler_core::ShardLifecycle;

use crate::context::BlockingRuntime;
use crate::context::RUNTIME_CLOSED;
use crate::context::sdk_detail;

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// EFS error code for an occupied availability zone or subnet.
const MOUNT_TARGET_CONFLICT: &str = "MountTargetConflict";
/// EFS error code for an unknown mount target.
const MOUNT_TARGET_NOT_FOUND: &str = "MountTargetNotFound";
/// EFS error code for an unknown file system.
const FILE_SYSTEM_NOT_FOUND: &str = "FileSystemNotFound";
/// EC2 error code for an unknown VPC.
const VPC_NOT_FOUND: &str = "InvalidVpcID.NotFound";

/// Maps an SDK error onto the control plane taxonomy.
fn control_plane_error(code: Option<&str>, detail: String) -> ControlPlaneError {
    match code {
        Some(MOUNT_TARGET_CONFLICT) => ControlPlaneError::Conflict(detail),
        Some(MOUNT_TARGET_NOT_FOUND | FILE_SYSTEM_NOT_FOUND | VPC_NOT_FOUND) => {
            ControlPlaneError::NotFound(detail)
        }
        _ => ControlPlaneError::Backend(detail),
    }
}

// ============================================================================
// SECTION: Lifecycle Mapping
// ============================================================================

/// Collapses an EFS lifecycle state name onto a shard lifecycle.
fn lifecycle_from_state(state: &str) -> ShardLifecycle {
    match state {
        "creating" | "updating" => ShardLifecycle::Provisioning,
        "available" => ShardLifecycle::Available,
        _ => ShardLifecycle::Failed,
    }
}

/// Plain view of a mount target description.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MountTargetView {
    /// Mount target identifier.
    id: String,
    /// Assigned IP address, when the service reported one.
    ip_address: Option<String>,
    /// Availability zone name.
    zone: Option<String>,
    /// Subnet identifier.
    subnet_id: String,
    /// EFS lifecycle state name.
    state: String,
}

impl MountTargetView {
    /// Copies the fields the scaler needs out of an SDK description.
    fn from_sdk(description: &MountTargetDescription) -> Self {
        Self {
            id: description.mount_target_id().to_string(),
            ip_address: description.ip_address().map(str::to_string),
            zone: description.availability_zone_name().map(str::to_string),
            subnet_id: description.subnet_id().to_string(),
            state: description.life_cycle_state().as_str().to_string(),
        }
    }

    /// Converts the view into a shard.
    ///
    /// A target without a usable address can never be mounted, so an
    /// otherwise available target is reported as failed.
    fn into_shard(self) -> Shard {
        let parsed = self.ip_address.as_deref().and_then(|ip| ip.parse::<IpAddr>().ok());
        let mut lifecycle = lifecycle_from_state(&self.state);
        if parsed.is_none() && lifecycle == ShardLifecycle::Available {
            lifecycle = ShardLifecycle::Failed;
        }
        Shard {
            id: ShardId::new(self.id),
            address: parsed.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            partition: Partition::new(self.zone.unwrap_or_default(), self.subnet_id),
            lifecycle,
        }
    }
}

// ============================================================================
// SECTION: Control Plane
// ============================================================================

/// EFS mount targets and EC2 subnets behind [`ResourceControlPlane`].
pub struct EfsControlPlane {
    /// EFS client.
    efs: aws_sdk_efs::Client,
    /// EC2 client used for subnet discovery.
    ec2: aws_sdk_ec2::Client,
    /// Runtime driving SDK futures.
    runtime: BlockingRuntime,
}

impl EfsControlPlane {
    /// Creates the adapter from prepared clients.
    pub(crate) const fn new(
        efs: aws_sdk_efs::Client,
        ec2: aws_sdk_ec2::Client,
        runtime: BlockingRuntime,
    ) -> Self {
        Self {
            efs,
            ec2,
            runtime,
        }
    }

    /// Describes mount targets, following pagination markers.
    fn describe_mount_targets(
        &self,
        file_system_id: Option<&str>,
        mount_target_id: Option<&str>,
    ) -> Result<Vec<MountTargetView>, ControlPlaneError> {
        let client = self.efs.clone();
        self.runtime
            .block_on(async {
                let mut views = Vec::new();
                let mut marker: Option<String> = None;
                loop {
                    let output = client
                        .describe_mount_targets()
                        .set_file_system_id(file_system_id.map(str::to_string))
                        .set_mount_target_id(mount_target_id.map(str::to_string))
                        .set_marker(marker.take())
                        .send()
                        .await
                        .map_err(|err| control_plane_error(err.code(), sdk_detail(&err)))?;
                    views.extend(output.mount_targets().iter().map(MountTargetView::from_sdk));
                    match output.next_marker() {
                        Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                        _ => break,
                    }
                }
                Ok(views)
            })
            .unwrap_or_else(|| Err(ControlPlaneError::Backend(RUNTIME_CLOSED.to_string())))
    }
}

impl ResourceControlPlane for EfsControlPlane {
    fn list_shards(&self, resource_group: &ResourceGroupId) -> Result<Vec<Shard>, ControlPlaneError> {
        let views = self.describe_mount_targets(Some(resource_group.as_str()), None)?;
        Ok(views.into_iter().map(MountTargetView::into_shard).collect())
    }

    fn list_partitions(
        &self,
        network_group: &NetworkGroupId,
    ) -> Result<Vec<Partition>, ControlPlaneError> {
        let client = self.ec2.clone();
        let filter = Filter::builder().name("vpc-id").values(network_group.as_str()).build();
        self.runtime
            .block_on(async {
                let mut partitions = Vec::new();
                let mut token: Option<String> = None;
                loop {
                    let output = client
                        .describe_subnets()
                        .filters(filter.clone())
                        .set_next_token(token.take())
                        .send()
                        .await
                        .map_err(|err| control_plane_error(err.code(), sdk_detail(&err)))?;
                    for subnet in output.subnets() {
                        let (Some(subnet_id), Some(zone)) =
                            (subnet.subnet_id(), subnet.availability_zone())
                        else {
                            continue;
                        };
                        partitions.push(Partition::new(zone, subnet_id));
                    }
                    match output.next_token() {
                        Some(next) if !next.is_empty() => token = Some(next.to_string()),
                        _ => break,
                    }
                }
                Ok(partitions)
            })
            .unwrap_or_else(|| Err(ControlPlaneError::Backend(RUNTIME_CLOSED.to_string())))
    }

    fn create_shard(&self, request: &CreateShardRequest) -> Result<ShardId, ControlPlaneError> {
        let client = self.efs.clone();
        let security_groups =
            request.security_group.as_ref().map(|group| vec![group.as_str().to_string()]);
        self.runtime
            .block_on(async {
                let output = client
                    .create_mount_target()
                    .file_system_id(request.resource_group.as_str())
                    .subnet_id(request.partition.subnet_id.as_str())
                    .set_security_groups(security_groups)
                    .send()
                    .await
                    .map_err(|err| control_plane_error(err.code(), sdk_detail(&err)))?;
                Ok(ShardId::new(output.mount_target_id()))
            })
            .unwrap_or_else(|| Err(ControlPlaneError::Backend(RUNTIME_CLOSED.to_string())))
    }

    fn describe_shard(&self, shard_id: &ShardId) -> Result<Option<Shard>, ControlPlaneError> {
        match self.describe_mount_targets(None, Some(shard_id.as_str())) {
            Ok(views) => Ok(views.into_iter().next().map(MountTargetView::into_shard)),
            Err(ControlPlaneError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests;
