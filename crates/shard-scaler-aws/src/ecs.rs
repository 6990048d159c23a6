// crates/shard-scaler-aws/src/ecs.rs
// ============================================================================
// Module: ECS Redeploy Notifier
// Description: Forced service deployments as the consumer reload signal.
// Purpose: Implement RedeployNotifier on ECS.
// Dependencies: aws-sdk-ecs, shard-scaler-core
// ============================================================================

//! ## Overview
//! Consumers read the directory once at startup, so growing the shard set
//! ends with `UpdateService(forceNewDeployment=true)` on the consumer
//! service. Tasks restart and mount the new directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_sdk_ecs::error::ProvideErrorMetadata;
use shard_scaler_core::ClusterName;
use shard_scaler_core::NotifyError;
use shard_scaler_core::RedeployNotifier;
use shard_scaler_core::RedeployReceipt;
use shard_scaler_core::ServiceName;

use crate::context::BlockingRuntime;
use crate::context::RUNTIME_CLOSED;
use crate::context::sdk_detail;

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// ECS error code for an unknown cluster.
const CLUSTER_NOT_FOUND: &str = "ClusterNotFoundException";
/// ECS error code for an unknown service.
const SERVICE_NOT_FOUND: &str = "ServiceNotFoundException";
/// ECS error code for a draining or deleted service.
const SERVICE_NOT_ACTIVE: &str = "ServiceNotActiveException";

/// Maps an ECS error code onto the notifier taxonomy.
fn notify_error(code: Option<&str>, detail: String) -> NotifyError {
    match code {
        Some(CLUSTER_NOT_FOUND | SERVICE_NOT_FOUND | SERVICE_NOT_ACTIVE) => {
            NotifyError::NotFound(detail)
        }
        _ => NotifyError::Backend(detail),
    }
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// ECS service redeploys behind [`RedeployNotifier`].
pub struct EcsRedeployNotifier {
    /// ECS client.
    client: aws_sdk_ecs::Client,
    /// Runtime driving SDK futures.
    runtime: BlockingRuntime,
}

impl EcsRedeployNotifier {
    /// Creates the adapter from a prepared client.
    pub(crate) const fn new(client: aws_sdk_ecs::Client, runtime: BlockingRuntime) -> Self {
        Self {
            client,
            runtime,
        }
    }
}

impl RedeployNotifier for EcsRedeployNotifier {
    fn force_redeploy(
        &self,
        cluster: &ClusterName,
        service: &ServiceName,
    ) -> Result<RedeployReceipt, NotifyError> {
        let client = self.client.clone();
        self.runtime
            .block_on(async {
                let output = client
                    .update_service()
                    .cluster(cluster.as_str())
                    .service(service.as_str())
                    .force_new_deployment(true)
                    .send()
                    .await
                    .map_err(|err| notify_error(err.code(), sdk_detail(&err)))?;
                let active_deployments =
                    output.service().map_or(0, |service| service.deployments().len());
                Ok(RedeployReceipt {
                    active_deployments,
                })
            })
            .unwrap_or_else(|| Err(NotifyError::Backend(RUNTIME_CLOSED.to_string())))
    }
}

#[cfg(test)]
mod tests;
