// crates/shard-scaler-aws/src/ecs/tests.rs
// ============================================================================
// Module: ECS Redeploy Notifier Unit Tests
// Description: Unit tests for service update error classification.
// Purpose: Validate ECS translation without live AWS services.
// ============================================================================

use shard_scaler_core::NotifyError;

use super::CLUSTER_NOT_FOUND;
use super::SERVICE_NOT_ACTIVE;
use super::SERVICE_NOT_FOUND;
use super::notify_error;

#[test]
fn missing_cluster_or_service_is_not_found() {
    for code in [CLUSTER_NOT_FOUND, SERVICE_NOT_FOUND, SERVICE_NOT_ACTIVE] {
        assert_eq!(
            notify_error(Some(code), "gone".to_string()),
            NotifyError::NotFound("gone".to_string())
        );
    }
}

#[test]
fn other_failures_are_backend_errors() {
    assert_eq!(
        notify_error(Some("AccessDeniedException"), "denied".to_string()),
        NotifyError::Backend("denied".to_string())
    );
    assert_eq!(
        notify_error(Some("ThrottlingException"), "slow down".to_string()),
        NotifyError::Backend("slow down".to_string())
    );
    assert_eq!(notify_error(None, "io".to_string()), NotifyError::Backend("io".to_string()));
}
