// crates/shard-scaler-aws/src/lib.rs
// ============================================================================
// Module: Shard Scaler AWS Library
// Description: AWS implementations of the shard scaler interfaces.
// Purpose: Back the scaling loop with EFS, EC2, SSM, and ECS.
// Dependencies: aws-config, aws-sdk-{efs,ec2,ssm,ecs}, tokio
// ============================================================================

//! ## Overview
//! Adapters are built from one [`AwsContext`], which loads credentials and
//! region once and owns the runtime every blocking call runs on.
//!
//! | Interface | Service |
//! | --- | --- |
//! | `ResourceControlPlane` | EFS mount targets, EC2 subnets |
//! | `ConfigStore` | SSM Parameter Store |
//! | `RedeployNotifier` | ECS `UpdateService` |

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod ecs;
pub mod efs;
pub mod ssm;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::AwsContext;
pub use context::AwsSettings;
pub use context::AwsSetupError;
pub use ecs::EcsRedeployNotifier;
pub use efs::EfsControlPlane;
pub use ssm::SsmConfigStore;
