// crates/shard-scaler-aws/src/context.rs
// ============================================================================
// Module: AWS Context
// Description: Shared SDK configuration and blocking runtime for adapters.
// Purpose: Load AWS settings once and drive async SDK calls synchronously.
// Dependencies: aws-config, tokio
// ============================================================================

//! ## Overview
//! [`AwsContext`] owns a multi-threaded Tokio runtime and the loaded
//! [`SdkConfig`]. Adapters built from it clone a [`BlockingRuntime`] handle
//! and call `block_on` per request, so the scaling loop stays synchronous.
//! The last handle hands the runtime to a helper thread when dropped, which
//! keeps drops legal from inside another runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use aws_sdk_ssm::error::ProvideErrorMetadata;
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::ecs::EcsRedeployNotifier;
use crate::efs::EfsControlPlane;
use crate::ssm::SsmConfigStore;

// ============================================================================
// SECTION: Settings and Errors
// ============================================================================

/// Connection settings shared by every adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    /// Region override; falls back to the standard AWS environment chain.
    pub region: Option<String>,
    /// Endpoint override for local emulators.
    pub endpoint_url: Option<String>,
}

/// Errors raised while setting up AWS access.
#[derive(Debug, Error)]
pub enum AwsSetupError {
    /// Settings are malformed.
    #[error("invalid aws settings: {0}")]
    Invalid(String),
    /// Tokio runtime could not be started.
    #[error("aws runtime error: {0}")]
    Runtime(String),
}

// ============================================================================
// SECTION: Blocking Runtime
// ============================================================================

/// Shared handle to the runtime that executes SDK futures.
#[derive(Clone)]
pub struct BlockingRuntime {
    /// Runtime handle; `None` only while dropping.
    runtime: Option<Arc<Runtime>>,
}

impl BlockingRuntime {
    /// Starts a new multi-threaded runtime.
    fn start() -> Result<Self, AwsSetupError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| AwsSetupError::Runtime(err.to_string()))?;
        Ok(Self {
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Runs a future to completion, or returns `None` once closed.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> Option<F::Output> {
        self.runtime.as_ref().map(|runtime| runtime.block_on(future))
    }
}

impl Drop for BlockingRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

/// Message returned when an adapter outlives its runtime.
pub(crate) const RUNTIME_CLOSED: &str = "aws runtime closed";

/// Renders an SDK error as `code: message`, falling back to its display.
pub(crate) fn sdk_detail<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => err.to_string(),
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Loaded SDK configuration plus the runtime used to drive it.
pub struct AwsContext {
    /// Runtime shared with every adapter.
    runtime: BlockingRuntime,
    /// Region, credentials, and endpoint resolution.
    sdk: SdkConfig,
}

impl AwsContext {
    /// Loads AWS configuration from the settings and the ambient environment.
    ///
    /// # Errors
    ///
    /// Returns [`AwsSetupError`] when the settings are malformed or the
    /// runtime cannot start.
    pub fn connect(settings: &AwsSettings) -> Result<Self, AwsSetupError> {
        validate_settings(settings)?;
        let runtime = BlockingRuntime::start()?;
        let sdk = runtime
            .block_on(async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = &settings.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                if let Some(endpoint) = &settings.endpoint_url {
                    loader = loader.endpoint_url(endpoint);
                }
                loader.load().await
            })
            .ok_or_else(|| AwsSetupError::Runtime(RUNTIME_CLOSED.to_string()))?;
        Ok(Self {
            runtime,
            sdk,
        })
    }

    /// Returns the resolved region, if any.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.sdk.region().map(Region::as_ref)
    }

    /// Builds the EFS/EC2 control plane adapter.
    #[must_use]
    pub fn control_plane(&self) -> EfsControlPlane {
        EfsControlPlane::new(
            aws_sdk_efs::Client::new(&self.sdk),
            aws_sdk_ec2::Client::new(&self.sdk),
            self.runtime.clone(),
        )
    }

    /// Builds the SSM parameter store adapter.
    #[must_use]
    pub fn config_store(&self) -> SsmConfigStore {
        SsmConfigStore::new(aws_sdk_ssm::Client::new(&self.sdk), self.runtime.clone())
    }

    /// Builds the ECS redeploy notifier.
    #[must_use]
    pub fn notifier(&self) -> EcsRedeployNotifier {
        EcsRedeployNotifier::new(aws_sdk_ecs::Client::new(&self.sdk), self.runtime.clone())
    }
}

/// Rejects blank regions and endpoints without an http(s) scheme.
fn validate_settings(settings: &AwsSettings) -> Result<(), AwsSetupError> {
    if let Some(region) = &settings.region
        && region.trim().is_empty()
    {
        return Err(AwsSetupError::Invalid("region must not be blank".to_string()));
    }
    if let Some(endpoint) = &settings.endpoint_url
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(AwsSetupError::Invalid(format!(
            "endpoint_url must use http or https: {endpoint}"
        )));
    }
    Ok(())
}
