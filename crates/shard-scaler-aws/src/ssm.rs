// crates/shard-scaler-aws/src/ssm.rs
// ============================================================================
// Module: SSM Config Store
// Description: Systems Manager parameters as the directory store.
// Purpose: Implement ConfigStore on SSM Parameter Store.
// Dependencies: aws-sdk-ssm, shard-scaler-core
// ============================================================================

//! ## Overview
//! The published directory lives in a single `String` parameter. A missing
//! parameter reads as `None`; writes replace the whole value in one call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_sdk_ssm::error::ProvideErrorMetadata;
use aws_sdk_ssm::types::ParameterType;
use shard_scaler_core::ConfigStore;
use shard_scaler_core::ConfigStoreError;

use crate::context::BlockingRuntime;
use crate::context::RUNTIME_CLOSED;
use crate::context::sdk_detail;

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Result of classifying a parameter read failure.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReadFailure {
    /// Parameter does not exist yet.
    Missing,
    /// Parameter exists but could not be read.
    Error(ConfigStoreError),
}

/// Classifies an SSM error code.
fn classify(code: Option<&str>, detail: String) -> ReadFailure {
    match code {
        Some("ParameterNotFound") => ReadFailure::Missing,
        Some("AccessDeniedException") => {
            ReadFailure::Error(ConfigStoreError::AccessDenied(detail))
        }
        _ => ReadFailure::Error(ConfigStoreError::Backend(detail)),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// SSM Parameter Store behind [`ConfigStore`].
pub struct SsmConfigStore {
    /// SSM client.
    client: aws_sdk_ssm::Client,
    /// Runtime driving SDK futures.
    runtime: BlockingRuntime,
}

impl SsmConfigStore {
    /// Creates the adapter from a prepared client.
    pub(crate) const fn new(client: aws_sdk_ssm::Client, runtime: BlockingRuntime) -> Self {
        Self {
            client,
            runtime,
        }
    }
}

impl ConfigStore for SsmConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError> {
        let client = self.client.clone();
        self.runtime
            .block_on(async {
                match client.get_parameter().name(key).send().await {
                    Ok(output) => Ok(output
                        .parameter()
                        .and_then(|parameter| parameter.value())
                        .map(str::to_string)),
                    Err(err) => match classify(err.code(), sdk_detail(&err)) {
                        ReadFailure::Missing => Ok(None),
                        ReadFailure::Error(err) => Err(err),
                    },
                }
            })
            .unwrap_or_else(|| Err(ConfigStoreError::Backend(RUNTIME_CLOSED.to_string())))
    }

    fn put(&self, key: &str, value: &str, overwrite: bool) -> Result<(), ConfigStoreError> {
        let client = self.client.clone();
        self.runtime
            .block_on(async {
                client
                    .put_parameter()
                    .name(key)
                    .value(value)
                    .overwrite(overwrite)
                    .r#type(ParameterType::String)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|err| match classify(err.code(), sdk_detail(&err)) {
                        ReadFailure::Error(err) => err,
                        ReadFailure::Missing => ConfigStoreError::Backend(sdk_detail(&err)),
                    })
            })
            .unwrap_or_else(|| Err(ConfigStoreError::Backend(RUNTIME_CLOSED.to_string())))
    }
}
