// crates/shard-scaler-config/src/config.rs
// ============================================================================
// Module: Shard Scaler Configuration
// Description: Configuration loading, environment overlay, and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: shard-scaler-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from an optional TOML file and then overlaid with
//! environment variables, so scheduled deployments can run on environment
//! alone. Every required identifier must be present after the overlay;
//! validation fails closed and names the missing field before any
//! collaborator is constructed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use shard_scaler_core::ClusterName;
use shard_scaler_core::NetworkGroupId;
use shard_scaler_core::PollPolicy;
use shard_scaler_core::ProvisionScope;
use shard_scaler_core::ResourceGroupId;
use shard_scaler_core::ScalingTargets;
use shard_scaler_core::SecurityGroupId;
use shard_scaler_core::ServiceName;
use shard_scaler_core::ShardRoots;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "shard-scaler.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SHARD_SCALER_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default file-count threshold.
pub const DEFAULT_FILE_COUNT_THRESHOLD: u64 = 100_000;
/// Default mount command timeout in seconds.
const DEFAULT_MOUNT_TIMEOUT_SECS: u64 = 30;
/// Default seconds between provisioning polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Default total provisioning wait in seconds.
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;
/// Largest accepted mount timeout in seconds.
const MAX_MOUNT_TIMEOUT_SECS: u64 = 600;

/// Environment variable names recognized by the overlay.
pub mod env_keys {
    /// Measurement target directory.
    pub const TARGET_DIRECTORY: &str = "TARGET_DIRECTORY";
    /// File-count threshold.
    pub const FILE_COUNT_THRESHOLD: &str = "FILE_COUNT_THRESHOLD";
    /// File system (resource group) identifier.
    pub const EFS_FILE_SYSTEM_ID: &str = "EFS_FILE_SYSTEM_ID";
    /// Network group identifier.
    pub const VPC_ID: &str = "VPC_ID";
    /// Optional security group for new shards.
    pub const SECURITY_GROUP_ID: &str = "SECURITY_GROUP_ID";
    /// Config store key holding the directory.
    pub const SSM_PARAMETER_NAME: &str = "SSM_PARAMETER_NAME";
    /// Consumer cluster.
    pub const ECS_CLUSTER_NAME: &str = "ECS_CLUSTER_NAME";
    /// Consumer service.
    pub const ECS_SERVICE_NAME: &str = "ECS_SERVICE_NAME";
    /// Cloud region.
    pub const AWS_REGION: &str = "AWS_REGION";
}

// ============================================================================
// SECTION: Environment Sources
// ============================================================================

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Returns the value of a variable, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// Environment source backed by the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Shard scaler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalerConfig {
    /// Measurement and threshold settings.
    #[serde(default)]
    pub scaling: ScalingConfig,
    /// Shard resource identifiers.
    #[serde(default)]
    pub shards: ShardsConfig,
    /// Published directory location.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Consumer service to redeploy.
    #[serde(default)]
    pub consumer: ConsumerConfig,
    /// Provisioning poll bounds.
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    /// Cloud client settings.
    #[serde(default)]
    pub aws: AwsConfig,
    /// Consumer mount settings.
    #[serde(default)]
    pub mount: MountConfig,
    /// Event logging settings.
    #[serde(default)]
    pub events: EventsConfig,
}

/// Measurement and threshold settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    /// Directory whose file count drives scaling.
    #[serde(default)]
    pub target_directory: String,
    /// Scale when the file count is strictly greater than this value.
    #[serde(default = "default_threshold")]
    pub file_count_threshold: u64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            target_directory: String::new(),
            file_count_threshold: DEFAULT_FILE_COUNT_THRESHOLD,
        }
    }
}

/// Shard resource identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardsConfig {
    /// File system owning every shard.
    #[serde(default)]
    pub file_system_id: String,
    /// Network whose subnets host shards.
    #[serde(default)]
    pub vpc_id: String,
    /// Optional security group for new shards.
    #[serde(default)]
    pub security_group_id: Option<String>,
}

/// Published directory location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Config store key holding the directory record.
    #[serde(default)]
    pub parameter_name: String,
}

/// Consumer service to redeploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Cluster hosting the service.
    #[serde(default)]
    pub cluster: String,
    /// Service name.
    #[serde(default)]
    pub service: String,
}

/// Provisioning poll bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Seconds between lifecycle polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Total seconds to wait for a new shard.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }
}

/// Cloud client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region override; the SDK default chain applies when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override for local emulators.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Consumer mount settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Parent directory of shard mount points.
    #[serde(default = "default_mount_base")]
    pub base: String,
    /// Mount point name prefix.
    #[serde(default = "default_mount_prefix")]
    pub prefix: String,
    /// Mount command timeout in seconds.
    #[serde(default = "default_mount_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            base: default_mount_base(),
            prefix: default_mount_prefix(),
            timeout_secs: DEFAULT_MOUNT_TIMEOUT_SECS,
        }
    }
}

/// Destination for structured events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Event logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: EventSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ScalerConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &ProcessEnv)
    }

    /// Loads configuration, overlays `env`, and validates the result.
    ///
    /// The file path comes from `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`]. An explicit or environment-named file must
    /// exist; a missing default file means the environment alone configures
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(path: Option<&Path>, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path, env)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration for a consumer host using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or consumer validation fails.
    pub fn load_consumer(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_consumer_with_env(path, &ProcessEnv)
    }

    /// Loads configuration and validates only what consumers need.
    ///
    /// Consumers read the directory and mount shards; they never measure or
    /// provision, so scaling, shard, and redeploy fields may be unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or consumer validation fails.
    pub fn load_consumer_with_env(
        path: Option<&Path>,
        env: &dyn EnvSource,
    ) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path, env)?;
        config.validate_consumer()?;
        Ok(config)
    }

    /// Resolves the file, parses it, and overlays `env`.
    fn load_unvalidated(path: Option<&Path>, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path, env)?;
        validate_path(&resolved)?;
        let mut config = if explicit || resolved.exists() {
            Self::from_file(&resolved)?
        } else {
            Self::default()
        };
        config.apply_env(env)?;
        Ok(config)
    }

    /// Parses a configuration file without overlay or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays recognized environment variables onto the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `FILE_COUNT_THRESHOLD` is not an
    /// unsigned integer.
    pub fn apply_env(&mut self, env: &dyn EnvSource) -> Result<(), ConfigError> {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = env.var(key).filter(|value| !value.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.scaling.target_directory, env_keys::TARGET_DIRECTORY);
        set(&mut self.shards.file_system_id, env_keys::EFS_FILE_SYSTEM_ID);
        set(&mut self.shards.vpc_id, env_keys::VPC_ID);
        set(&mut self.directory.parameter_name, env_keys::SSM_PARAMETER_NAME);
        set(&mut self.consumer.cluster, env_keys::ECS_CLUSTER_NAME);
        set(&mut self.consumer.service, env_keys::ECS_SERVICE_NAME);
        if let Some(value) = env.var(env_keys::SECURITY_GROUP_ID) {
            self.shards.security_group_id = Some(value);
        }
        if let Some(value) = env.var(env_keys::AWS_REGION).filter(|value| !value.trim().is_empty())
        {
            self.aws.region = Some(value);
        }
        if let Some(raw) = env.var(env_keys::FILE_COUNT_THRESHOLD) {
            self.scaling.file_count_threshold = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be a valid integer, got: {raw}",
                    env_keys::FILE_COUNT_THRESHOLD
                ))
            })?;
        }
        Ok(())
    }

    /// Validates the configuration for completeness and sane bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(
            "scaling.target_directory",
            env_keys::TARGET_DIRECTORY,
            &self.scaling.target_directory,
        )?;
        validate_path_string("scaling.target_directory", &self.scaling.target_directory)?;
        require("shards.file_system_id", env_keys::EFS_FILE_SYSTEM_ID, &self.shards.file_system_id)?;
        require("shards.vpc_id", env_keys::VPC_ID, &self.shards.vpc_id)?;
        require("consumer.cluster", env_keys::ECS_CLUSTER_NAME, &self.consumer.cluster)?;
        require("consumer.service", env_keys::ECS_SERVICE_NAME, &self.consumer.service)?;
        self.poll_policy()?;
        self.validate_consumer()
    }

    /// Validates the directory, mount, and event settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate_consumer(&self) -> Result<(), ConfigError> {
        require(
            "directory.parameter_name",
            env_keys::SSM_PARAMETER_NAME,
            &self.directory.parameter_name,
        )?;
        self.mount.validate()?;
        self.events.validate()
    }

    /// Returns the run inputs for the controller.
    #[must_use]
    pub fn targets(&self) -> ScalingTargets {
        ScalingTargets {
            measurement_target: PathBuf::from(self.scaling.target_directory.trim()),
            cluster: ClusterName::new(self.consumer.cluster.trim()),
            service: ServiceName::new(self.consumer.service.trim()),
        }
    }

    /// Returns the provisioning scope.
    #[must_use]
    pub fn provision_scope(&self) -> ProvisionScope {
        ProvisionScope {
            resource_group: ResourceGroupId::new(self.shards.file_system_id.trim()),
            network_group: NetworkGroupId::new(self.shards.vpc_id.trim()),
            security_group: self
                .shards
                .security_group_id
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(SecurityGroupId::new),
        }
    }

    /// Returns the validated provisioning poll policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bounds are out of range.
    pub fn poll_policy(&self) -> Result<PollPolicy, ConfigError> {
        PollPolicy::new(
            Duration::from_secs(self.provisioning.poll_interval_secs),
            Duration::from_secs(self.provisioning.poll_timeout_secs),
        )
        .map_err(|err| ConfigError::Invalid(format!("provisioning: {err}")))
    }

    /// Returns the shard mount root naming scheme.
    #[must_use]
    pub fn shard_roots(&self) -> ShardRoots {
        ShardRoots::new(&self.mount.base, self.mount.prefix.clone())
    }

    /// Returns the mount command timeout.
    #[must_use]
    pub const fn mount_timeout(&self) -> Duration {
        Duration::from_secs(self.mount.timeout_secs)
    }
}

impl MountConfig {
    /// Validates mount naming and timeout bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("mount.base", &self.base)?;
        if self.prefix.contains('/') {
            return Err(ConfigError::Invalid("mount.prefix must not contain '/'".to_string()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_MOUNT_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "mount.timeout_secs must be between 1 and {MAX_MOUNT_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }
}

impl EventsConfig {
    /// Validates that file sinks name a path.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (EventSinkKind::File, Some(path)) => validate_path_string("events.path", path),
            (EventSinkKind::File, None) => {
                Err(ConfigError::Invalid("events.path is required for the file sink".to_string()))
            }
            (EventSinkKind::Stderr | EventSinkKind::None, _) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the default threshold.
const fn default_threshold() -> u64 {
    DEFAULT_FILE_COUNT_THRESHOLD
}

/// Returns the default poll interval.
const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Returns the default poll timeout.
const fn default_poll_timeout_secs() -> u64 {
    DEFAULT_POLL_TIMEOUT_SECS
}

/// Returns the default mount timeout.
const fn default_mount_timeout_secs() -> u64 {
    DEFAULT_MOUNT_TIMEOUT_SECS
}

/// Returns the default mount base.
fn default_mount_base() -> String {
    shard_scaler_core::DEFAULT_MOUNT_BASE.to_string()
}

/// Returns the default mount prefix.
fn default_mount_prefix() -> String {
    shard_scaler_core::DEFAULT_MOUNT_PREFIX.to_string()
}

/// Fails when a required field is blank.
fn require(field: &str, env_key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{field} is required (set it in the config file or {env_key})"
        )));
    }
    Ok(())
}

/// Resolves the config path and whether it was named explicitly.
fn resolve_path(path: Option<&Path>, env: &dyn EnvSource) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env.var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
