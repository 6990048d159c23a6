// crates/shard-scaler-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for configuration tests.
// Purpose: Build complete environments and config files for test suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;

/// Returns an environment map carrying every required variable.
pub fn full_env() -> BTreeMap<String, String> {
    [
        ("TARGET_DIRECTORY", "/mnt/efs/data"),
        ("EFS_FILE_SYSTEM_ID", "fs-12345678"),
        ("VPC_ID", "vpc-12345678"),
        ("SSM_PARAMETER_NAME", "/efs/mount-targets"),
        ("ECS_CLUSTER_NAME", "file-cluster"),
        ("ECS_SERVICE_NAME", "file-service"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

/// Complete configuration file body.
pub const FULL_TOML: &str = r#"
[scaling]
target_directory = "/data/incoming"
file_count_threshold = 5000

[shards]
file_system_id = "fs-toml"
vpc_id = "vpc-toml"
security_group_id = "sg-toml"

[directory]
parameter_name = "/toml/mount-targets"

[consumer]
cluster = "toml-cluster"
service = "toml-service"

[provisioning]
poll_interval_secs = 5
poll_timeout_secs = 120

[mount]
base = "/srv/shards"
prefix = "vol-"
"#;
