// crates/shard-scaler-core/src/core/identifiers.rs
// ============================================================================
// Module: Shard Scaler Identifiers
// Description: Canonical opaque identifiers for shards, partitions, and runs.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the string-based identifiers used throughout the shard
//! scaler. Identifiers are opaque and serialize as plain strings so they match
//! the published directory record byte for byte. Validation happens at the
//! configuration boundary, not inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares an opaque string identifier with the shared accessor surface.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

opaque_id!(
    /// Stable shard identifier assigned by the control plane (mount target id).
    ShardId
);

opaque_id!(
    /// Network subnet reference hosting a shard endpoint.
    SubnetId
);

opaque_id!(
    /// Availability zone name of a partition.
    ZoneName
);

opaque_id!(
    /// Resource group owning every shard (the file system id).
    ResourceGroupId
);

opaque_id!(
    /// Network group whose subnets form the partition space (the VPC id).
    NetworkGroupId
);

opaque_id!(
    /// Security policy attached to newly created shards.
    SecurityGroupId
);

opaque_id!(
    /// Container cluster hosting the consumer service.
    ClusterName
);

opaque_id!(
    /// Consumer service redeployed after a directory publish.
    ServiceName
);

opaque_id!(
    /// Identifier of one control-loop invocation.
    RunId
);
