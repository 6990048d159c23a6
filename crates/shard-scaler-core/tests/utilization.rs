//! Utilization threshold tests for the shard scaler core.
// crates/shard-scaler-core/tests/utilization.rs
// ============================================================================
// Module: Utilization Tests
// Description: Threshold boundary properties and monitor error propagation.
// Purpose: Pin the strictly greater-than scaling trigger.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;

use proptest::prelude::*;
use shard_scaler_core::MeasureError;
use shard_scaler_core::StaticUtilization;
use shard_scaler_core::UtilizationMonitor;
use shard_scaler_core::exceeds;

/// Tests the extremes of the counter range.
#[test]
fn exceeds_at_range_edges() {
    assert!(!exceeds(0, 0));
    assert!(exceeds(1, 0));
    assert!(!exceeds(u64::MAX, u64::MAX));
    assert!(exceeds(u64::MAX, u64::MAX - 1));
}

/// Tests the monitor reports the comparison alongside the count.
#[test]
fn monitor_sample_applies_threshold() {
    let target = Path::new("/mnt/efs/data");
    let at = UtilizationMonitor::new(StaticUtilization::count(100), 100).sample(target).unwrap();
    assert_eq!(at.count, 100);
    assert_eq!(at.threshold, 100);
    assert!(!at.exceeded);
    let above = UtilizationMonitor::new(StaticUtilization::count(101), 100).sample(target).unwrap();
    assert!(above.exceeded);
}

/// Tests access denial surfaces unchanged from the monitor.
#[test]
fn monitor_propagates_access_denied() {
    let denied = MeasureError::AccessDenied("/mnt/efs/data".to_string());
    let monitor = UtilizationMonitor::new(StaticUtilization::failing(denied.clone()), 10);
    assert_eq!(monitor.sample(Path::new("/mnt/efs/data")), Err(denied));
}

proptest! {
    /// Tests the threshold boundary holds for every threshold.
    #[test]
    fn exceeds_is_strictly_greater_than(threshold in 1u64..u64::MAX) {
        prop_assert!(!exceeds(threshold, threshold));
        prop_assert!(exceeds(threshold + 1, threshold));
        prop_assert!(!exceeds(threshold - 1, threshold));
    }

    /// Tests the boundary agrees with the monitor reading.
    #[test]
    fn monitor_matches_exceeds(count in any::<u64>(), threshold in any::<u64>()) {
        let reading = UtilizationMonitor::new(StaticUtilization::count(count), threshold)
            .sample(Path::new("/mnt/efs/data"))
            .unwrap();
        prop_assert_eq!(reading.exceeded, exceeds(count, threshold));
    }
}
