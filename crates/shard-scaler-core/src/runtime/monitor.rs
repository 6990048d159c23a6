// crates/shard-scaler-core/src/runtime/monitor.rs
// ============================================================================
// Module: Utilization Monitor
// Description: File-count measurement and threshold comparison.
// Purpose: Produce the fullness signal that drives scaling decisions.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! Utilization is the number of regular files directly inside the target
//! directory. Subdirectories and their contents are not counted. The
//! threshold comparison is strictly greater-than.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;

use crate::interfaces::MeasureError;
use crate::interfaces::UtilizationSource;

// ============================================================================
// SECTION: Threshold
// ============================================================================

/// Returns true when `count` is strictly greater than `threshold`.
#[must_use]
pub const fn exceeds(count: u64, threshold: u64) -> bool {
    count > threshold
}

// ============================================================================
// SECTION: Directory File Counter
// ============================================================================

/// Counts regular files directly inside a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryFileCounter;

impl UtilizationSource for DirectoryFileCounter {
    fn measure(&self, target: &Path) -> Result<u64, MeasureError> {
        let display = target.display().to_string();
        let metadata = fs::metadata(target).map_err(|err| map_io_error(&err, &display))?;
        if !metadata.is_dir() {
            return Err(MeasureError::NotADirectory(display));
        }
        let entries = fs::read_dir(target).map_err(|err| map_io_error(&err, &display))?;
        let mut count: u64 = 0;
        for entry in entries {
            let entry = entry.map_err(|err| map_io_error(&err, &display))?;
            // Follows symlinks, so a link to a regular file counts as a file.
            if fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()) {
                count = count.saturating_add(1);
            }
        }
        Ok(count)
    }
}

/// Maps an I/O error onto the measurement taxonomy.
fn map_io_error(err: &io::Error, target: &str) -> MeasureError {
    match err.kind() {
        io::ErrorKind::NotFound => MeasureError::NotFound(target.to_string()),
        io::ErrorKind::PermissionDenied => MeasureError::AccessDenied(target.to_string()),
        io::ErrorKind::NotADirectory => MeasureError::NotADirectory(target.to_string()),
        _ => MeasureError::Io(format!("{target}: {err}")),
    }
}

// ============================================================================
// SECTION: Monitor
// ============================================================================

/// One utilization sample compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilizationReading {
    /// Measured file count.
    pub count: u64,
    /// Threshold in effect.
    pub threshold: u64,
    /// Whether the count exceeded the threshold.
    pub exceeded: bool,
}

/// Measures a target and applies the threshold.
#[derive(Debug, Clone)]
pub struct UtilizationMonitor<U> {
    /// Measurement backend.
    source: U,
    /// Scaling threshold.
    threshold: u64,
}

impl<U: UtilizationSource> UtilizationMonitor<U> {
    /// Creates a monitor over a utilization source.
    #[must_use]
    pub const fn new(source: U, threshold: u64) -> Self {
        Self {
            source,
            threshold,
        }
    }

    /// Returns the threshold in effect.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Measures the target and compares it with the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError`] when the target is missing or unreadable.
    pub fn sample(&self, target: &Path) -> Result<UtilizationReading, MeasureError> {
        let count = self.source.measure(target)?;
        Ok(UtilizationReading {
            count,
            threshold: self.threshold,
            exceeded: exceeds(count, self.threshold),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    /// Tests only regular files directly inside the target are counted.
    #[test]
    fn counter_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), b"c").unwrap();
        assert_eq!(DirectoryFileCounter.measure(dir.path()).unwrap(), 2);
    }

    /// Tests missing and non-directory targets map to their variants.
    #[test]
    fn counter_reports_missing_and_file_targets() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            DirectoryFileCounter.measure(&missing),
            Err(MeasureError::NotFound(_))
        ));
        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            DirectoryFileCounter.measure(&file),
            Err(MeasureError::NotADirectory(_))
        ));
    }
}
