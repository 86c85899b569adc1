//! Utility functions shared across the crate.

use std::path::Path;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Format a byte count as mebibytes with two decimal places.
#[allow(clippy::cast_precision_loss)]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MIB)
}

/// Size of the file at `path`, in bytes.
pub fn file_size(path: impl AsRef<Path>) -> std::io::Result<u64> {
    std::fs::metadata(path).map(|m| m.len())
}
