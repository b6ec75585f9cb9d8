//! File validation utilities for record files.
//!
//! This module checks that a path names a regular file whose length matches a
//! record geometry before an accessor is opened against it.

use crate::error::{RecfileError, Result};
use crate::record_file::geometry::RecordGeometry;
use std::path::Path;

/// Validate that a file is a well-formed record file for `geometry`
///
/// # Validations Performed
/// - Path exists and is a regular file
/// - File length is exactly `record_size * record_count`
///
/// # Error Cases
/// - `OpenFailure` - path does not exist or its metadata cannot be read
/// - `NotAFile` - path points to a directory or other non-file
/// - `GeometryMismatch` - file is shorter or longer than the geometry requires
pub fn validate_record_file(path: &Path, geometry: &RecordGeometry) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| RecfileError::open_failure(path, e))?;

    if !metadata.is_file() {
        return Err(RecfileError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let actual = metadata.len();
    let expected = geometry.file_size();
    if actual != expected {
        return Err(RecfileError::GeometryMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }

    Ok(())
}
