//! Record geometry: the fixed record size and count that describe a file.
//!
//! Record `i` occupies bytes `[i * record_size, (i + 1) * record_size)`. There is
//! no header, footer or padding, so the file is exactly `record_size * record_count`
//! bytes long.

use crate::error::{RecfileError, Result};
use std::ops::Range;

/// Bytes per record in the default geometry
pub const RECORD_SIZE: usize = 100;

/// Records per file in the default geometry
pub const RECORD_COUNT: u64 = 1_000_000;

/// Fixed-size record layout of a flat binary file
///
/// Geometry is a plain value handed to every accessor at construction, so files
/// with different layouts can be open side by side in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordGeometry {
    record_size: usize,
    record_count: u64,
}

impl RecordGeometry {
    /// 100-byte records, one million of them (a 100,000,000-byte file)
    pub const DEFAULT: Self = Self {
        record_size: RECORD_SIZE,
        record_count: RECORD_COUNT,
    };

    /// Create a geometry, rejecting zero-sized records and layouts whose total
    /// size does not fit in a `u64`
    pub fn new(record_size: usize, record_count: u64) -> Result<Self> {
        if record_size == 0 {
            return Err(RecfileError::invalid_geometry("record size must be non-zero"));
        }

        (record_size as u64).checked_mul(record_count).ok_or_else(|| {
            RecfileError::invalid_geometry(format!(
                "{} records of {} bytes overflow the file size",
                record_count, record_size
            ))
        })?;

        Ok(Self {
            record_size,
            record_count,
        })
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Total file size in bytes
    pub fn file_size(&self) -> u64 {
        // Overflow ruled out by the constructor
        self.record_size as u64 * self.record_count
    }

    /// Fail with `IndexOutOfRange` unless `index < record_count`
    #[inline]
    pub fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.record_count {
            return Err(RecfileError::IndexOutOfRange {
                index,
                record_count: self.record_count,
            });
        }
        Ok(())
    }

    /// Byte offset of record `index`
    ///
    /// The index is range-checked before any arithmetic, so the multiplication
    /// cannot overflow.
    #[inline]
    pub fn byte_offset(&self, index: u64) -> Result<u64> {
        self.check_index(index)?;
        Ok(index * self.record_size as u64)
    }

    /// Byte range `[offset, offset + record_size)` of record `index`
    pub fn record_span(&self, index: u64) -> Result<Range<u64>> {
        let offset = self.byte_offset(index)?;
        Ok(offset..offset + self.record_size as u64)
    }
}

impl Default for RecordGeometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}
