//! Fixed-size record access over flat binary files.
//!
//! Two interchangeable backends sit behind the [`RecordReader`] and
//! [`RecordWriter`] capability traits:
//!
//! - [`positional`] - one explicit-offset system call per record
//! - [`mapped`] - the whole file mapped into memory; reads are loads, writes are stores
//!
//! The mapped writer additionally offers [`PageResidency`] control for producing
//! cold or warm page conditions.

pub mod accessor;
pub mod factory;
pub mod geometry;
pub mod mapped;
pub mod positional;
pub mod validation;

pub use accessor::{PageResidency, RecordReader, RecordWriter};
pub use factory::{AnyReader, AnyWriter, RecordFileFactory};
pub use geometry::{RecordGeometry, RECORD_COUNT, RECORD_SIZE};
pub use mapped::{MappedReader, MappedWriter, PAGE_SIZE};
pub use positional::{PositionalReader, PositionalWriter};
pub use validation::validate_record_file;

use crate::error::{RecfileError, Result};
use std::fmt;
use std::str::FromStr;

/// Access strategy for record transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStrategy {
    /// Explicit-offset reads and writes through the file handle
    Positional,
    /// Loads and stores against a mapping of the whole file
    MemoryMapped,
}

impl AccessStrategy {
    /// Get the short name used on the command line and in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::MemoryMapped => "mmap",
        }
    }
}

impl fmt::Display for AccessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccessStrategy {
    type Err = RecfileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "positional" | "pread" => Ok(Self::Positional),
            "mmap" | "mapped" | "memory-mapped" => Ok(Self::MemoryMapped),
            other => Err(RecfileError::config(format!(
                "unknown access strategy '{}', expected 'positional' or 'mmap'",
                other
            ))),
        }
    }
}
