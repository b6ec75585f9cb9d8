//! Factory for creating record accessors.
//!
//! This module provides the RecordFileFactory, which validates a record file and
//! opens the backend chosen by an [`AccessStrategy`]. The backends are wrapped in
//! the [`AnyReader`] and [`AnyWriter`] enums so callers can hold either one behind
//! a single concrete type.

use crate::error::Result;
use crate::record_file::accessor::{PageResidency, RecordReader, RecordWriter};
use crate::record_file::geometry::RecordGeometry;
use crate::record_file::mapped::{MappedReader, MappedWriter};
use crate::record_file::positional::{PositionalReader, PositionalWriter};
use crate::record_file::validation::validate_record_file;
use crate::record_file::AccessStrategy;
use log::debug;
use std::path::Path;

/// Record reader over whichever backend the factory selected
#[derive(Debug)]
pub enum AnyReader {
    /// One positional read per record
    Positional(PositionalReader),
    /// Views into a private read-only mapping
    Mapped(MappedReader),
}

impl AnyReader {
    pub fn strategy(&self) -> AccessStrategy {
        match self {
            AnyReader::Positional(_) => AccessStrategy::Positional,
            AnyReader::Mapped(_) => AccessStrategy::MemoryMapped,
        }
    }
}

impl RecordReader for AnyReader {
    fn geometry(&self) -> RecordGeometry {
        match self {
            AnyReader::Positional(reader) => reader.geometry(),
            AnyReader::Mapped(reader) => reader.geometry(),
        }
    }

    fn read_record<'a>(&'a self, index: u64, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        match self {
            AnyReader::Positional(reader) => reader.read_record(index, buf),
            AnyReader::Mapped(reader) => reader.read_record(index, buf),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            AnyReader::Positional(reader) => reader.close(),
            AnyReader::Mapped(reader) => reader.close(),
        }
    }
}

/// Record writer over whichever backend the factory selected
#[derive(Debug)]
pub enum AnyWriter {
    /// One positional write per record
    Positional(PositionalWriter),
    /// Stores into a shared read-write mapping
    Mapped(MappedWriter),
}

impl AnyWriter {
    pub fn strategy(&self) -> AccessStrategy {
        match self {
            AnyWriter::Positional(_) => AccessStrategy::Positional,
            AnyWriter::Mapped(_) => AccessStrategy::MemoryMapped,
        }
    }

    /// Page residency control, available only for the mapped backend
    pub fn residency(&self) -> Option<&dyn PageResidency> {
        match self {
            AnyWriter::Positional(_) => None,
            AnyWriter::Mapped(writer) => Some(writer as &dyn PageResidency),
        }
    }
}

impl RecordWriter for AnyWriter {
    fn geometry(&self) -> RecordGeometry {
        match self {
            AnyWriter::Positional(writer) => RecordWriter::geometry(writer),
            AnyWriter::Mapped(writer) => RecordWriter::geometry(writer),
        }
    }

    fn write_record(&mut self, index: u64, data: &[u8]) -> Result<()> {
        match self {
            AnyWriter::Positional(writer) => writer.write_record(index, data),
            AnyWriter::Mapped(writer) => writer.write_record(index, data),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            AnyWriter::Positional(writer) => RecordWriter::close(writer),
            AnyWriter::Mapped(writer) => RecordWriter::close(writer),
        }
    }
}

impl RecordReader for AnyWriter {
    fn geometry(&self) -> RecordGeometry {
        RecordWriter::geometry(self)
    }

    fn read_record<'a>(&'a self, index: u64, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        match self {
            AnyWriter::Positional(writer) => writer.read_record(index, buf),
            AnyWriter::Mapped(writer) => writer.read_record(index, buf),
        }
    }

    fn close(self) -> Result<()> {
        RecordWriter::close(self)
    }
}

/// Factory for creating validated record accessors
///
/// # Validation
/// Every file is checked before an accessor is opened:
/// - File existence and type (not a directory)
/// - Length exactly `record_size * record_count`
pub struct RecordFileFactory;

impl RecordFileFactory {
    /// Open a reader for `path` using `strategy`
    ///
    /// # Errors
    /// * Validation errors (missing file, not a file, geometry mismatch)
    /// * `OpenFailure` / `MappingFailure` from the selected backend
    pub fn open_reader(
        path: &Path,
        strategy: AccessStrategy,
        geometry: RecordGeometry,
    ) -> Result<AnyReader> {
        validate_record_file(path, &geometry)?;
        debug!("opening {} reader for {}", strategy, path.display());

        match strategy {
            AccessStrategy::Positional => {
                PositionalReader::open(path, geometry).map(AnyReader::Positional)
            }
            AccessStrategy::MemoryMapped => {
                MappedReader::open(path, geometry).map(AnyReader::Mapped)
            }
        }
    }

    /// Open a writer for an existing file at `path` using `strategy`
    pub fn open_writer(
        path: &Path,
        strategy: AccessStrategy,
        geometry: RecordGeometry,
    ) -> Result<AnyWriter> {
        validate_record_file(path, &geometry)?;
        debug!("opening {} writer for {}", strategy, path.display());

        match strategy {
            AccessStrategy::Positional => {
                PositionalWriter::open(path, geometry).map(AnyWriter::Positional)
            }
            AccessStrategy::MemoryMapped => {
                MappedWriter::open(path, geometry).map(AnyWriter::Mapped)
            }
        }
    }
}
