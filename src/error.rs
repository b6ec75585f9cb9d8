//! Error types and handling infrastructure for recfile.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library's error taxonomy. The binary layers `anyhow` context on top.
//!
//! ## Design Principles
//!
//! - **Caller contract vs storage anomaly**: range, buffer and size violations are
//!   distinct from short transfers reported by the storage layer
//! - **Context preservation**: offsets, lengths and paths travel with the error
//! - **No recovery**: every error is returned to the caller, nothing is retried

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Direction of a record transfer, used to label partial transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Read,
    Write,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Read => f.write_str("read"),
            TransferKind::Write => f.write_str("write"),
        }
    }
}

/// The main error type for recfile operations.
///
/// This enum covers every failure an accessor can report, from opening the
/// underlying file to transferring a single record.
#[derive(Error, Debug)]
pub enum RecfileError {
    /// The file could not be opened, created or stat'd
    #[error("Failed to open {path}: {source}")]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Establishing the virtual-memory mapping failed
    #[error("Memory mapping of {path} failed: {source}")]
    MappingFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record index outside `[0, record_count)`
    #[error("Index {index} out of range [0, {record_count})")]
    IndexOutOfRange { index: u64, record_count: u64 },

    /// Caller-supplied destination buffer cannot hold a record
    #[error("Buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Write payload is not exactly one record long
    #[error("Record size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The storage layer transferred fewer bytes than a full record
    #[error("Partial {operation} at offset {offset}: expected {expected} bytes, got {actual}")]
    PartialTransfer {
        operation: TransferKind,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Record byte range lies beyond the end of the mapping
    #[error("Record {index} at offset {offset} would exceed mapping of {mapping_len} bytes")]
    BoundsExceeded {
        index: u64,
        offset: u64,
        mapping_len: usize,
    },

    /// A positional I/O call failed outright
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A page residency advisory call failed; the accessor stays usable
    #[error("Page residency advice failed: {source}")]
    Advice {
        #[source]
        source: std::io::Error,
    },

    /// Record geometry cannot describe a file
    #[error("Invalid record geometry: {message}")]
    InvalidGeometry { message: String },

    /// File length does not match `record_size * record_count`
    #[error("File {path} is {actual} bytes, geometry requires {expected}")]
    GeometryMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Standard Result type for recfile operations.
pub type Result<T> = std::result::Result<T, RecfileError>;

impl RecfileError {
    /// Create an OpenFailure for the given path
    pub fn open_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFailure {
            path: path.into(),
            source,
        }
    }

    /// Create a MappingFailure for the given path
    pub fn mapping_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MappingFailure {
            path: path.into(),
            source,
        }
    }

    /// Create an Io error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidGeometry error with a descriptive message
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
