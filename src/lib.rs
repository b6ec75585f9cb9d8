//! # recfile - Fixed-Size Record File Access
//!
//! Random access to fixed-size records in a flat binary file through two
//! interchangeable strategies: positional system calls and memory mapping.
//!
//! ## Features
//!
//! - **Positional I/O**: one `pread`/`pwrite` per record, caller-owned buffers
//! - **Memory Mapping**: zero-copy record views and store-based writes
//! - **Page Residency Control**: evict or warm a writable mapping for measurements
//! - **Explicit Geometry**: record size and count travel with each accessor
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`record_file`] - Record geometry, capability traits and both backends
//! - [`corpus`] - Deterministic corpus and access-pattern generation
//! - `config` - TOML configuration (`config` feature)

// Core modules
pub mod error;
pub mod record_file;

// Supporting tools
pub mod corpus;

#[cfg(feature = "config")]
pub mod config;

// Re-export commonly used types for convenience
pub use error::{RecfileError, Result};

// Public API surface for external usage
pub use record_file::{
    AccessStrategy, AnyReader, AnyWriter, MappedReader, MappedWriter, PageResidency,
    PositionalReader, PositionalWriter, RecordFileFactory, RecordGeometry, RecordReader,
    RecordWriter,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
