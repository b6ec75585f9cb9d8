//! Core record access abstraction.
//!
//! This module defines the capability traits shared by the positional and the
//! memory-mapped backends. Collaborators program against these traits and pick
//! a backend when they construct it.

use crate::error::Result;
use crate::record_file::geometry::RecordGeometry;

/// Read capability over a fixed-size record file
///
/// Accessors are single-threaded: no internal locking exists and calls may block
/// the calling thread on storage I/O or page-fault service.
pub trait RecordReader {
    /// Geometry this accessor was opened with
    fn geometry(&self) -> RecordGeometry;

    /// Read record `index`
    ///
    /// # Arguments
    /// * `index` - Record index in `[0, record_count)`
    /// * `buf` - Destination storage. The positional backend fills it and needs at
    ///   least `record_size` bytes; the mapped backend ignores it.
    ///
    /// # Returns
    /// * Exactly `record_size` bytes, either the filled prefix of `buf` or a view
    ///   straight into the mapping. The view borrows the accessor, so it cannot
    ///   outlive `close` or an overlapping `write_record`.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - checked before any I/O
    /// * `BufferTooSmall` - positional backend only
    /// * `PartialTransfer` / `BoundsExceeded` - file shorter than its geometry
    fn read_record<'a>(&'a self, index: u64, buf: &'a mut [u8]) -> Result<&'a [u8]>;

    /// Read record `index` into a freshly allocated buffer
    ///
    /// The copy detaches the result from the accessor's lifetime, trading the
    /// zero-copy read for a value that can be kept around.
    fn read_record_owned(&self, index: u64) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.geometry().record_size()];
        let record = self.read_record(index, &mut buf)?.to_vec();
        Ok(record)
    }

    /// Release the accessor's resources
    ///
    /// Taking `self` by value ends every outstanding view first. Mapped accessors
    /// unmap before closing the handle.
    ///
    /// # Errors
    /// Teardown failures are not observable: the mapping and the file handle are
    /// released by their `Drop` implementations, which swallow `munmap` and `close`
    /// errors. Every backend therefore returns `Ok(())`.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Write capability over a fixed-size record file
pub trait RecordWriter {
    /// Geometry this accessor was opened with
    fn geometry(&self) -> RecordGeometry;

    /// Overwrite record `index` with `data`
    ///
    /// # Errors
    /// * `IndexOutOfRange` - checked before any I/O
    /// * `SizeMismatch` - `data.len() != record_size`
    /// * `PartialTransfer` / `BoundsExceeded` - file shorter than its geometry
    ///
    /// # Durability
    /// None is promised. The bytes reach storage whenever the operating system
    /// writes them back.
    fn write_record(&mut self, index: u64, data: &[u8]) -> Result<()>;

    /// Release the accessor's resources
    ///
    /// As with [`RecordReader::close`], teardown failures are not observable and
    /// the result is always `Ok(())`.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Page residency control for a write-capable mapping
///
/// Diagnostic only: these calls manufacture cold or warm page conditions for
/// measurements and are never needed for correct record access.
pub trait PageResidency {
    /// Ask the operating system to drop the resident pages backing the mapping,
    /// so the next access to any page faults
    ///
    /// Failure is reported but leaves the accessor fully usable. On platforms
    /// without the primitive this is a no-op.
    fn evict_pages(&self) -> Result<()>;

    /// Touch one byte per page across the whole mapping so every page is resident
    fn warm_pages(&self);
}
