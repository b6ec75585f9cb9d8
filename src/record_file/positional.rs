//! Positional I/O record accessors
//!
//! Every record transfer is one explicit-offset system call (`pread`/`pwrite` on
//! Unix). The file cursor is never consulted, and nothing is cached between calls.

use crate::error::{RecfileError, Result, TransferKind};
use crate::record_file::accessor::{RecordReader, RecordWriter};
use crate::record_file::geometry::RecordGeometry;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::write_at(file, buf, offset)
}

// seek_read/seek_write move the cursor on Windows; nothing here depends on it.
#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_write(file, buf, offset)
}

/// Read until `buf` is full or end of file, returning the bytes obtained
///
/// Reaching end of file is not an error here; the caller decides whether the
/// count it got back is a full record.
fn read_full_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn write_full_at(file: &File, data: &[u8], offset: u64) -> io::Result<usize> {
    let mut written = 0;
    while written < data.len() {
        match write_at(file, &data[written..], offset + written as u64) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}

/// Shared read path of both positional accessors
fn read_record_into<'a>(
    file: &File,
    geometry: &RecordGeometry,
    index: u64,
    buf: &'a mut [u8],
) -> Result<&'a [u8]> {
    let offset = geometry.byte_offset(index)?;
    let record_size = geometry.record_size();

    if buf.len() < record_size {
        return Err(RecfileError::BufferTooSmall {
            needed: record_size,
            actual: buf.len(),
        });
    }

    let record = &mut buf[..record_size];
    let n = read_full_at(file, record, offset).map_err(|e| {
        RecfileError::io(format!("Failed to read at offset {}", offset), e)
    })?;

    if n != record_size {
        return Err(RecfileError::PartialTransfer {
            operation: TransferKind::Read,
            offset,
            expected: record_size,
            actual: n,
        });
    }

    Ok(record)
}

/// Record reader backed by positional reads on a read-only handle
#[derive(Debug)]
pub struct PositionalReader {
    file: File,
    geometry: RecordGeometry,
    path: PathBuf,
}

impl PositionalReader {
    /// Open `path` read-only
    ///
    /// No size check happens here; records past the end of a short file fail
    /// individually with `PartialTransfer`.
    pub fn open(path: impl AsRef<Path>, geometry: RecordGeometry) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RecfileError::open_failure(path, e))?;

        debug!("opened {} for positional reads", path.display());

        Ok(Self {
            file,
            geometry,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordReader for PositionalReader {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    fn read_record<'a>(&'a self, index: u64, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        read_record_into(&self.file, &self.geometry, index, buf)
    }

    fn close(self) -> Result<()> {
        debug!("closing positional reader for {}", self.path.display());
        drop(self.file);
        Ok(())
    }
}

/// Record writer backed by positional writes on a read-write handle
///
/// The handle is also readable, so the writer doubles as a reader.
#[derive(Debug)]
pub struct PositionalWriter {
    file: File,
    geometry: RecordGeometry,
    path: PathBuf,
}

impl PositionalWriter {
    /// Open an existing file at `path` for reading and writing
    pub fn open(path: impl AsRef<Path>, geometry: RecordGeometry) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| RecfileError::open_failure(path, e))?;

        debug!("opened {} for positional writes", path.display());

        Ok(Self {
            file,
            geometry,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordWriter for PositionalWriter {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    fn write_record(&mut self, index: u64, data: &[u8]) -> Result<()> {
        let offset = self.geometry.byte_offset(index)?;
        let record_size = self.geometry.record_size();

        if data.len() != record_size {
            return Err(RecfileError::SizeMismatch {
                expected: record_size,
                actual: data.len(),
            });
        }

        let n = write_full_at(&self.file, data, offset).map_err(|e| {
            RecfileError::io(format!("Failed to write at offset {}", offset), e)
        })?;

        if n != record_size {
            return Err(RecfileError::PartialTransfer {
                operation: TransferKind::Write,
                offset,
                expected: record_size,
                actual: n,
            });
        }

        Ok(())
    }

    fn close(self) -> Result<()> {
        debug!("closing positional writer for {}", self.path.display());
        drop(self.file);
        Ok(())
    }
}

impl RecordReader for PositionalWriter {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    fn read_record<'a>(&'a self, index: u64, buf: &'a mut [u8]) -> Result<&'a [u8]> {
        read_record_into(&self.file, &self.geometry, index, buf)
    }

    fn close(self) -> Result<()> {
        RecordWriter::close(self)
    }
}
