//! Memory-mapped record accessors
//!
//! The whole file is mapped into the process address space once, at construction.
//! Reads hand out views straight into the mapping and writes are plain memory
//! stores; page faults move the data between memory and storage.

use crate::error::{RecfileError, Result};
use crate::record_file::accessor::{PageResidency, RecordReader, RecordWriter};
use crate::record_file::geometry::RecordGeometry;
use log::{debug, warn};
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Page granularity assumed when warming a mapping
pub const PAGE_SIZE: usize = 4096;

/// Open `path` and report its length as a mappable size
fn open_for_mapping(path: &Path, writable: bool) -> Result<(File, usize)> {
    let file = OpenOptions::new()
        .read(true)
        .write(writable)
        .open(path)
        .map_err(|e| RecfileError::open_failure(path, e))?;

    let len = file
        .metadata()
        .map_err(|e| RecfileError::open_failure(path, e))?
        .len();

    // On error the handle is dropped, and therefore closed, on the way out
    let len = usize::try_from(len).map_err(|_| {
        RecfileError::mapping_failure(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("file of {} bytes exceeds the address space", len),
            ),
        )
    })?;

    Ok((file, len))
}

/// Byte range of record `index` inside a mapping of `mapping_len` bytes
fn mapped_span(
    geometry: &RecordGeometry,
    index: u64,
    mapping_len: usize,
) -> Result<Range<usize>> {
    let offset = geometry.byte_offset(index)?;
    let bounds_exceeded = || RecfileError::BoundsExceeded {
        index,
        offset,
        mapping_len,
    };

    let start = usize::try_from(offset).map_err(|_| bounds_exceeded())?;
    let end = start
        .checked_add(geometry.record_size())
        .ok_or_else(bounds_exceeded)?;

    if end > mapping_len {
        return Err(bounds_exceeded());
    }

    Ok(start..end)
}

/// Record reader over a private, read-only mapping of the whole file
#[derive(Debug)]
pub struct MappedReader {
    // Field order is drop order: the mapping goes before the handle
    mmap: Mmap,
    file: File,
    geometry: RecordGeometry,
    path: PathBuf,
}

impl MappedReader {
    /// Open `path` read-only and map its full length
    ///
    /// # Performance
    /// * O(1) - only sets up the mapping; pages load on first access
    pub fn open(path: impl AsRef<Path>, geometry: RecordGeometry) -> Result<Self> {
        let path = path.as_ref();
        let (file, len) = open_for_mapping(path, false)?;

        // SAFETY: the mapping is private and read-only. Concurrent modification of
        // the file by another process is outside the supported usage model.
        let mmap = unsafe {
            MmapOptions::new()
                .len(len)
                .map_copy_read_only(&file)
                .map_err(|e| RecfileError::mapping_failure(path, e))?
        };

        // Record lookups jump around; non-fatal if the kernel refuses the hint
        #[cfg(unix)]
        {
            if let Err(e) = mmap.advise(memmap2::Advice::Random) {
                warn!("Failed to set mmap advice for {}: {}", path.display(), e);
            }
        }

        debug!("mapped {} bytes of {} read-only", len, path.display());

        Ok(Self {
            mmap,
            file,
            geometry,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the mapping in bytes
    pub fn mapping_len(&self) -> usize {
        self.mmap.len()
    }
}

impl RecordReader for MappedReader {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    /// Zero-copy: `_buf` is accepted for symmetry with the positional reader
    fn read_record<'a>(&'a self, index: u64, _buf: &'a mut [u8]) -> Result<&'a [u8]> {
        let span = mapped_span(&self.geometry, index, self.mmap.len())?;
        Ok(&self.mmap[span])
    }

    fn close(self) -> Result<()> {
        debug!("unmapping {}", self.path.display());
        drop(self.mmap);
        drop(self.file);
        Ok(())
    }
}

/// Record writer over a shared, read-write mapping of the whole file
///
/// Stores into the mapping are visible to every other mapping of the file and
/// reach the file itself when the kernel writes the dirty pages back. Nothing
/// here forces that write-back.
#[derive(Debug)]
pub struct MappedWriter {
    mmap: MmapMut,
    file: File,
    geometry: RecordGeometry,
    path: PathBuf,
}

impl MappedWriter {
    /// Open an existing file at `path` read-write and map its full length shared
    pub fn open(path: impl AsRef<Path>, geometry: RecordGeometry) -> Result<Self> {
        let path = path.as_ref();
        let (file, len) = open_for_mapping(path, true)?;

        // SAFETY: the writer owns the mapping exclusively and only one writer per
        // file is supported; callers must not truncate the file while it is mapped.
        let mmap = unsafe {
            MmapOptions::new()
                .len(len)
                .map_mut(&file)
                .map_err(|e| RecfileError::mapping_failure(path, e))?
        };

        debug!("mapped {} bytes of {} read-write", len, path.display());

        Ok(Self {
            mmap,
            file,
            geometry,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the mapping in bytes
    pub fn mapping_len(&self) -> usize {
        self.mmap.len()
    }
}

impl RecordWriter for MappedWriter {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    fn write_record(&mut self, index: u64, data: &[u8]) -> Result<()> {
        self.geometry.check_index(index)?;

        let record_size = self.geometry.record_size();
        if data.len() != record_size {
            return Err(RecfileError::SizeMismatch {
                expected: record_size,
                actual: data.len(),
            });
        }

        let span = mapped_span(&self.geometry, index, self.mmap.len())?;
        self.mmap[span].copy_from_slice(data);
        Ok(())
    }

    fn close(self) -> Result<()> {
        debug!("unmapping {}", self.path.display());
        drop(self.mmap);
        drop(self.file);
        Ok(())
    }
}

impl RecordReader for MappedWriter {
    fn geometry(&self) -> RecordGeometry {
        self.geometry
    }

    fn read_record<'a>(&'a self, index: u64, _buf: &'a mut [u8]) -> Result<&'a [u8]> {
        let span = mapped_span(&self.geometry, index, self.mmap.len())?;
        Ok(&self.mmap[span])
    }

    fn close(self) -> Result<()> {
        RecordWriter::close(self)
    }
}

impl PageResidency for MappedWriter {
    #[cfg(unix)]
    fn evict_pages(&self) -> Result<()> {
        debug!("evicting {} mapped bytes of {}", self.mmap.len(), self.path.display());

        // SAFETY: MADV_DONTNEED on a shared file mapping only drops page table
        // entries. Dirty data stays in the page cache and is faulted back in with
        // the same contents on the next access.
        unsafe {
            self.mmap
                .unchecked_advise(memmap2::UncheckedAdvice::DontNeed)
                .map_err(|source| RecfileError::Advice { source })
        }
    }

    #[cfg(not(unix))]
    fn evict_pages(&self) -> Result<()> {
        debug!("page eviction unsupported on this platform, skipping");
        Ok(())
    }

    fn warm_pages(&self) {
        debug!("warming {} mapped bytes of {}", self.mmap.len(), self.path.display());

        let base = self.mmap.as_ptr();
        for offset in (0..self.mmap.len()).step_by(PAGE_SIZE) {
            // SAFETY: offset < len, so the pointer is inside the live mapping.
            // The volatile read keeps the touch from being optimised away.
            unsafe {
                std::ptr::read_volatile(base.add(offset));
            }
        }
    }
}
