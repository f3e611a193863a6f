//! Work memory lent to compression calls.
//!
//! A [`WorkBuffer`] pairs an algorithm-specific scratch area with a staging
//! area large enough to hold the compressed form of one page even when it
//! expands. Buffers are created by a [`WorkBufferPool`] and moved in and out
//! of it by value, so a buffer that has been released cannot be touched by
//! its previous holder.

mod pool;

pub use pool::{WorkBufferPool, WorkmemLease, WorkmemPolicy};

use crate::{Error, Result, PAGE_SIZE};
use std::fmt;

/// Size of the staging area of every work buffer.
///
/// One page for the compressed data plus one more for the case where the
/// compressed form is larger than the original.
pub const STAGING_SIZE: usize = 2 * PAGE_SIZE;

/// Source of the contiguous regions backing work buffers.
pub trait WorkmemAllocator: Send + Sync + fmt::Debug {
    /// Allocate `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] when the memory is unavailable.
    fn alloc(&self, len: usize) -> Result<Box<[u8]>>;

    /// Return a region obtained from [`WorkmemAllocator::alloc`].
    fn free(&self, region: Box<[u8]>) {
        drop(region);
    }
}

/// Default allocator backed by the global heap.
///
/// Allocation failure is reported as an error instead of aborting.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl WorkmemAllocator for HeapAllocator {
    fn alloc(&self, len: usize) -> Result<Box<[u8]>> {
        let mut region = Vec::new();
        region
            .try_reserve_exact(len)
            .map_err(|_| Error::Allocation { requested: len })?;
        region.resize(len, 0);
        Ok(region.into_boxed_slice())
    }
}

/// Scratch memory held by exactly one caller at a time.
pub struct WorkBuffer {
    /// Algorithm working area.
    mem: Box<[u8]>,
    /// Compression staging area, `STAGING_SIZE` bytes.
    buf: Box<[u8]>,
}

impl WorkBuffer {
    /// Allocate both areas, returning the first to `allocator` if the
    /// second cannot be had.
    pub(crate) fn alloc(allocator: &dyn WorkmemAllocator, workmem_size: usize) -> Result<Self> {
        let mem = allocator.alloc(workmem_size)?;
        let buf = match allocator.alloc(STAGING_SIZE) {
            Ok(buf) => buf,
            Err(e) => {
                allocator.free(mem);
                return Err(e);
            }
        };
        Ok(Self { mem, buf })
    }

    pub(crate) fn free(self, allocator: &dyn WorkmemAllocator) {
        allocator.free(self.buf);
        allocator.free(self.mem);
    }

    /// Algorithm working area.
    #[must_use]
    pub fn mem(&self) -> &[u8] {
        &self.mem
    }

    /// Mutable algorithm working area.
    pub fn mem_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    /// Staging area for compressed output.
    #[must_use]
    pub fn staging(&self) -> &[u8] {
        &self.buf
    }

    /// Mutable staging area.
    pub fn staging_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Borrow the working area and the staging area at the same time.
    pub fn split_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.mem, &mut self.buf)
    }
}

impl fmt::Debug for WorkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkBuffer")
            .field("mem_len", &self.mem.len())
            .field("buf_len", &self.buf.len())
            .finish()
    }
}
