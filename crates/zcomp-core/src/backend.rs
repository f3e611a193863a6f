//! Per-device compression frontend.
//!
//! A [`Backend`] binds one compiled-in algorithm to the work memory it needs.
//! The device layer obtains one from [`crate::registry::create`], borrows a
//! work buffer per I/O, compresses or decompresses, and gives the buffer
//! back.

use crate::config::ZcompConfig;
use crate::stats::{CompressionStats, StatCounters};
use crate::workmem::{HeapAllocator, WorkBuffer, WorkBufferPool, WorkmemAllocator, WorkmemLease, WorkmemPolicy};
use crate::{registry, Result};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Operations every compiled-in algorithm provides.
pub trait CompressBackend: Send + Sync {
    /// Compress `src` into `dst`, returning the number of bytes written.
    ///
    /// `scratch` is the working area of a buffer obtained from
    /// [`CompressBackend::workmem`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BufferTooSmall`] if `dst` cannot hold the
    /// output.
    fn compress(&self, src: &[u8], dst: &mut [u8], scratch: &mut [u8]) -> Result<usize>;

    /// Decompress `src` into `dst`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CorruptedData`] on malformed input and
    /// [`crate::Error::BufferTooSmall`] if `dst` is too short.
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize>;

    /// Work memory get/put discipline for this algorithm.
    fn workmem(&self) -> &dyn WorkmemPolicy;

    /// Release algorithm state and work memory.
    fn destroy(&mut self);
}

/// Constructor signature stored in the registry.
pub type CreateFn = fn(&PoolSpec) -> Result<Box<dyn CompressBackend>>;

/// Work memory parameters handed to an algorithm constructor.
#[derive(Debug, Clone)]
pub struct PoolSpec {
    /// Buffers to pre-allocate.
    pub buffers: NonZeroUsize,
    /// Allocator for the buffer regions.
    pub allocator: Arc<dyn WorkmemAllocator>,
}

impl PoolSpec {
    /// Build a pool whose buffers have a `workmem_size` byte working area.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Allocation`] if the buffers cannot be allocated.
    pub fn build_pool(&self, workmem_size: usize) -> Result<WorkBufferPool> {
        WorkBufferPool::with_allocator(workmem_size, self.buffers, Arc::clone(&self.allocator))
    }
}

impl Default for PoolSpec {
    fn default() -> Self {
        Self {
            buffers: NonZeroUsize::MIN,
            allocator: Arc::new(HeapAllocator),
        }
    }
}

/// A live compression backend owned by one device.
pub struct Backend {
    name: &'static str,
    ops: Box<dyn CompressBackend>,
    stats: StatCounters,
}

impl Backend {
    pub(crate) fn new(name: &'static str, ops: Box<dyn CompressBackend>) -> Self {
        Self {
            name,
            ops,
            stats: StatCounters::default(),
        }
    }

    /// Algorithm name as listed in the registry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Compress `src` into `dst` using `wm` as scratch.
    ///
    /// # Errors
    ///
    /// Propagates the algorithm's error unchanged.
    pub fn compress(&self, src: &[u8], dst: &mut [u8], wm: &mut WorkBuffer) -> Result<usize> {
        let result = self.ops.compress(src, dst, wm.mem_mut());
        self.stats.record_compress(src.len(), &result);
        result
    }

    /// Compress `src` into the staging area of `wm`.
    ///
    /// The compressed bytes are `wm.staging()[..len]`.
    ///
    /// # Errors
    ///
    /// Propagates the algorithm's error unchanged.
    pub fn compress_to_staging(&self, src: &[u8], wm: &mut WorkBuffer) -> Result<usize> {
        let (mem, buf) = wm.split_mut();
        let result = self.ops.compress(src, buf, mem);
        self.stats.record_compress(src.len(), &result);
        result
    }

    /// Decompress `src` into `dst`.
    ///
    /// # Errors
    ///
    /// Propagates the algorithm's error unchanged.
    pub fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let result = self.ops.decompress(src, dst);
        self.stats.record_decompress(&result);
        result
    }

    /// Borrow a work buffer, waiting until one is free.
    #[must_use]
    pub fn workmem_get(&self) -> WorkBuffer {
        self.ops.workmem().get()
    }

    /// Give back a buffer obtained from [`Backend::workmem_get`].
    pub fn workmem_put(&self, wm: WorkBuffer) {
        self.ops.workmem().put(wm);
    }

    /// Borrow a work buffer that is given back when the lease drops.
    #[must_use]
    pub fn lease(&self) -> WorkmemLease<'_> {
        WorkmemLease::new(self.ops.workmem())
    }

    /// Work buffer requests that found none idle.
    #[must_use]
    pub fn contended(&self) -> u64 {
        self.ops.workmem().contended()
    }

    /// Snapshot of this backend's counters.
    #[must_use]
    pub fn stats(&self) -> CompressionStats {
        self.stats.snapshot()
    }

    /// Zero this backend's counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Run the algorithm's destroy hook and drop the backend.
    pub fn destroy(mut self) {
        self.ops.destroy();
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Backend`].
#[derive(Debug, Clone)]
pub struct BackendBuilder {
    algorithm: String,
    spec: PoolSpec,
}

impl BackendBuilder {
    /// Start building a backend for `algorithm`.
    #[must_use]
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            spec: PoolSpec::default(),
        }
    }

    /// Start from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is invalid.
    pub fn from_config(config: &ZcompConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.algorithm.clone()).buffers(config.buffer_count()?))
    }

    /// Number of work buffers to pre-allocate.
    #[must_use]
    pub fn buffers(mut self, buffers: NonZeroUsize) -> Self {
        self.spec.buffers = buffers;
        self
    }

    /// Allocator for work buffer regions.
    #[must_use]
    pub fn allocator(mut self, allocator: Arc<dyn WorkmemAllocator>) -> Self {
        self.spec.allocator = allocator;
        self
    }

    /// Look up the algorithm and create the backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedAlgorithm`] for unknown names and
    /// [`crate::Error::Allocation`] if work memory cannot be allocated.
    pub fn build(self) -> Result<Backend> {
        registry::create_with(&self.algorithm, &self.spec)
    }
}
