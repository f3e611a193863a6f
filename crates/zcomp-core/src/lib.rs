//! Compression backends for compressed RAM block devices.
//!
//! A device picks one algorithm by name from a table fixed at compile time,
//! then compresses pages using work buffers lent from a bounded pool.
//! Callers that find the pool empty sleep until a buffer is given back.
//!
//! # Example
//!
//! ```
//! use zcomp_core::{registry, PAGE_SIZE};
//!
//! let backend = registry::create("lz4").unwrap();
//! assert_eq!(registry::available_show(Some(&backend)), "lzo <lz4> \n");
//!
//! let page = [7u8; PAGE_SIZE];
//! let mut wm = backend.workmem_get();
//! let len = backend.compress_to_staging(&page, &mut wm).unwrap();
//!
//! let mut restored = [0u8; PAGE_SIZE];
//! backend.decompress(&wm.staging()[..len], &mut restored).unwrap();
//! backend.workmem_put(wm);
//! assert_eq!(page, restored);
//!
//! registry::destroy(backend);
//! ```

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod backend;
pub mod config;
mod error;
#[cfg(feature = "lz4")]
pub mod lz4;
#[cfg(feature = "lzo")]
pub mod lzo;
mod match_table;
pub mod registry;
mod sink;
mod stats;
pub mod workmem;

pub use backend::{Backend, BackendBuilder, CompressBackend, CreateFn, PoolSpec};
pub use config::{load_config, ZcompConfig};
pub use error::{Error, Result};
pub use registry::{available_show, create, create_with, destroy};
pub use stats::CompressionStats;
pub use workmem::{
    HeapAllocator, WorkBuffer, WorkBufferPool, WorkmemAllocator, WorkmemLease, WorkmemPolicy,
    STAGING_SIZE,
};

/// Size of a memory page in bytes.
pub const PAGE_SIZE: usize = 4096;
