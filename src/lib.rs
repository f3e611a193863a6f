//! # zcomp
//!
//! Pluggable compression backends with bounded work-memory pools for
//! compressed RAM block devices.
//!
//! This is the workspace root crate that re-exports core functionality.
//! For direct usage, depend on individual sub-crates:
//!
//! - [`zcomp-core`] - Work buffer pool, algorithm registry, LZO and LZ4
//! - [`zcomp-cli`] - CLI tool (`zcomp` binary)
//!
//! ## Feature Flags
//!
//! - `lzo` (default) - Compile the LZO algorithm into the registry
//! - `lz4` (default) - Compile the LZ4 algorithm into the registry

pub use zcomp_core::*;
