//! LZ4 compression backend.
//!
//! Pure Rust implementation of the LZ4 block format as specified in
//! <https://github.com/lz4/lz4/blob/dev/doc/lz4_Block_format.md>.

mod compress;
mod decompress;

pub use compress::compress;
pub use decompress::decompress;

use crate::backend::{CompressBackend, PoolSpec};
use crate::match_table::MatchTable;
use crate::workmem::{WorkBufferPool, WorkmemPolicy};
use crate::Result;

/// Hash table buckets used by the compressor.
pub(crate) const HASH_ENTRIES: usize = 1 << 12;

/// Scratch bytes one compression call needs.
pub const WORKMEM_SIZE: usize = MatchTable::bytes_for(HASH_ENTRIES);

/// Worst-case compressed size for `len` input bytes.
#[must_use]
pub const fn compress_bound(len: usize) -> usize {
    len + len / 255 + 16
}

/// LZ4 block format constants.
pub mod constants {
    /// Minimum match length.
    pub const MIN_MATCH: usize = 4;
    /// Maximum run before extension bytes, in either token nibble.
    pub const RUN_MASK: u8 = 15;
    /// Bytes at the end of a block that are always literals.
    pub const LAST_LITERALS: usize = 5;
    /// No match may start within this many bytes of the end.
    pub const MF_LIMIT: usize = 12;
    /// Maximum offset for matches.
    pub const MAX_DISTANCE: usize = 65535;
}

/// LZ4 with a pool of pre-allocated work buffers.
#[derive(Debug)]
pub struct Lz4Backend {
    pool: WorkBufferPool,
}

impl CompressBackend for Lz4Backend {
    fn compress(&self, src: &[u8], dst: &mut [u8], scratch: &mut [u8]) -> Result<usize> {
        compress(src, dst, scratch)
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        decompress(src, dst)
    }

    fn workmem(&self) -> &dyn WorkmemPolicy {
        &self.pool
    }

    fn destroy(&mut self) {
        self.pool.teardown();
    }
}

pub(crate) fn create(spec: &PoolSpec) -> Result<Box<dyn CompressBackend>> {
    let pool = spec.build_pool(WORKMEM_SIZE)?;
    Ok(Box::new(Lz4Backend { pool }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PAGE_SIZE;

    fn roundtrip(input: &[u8]) -> usize {
        let mut scratch = vec![0u8; WORKMEM_SIZE];
        let mut compressed = vec![0u8; compress_bound(input.len())];
        let clen = compress(input, &mut compressed, &mut scratch).unwrap();
        let mut output = vec![0u8; input.len()];
        let len = decompress(&compressed[..clen], &mut output).unwrap();
        assert_eq!(len, input.len());
        assert_eq!(input, output.as_slice());
        clen
    }

    #[test]
    fn test_roundtrip_zeros() {
        roundtrip(&[0u8; PAGE_SIZE]);
    }

    #[test]
    fn test_roundtrip_ones() {
        roundtrip(&[0xFFu8; PAGE_SIZE]);
    }

    #[test]
    fn test_roundtrip_sequential() {
        let input: Vec<u8> = (0..PAGE_SIZE).map(|i| (i % 256) as u8).collect();
        roundtrip(&input);
    }

    #[test]
    fn test_roundtrip_short_inputs() {
        for len in 0..=32 {
            let input: Vec<u8> = (0..len).map(|i| (i * 7 % 5) as u8).collect();
            roundtrip(&input);
        }
    }

    #[test]
    fn test_compression_ratio_pattern() {
        let pattern = b"Hello World! ";
        let input: Vec<u8> = (0..PAGE_SIZE).map(|i| pattern[i % pattern.len()]).collect();
        let clen = roundtrip(&input);
        let ratio = PAGE_SIZE as f64 / clen as f64;
        assert!(ratio > 5.0, "Expected ratio > 5x, got {ratio:.2}x");
    }

    #[test]
    fn test_incompressible_data() {
        let mut input = [0u8; PAGE_SIZE];
        let mut state = 12345u64;
        for byte in &mut input {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            *byte = (state >> 33) as u8;
        }
        let clen = roundtrip(&input);
        assert!(clen <= compress_bound(PAGE_SIZE));
    }

    #[test]
    fn test_backend_staging_roundtrip() {
        let backend = crate::registry::create("lz4").unwrap();
        let input = [0x5Au8; PAGE_SIZE];

        let mut wm = backend.workmem_get();
        let clen = backend.compress_to_staging(&input, &mut wm).unwrap();
        let mut output = [0u8; PAGE_SIZE];
        let len = backend.decompress(&wm.staging()[..clen], &mut output).unwrap();
        backend.workmem_put(wm);

        assert_eq!(len, PAGE_SIZE);
        assert_eq!(input, output);
        crate::registry::destroy(backend);
    }
}
