//! LZO compression backend.
//!
//! Produces the LZO1X stream format: a sequence of literal runs and
//! back-references terminated by a three byte end marker. The decoder accepts
//! any well-formed LZO1X stream, including instruction forms the compressor
//! never emits.

mod compress;
mod decompress;

pub use compress::compress;
pub use decompress::decompress;

use crate::backend::{CompressBackend, PoolSpec};
use crate::match_table::MatchTable;
use crate::workmem::{WorkBufferPool, WorkmemPolicy};
use crate::Result;

/// Dictionary buckets used by the compressor.
pub(crate) const DICT_ENTRIES: usize = 1 << 13;

/// Scratch bytes one compression call needs.
pub const WORKMEM_SIZE: usize = MatchTable::bytes_for(DICT_ENTRIES);

/// Worst-case compressed size for `len` input bytes.
#[must_use]
pub const fn compress_bound(len: usize) -> usize {
    len + len / 16 + 64 + 3
}

/// LZO1X stream constants.
pub mod constants {
    /// Minimum match length the compressor looks for.
    pub const MIN_MATCH: usize = 4;
    /// Inputs no longer than this are stored as literals.
    pub const MIN_INPUT: usize = 20;
    /// Longest match encodable as a two byte M2 instruction.
    pub const M2_MAX_LEN: usize = 8;
    /// Farthest distance reachable by an M2 instruction.
    pub const M2_MAX_OFFSET: usize = 0x0800;
    /// Longest M3 match without an extension.
    pub const M3_MAX_LEN: usize = 33;
    /// Farthest distance reachable by an M3 instruction.
    pub const M3_MAX_OFFSET: usize = 0x4000;
    /// Instruction bits selecting an M3 match.
    pub const M3_MARKER: u8 = 32;
    /// Terminates every stream.
    pub const EOS_MARKER: [u8; 3] = [17, 0, 0];
}

/// LZO with a pool of pre-allocated work buffers.
#[derive(Debug)]
pub struct LzoBackend {
    pool: WorkBufferPool,
}

impl CompressBackend for LzoBackend {
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
    Ok(Box::new(LzoBackend { pool }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, PAGE_SIZE};

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
    fn test_roundtrip_sequential() {
        let input: Vec<u8> = (0..PAGE_SIZE).map(|i| (i % 256) as u8).collect();
        roundtrip(&input);
    }

    #[test]
    fn test_roundtrip_short_inputs() {
        for len in 0..=48 {
            let input: Vec<u8> = (0..len).map(|i| (i * 3 % 7) as u8).collect();
            roundtrip(&input);
        }
    }

    #[test]
    fn test_roundtrip_long_literal_run() {
        // Incompressible prefix longer than the single-byte start encoding.
        let mut input = Vec::with_capacity(PAGE_SIZE);
        let mut state = 7u32;
        for _ in 0..600 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            input.push((state >> 16) as u8);
        }
        input.extend(std::iter::repeat(b'z').take(PAGE_SIZE - 600));
        roundtrip(&input);
    }

    #[test]
    fn test_roundtrip_far_match() {
        // Repeat a block at a distance beyond the M2 window.
        let mut block = Vec::new();
        let mut state = 99u64;
        for _ in 0..3000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            block.push((state >> 40) as u8);
        }
        let mut input = block.clone();
        input.extend_from_slice(&block[..1096]);
        let clen = roundtrip(&input);
        assert!(clen < input.len());
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
    fn test_truncated_stream_rejected() {
        let input = [0xABu8; 512];
        let mut scratch = vec![0u8; WORKMEM_SIZE];
        let mut compressed = vec![0u8; compress_bound(input.len())];
        let clen = compress(&input, &mut compressed, &mut scratch).unwrap();

        let mut output = [0u8; 512];
        for cut in 0..clen {
            let result = decompress(&compressed[..cut], &mut output);
            assert!(matches!(result, Err(Error::CorruptedData(_))), "cut at {cut}");
        }
    }

    #[test]
    fn test_backend_staging_roundtrip() {
        let backend = crate::registry::create("lzo").unwrap();
        let input: Vec<u8> = (0..PAGE_SIZE).map(|i| (i / 64) as u8).collect();

        let mut lease = backend.lease();
        let clen = backend.compress_to_staging(&input, &mut lease).unwrap();
        let mut output = vec![0u8; PAGE_SIZE];
        let len = backend.decompress(&lease.staging()[..clen], &mut output).unwrap();
        drop(lease);

        assert_eq!(len, PAGE_SIZE);
        assert_eq!(input, output);
        crate::registry::destroy(backend);
    }
}
