//! Per-backend compression counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a backend's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Successful compress calls.
    pub compressed: u64,
    /// Compress calls the algorithm rejected.
    pub compress_failures: u64,
    /// Successful decompress calls.
    pub decompressed: u64,
    /// Decompress calls the algorithm rejected.
    pub decompress_failures: u64,
    /// Bytes fed to successful compress calls.
    pub bytes_in: u64,
    /// Bytes produced by successful compress calls.
    pub bytes_out: u64,
}

impl CompressionStats {
    /// Overall compression ratio (input / output).
    ///
    /// Returns 1.0 before anything has been compressed.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.bytes_out == 0 {
            return 1.0;
        }
        self.bytes_in as f64 / self.bytes_out as f64
    }

    /// Bytes saved by compression.
    #[must_use]
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_in.saturating_sub(self.bytes_out)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    compressed: AtomicU64,
    compress_failures: AtomicU64,
    decompressed: AtomicU64,
    decompress_failures: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
}

impl StatCounters {
    pub(crate) fn record_compress(&self, src_len: usize, result: &crate::Result<usize>) {
        match result {
            Ok(out_len) => {
                self.compressed.fetch_add(1, Ordering::Relaxed);
                self.bytes_in.fetch_add(src_len as u64, Ordering::Relaxed);
                self.bytes_out.fetch_add(*out_len as u64, Ordering::Relaxed);
            }
            Err(_) => {
                self.compress_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn record_decompress(&self, result: &crate::Result<usize>) {
        let counter = if result.is_ok() {
            &self.decompressed
        } else {
            &self.decompress_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CompressionStats {
        CompressionStats {
            compressed: self.compressed.load(Ordering::Relaxed),
            compress_failures: self.compress_failures.load(Ordering::Relaxed),
            decompressed: self.decompressed.load(Ordering::Relaxed),
            decompress_failures: self.decompress_failures.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.compressed.store(0, Ordering::Relaxed);
        self.compress_failures.store(0, Ordering::Relaxed);
        self.decompressed.store(0, Ordering::Relaxed);
        self.decompress_failures.store(0, Ordering::Relaxed);
        self.bytes_in.store(0, Ordering::Relaxed);
        self.bytes_out.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_ratio_default() {
        let stats = CompressionStats::default();
        assert!((stats.ratio() - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.bytes_saved(), 0);
    }

    #[test]
    fn test_ratio() {
        let stats = CompressionStats {
            bytes_in: 4096,
            bytes_out: 1024,
            ..Default::default()
        };
        assert!((stats.ratio() - 4.0).abs() < 0.001);
        assert_eq!(stats.bytes_saved(), 3072);
    }

    #[test]
    fn test_bytes_saved_expansion() {
        let stats = CompressionStats {
            bytes_in: 100,
            bytes_out: 120,
            ..Default::default()
        };
        assert_eq!(stats.bytes_saved(), 0);
    }

    #[test]
    fn test_counters_record_and_reset() {
        let counters = StatCounters::default();
        counters.record_compress(4096, &Ok(100));
        counters.record_compress(4096, &Err(Error::BufferTooSmall { needed: 2, available: 1 }));
        counters.record_decompress(&Ok(4096));
        counters.record_decompress(&Err(Error::CorruptedData("x".to_string())));

        let stats = counters.snapshot();
        assert_eq!(stats.compressed, 1);
        assert_eq!(stats.compress_failures, 1);
        assert_eq!(stats.decompressed, 1);
        assert_eq!(stats.decompress_failures, 1);
        assert_eq!(stats.bytes_in, 4096);
        assert_eq!(stats.bytes_out, 100);

        counters.reset();
        assert_eq!(counters.snapshot(), CompressionStats::default());
    }
}
