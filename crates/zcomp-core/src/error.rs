//! Error types for zcomp-core.

use thiserror::Error;

/// Errors reported by pools, backends and the registry.
#[derive(Debug, Error)]
pub enum Error {
    /// No compiled-in algorithm matches the requested name.
    #[error("unsupported compression algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// Work memory could not be allocated.
    #[error("allocation of {requested} bytes failed")]
    Allocation {
        /// Bytes requested from the allocator.
        requested: usize,
    },

    /// Compressed data is corrupted or truncated.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// Output buffer is too small.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// Configuration value out of range or unparseable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (configuration file access).
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Whether this error came from the algorithm itself rather than from
    /// setup or lookup.
    #[must_use]
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::CorruptedData(_) | Self::BufferTooSmall { .. })
    }
}

/// Result type for zcomp operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported() {
        let err = Error::UnsupportedAlgorithm("deflate".to_string());
        let msg = err.to_string();
        assert!(msg.contains("unsupported"));
        assert!(msg.contains("deflate"));
    }

    #[test]
    fn test_error_display_allocation() {
        let err = Error::Allocation { requested: 8192 };
        assert!(err.to_string().contains("8192"));
    }

    #[test]
    fn test_error_display_buffer_too_small() {
        let err = Error::BufferTooSmall {
            needed: 4096,
            available: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("4096"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_codec_error_classification() {
        assert!(Error::CorruptedData("bad offset".to_string()).is_codec_error());
        assert!(Error::BufferTooSmall { needed: 2, available: 1 }.is_codec_error());
        assert!(!Error::Allocation { requested: 1 }.is_codec_error());
        assert!(!Error::UnsupportedAlgorithm("x".to_string()).is_codec_error());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + std::error::Error>() {}
        assert_send_sync::<Error>();
    }
}
