//! Backend configuration.

use crate::{registry, Error, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/zcomp.conf";

/// Settings for one compression backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZcompConfig {
    /// Compression algorithm name. Defaults to the first compiled-in
    /// algorithm.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Work buffers to pre-allocate (at least 1).
    #[serde(default = "default_buffers")]
    pub buffers: usize,
}

fn default_algorithm() -> String {
    registry::default_algorithm().to_string()
}

fn default_buffers() -> usize {
    1
}

impl Default for ZcompConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            buffers: default_buffers(),
        }
    }
}

impl ZcompConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the document does not parse or
    /// fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check that the algorithm is compiled in and the buffer count is
    /// positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if registry::find(&self.algorithm).is_none() {
            return Err(Error::InvalidConfig(format!(
                "unknown algorithm {:?}, available: {}",
                self.algorithm,
                registry::algorithms().collect::<Vec<_>>().join(", ")
            )));
        }
        self.buffer_count().map(|_| ())
    }

    /// Buffer count as a non-zero value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `buffers` is zero.
    pub fn buffer_count(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.buffers)
            .ok_or_else(|| Error::InvalidConfig("buffers must be at least 1".to_string()))
    }
}

/// Load configuration from [`DEFAULT_CONFIG_PATH`], falling back to defaults
/// when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<ZcompConfig> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.is_file() {
        return ZcompConfig::load(path);
    }
    Ok(ZcompConfig::default())
}

#[cfg(all(test, feature = "lzo", feature = "lz4"))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ZcompConfig::default();
        assert_eq!(config.algorithm, "lzo");
        assert_eq!(config.buffers, 1);
    }

    #[test]
    fn test_parse_config() {
        let config = ZcompConfig::from_toml_str(
            r#"
            algorithm = "lz4"
            buffers = 4
        "#,
        )
        .unwrap();
        assert_eq!(config.algorithm, "lz4");
        assert_eq!(config.buffer_count().unwrap().get(), 4);
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = ZcompConfig::from_toml_str("").unwrap();
        assert_eq!(config, ZcompConfig::default());
    }

    #[test]
    fn test_parse_zero_buffers() {
        let err = ZcompConfig::from_toml_str("buffers = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_parse_unknown_algorithm() {
        let err = ZcompConfig::from_toml_str(r#"algorithm = "842""#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("842"));
        assert!(msg.contains("lz4"));
    }

    #[test]
    fn test_parse_malformed() {
        let err = ZcompConfig::from_toml_str("buffers = \"many\"").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ZcompConfig::load("/nonexistent/zcomp.conf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("zcomp-config-{}.toml", std::process::id()));
        std::fs::write(&path, "algorithm = \"lz4\"\nbuffers = 2\n").unwrap();
        let config = ZcompConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.algorithm, "lz4");
        assert_eq!(config.buffers, 2);
    }
}
