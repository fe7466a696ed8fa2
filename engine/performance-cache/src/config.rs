//! Configuration for the performance cache

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk encoding of cache records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheFormat {
    /// Human-readable JSON
    Json,
    /// Compact binary (bincode)
    #[default]
    Bincode,
}

impl CacheFormat {
    fn extension(&self) -> &'static str {
        match self {
            CacheFormat::Json => "json",
            CacheFormat::Bincode => "bin",
        }
    }
}

/// Configuration for the performance cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per (player, season) record
    pub cache_dir: PathBuf,

    /// Record encoding
    pub format: CacheFormat,

    /// Whether to gzip records
    pub compress: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            format: CacheFormat::default(),
            compress: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with custom cache directory
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), ..Default::default() }
    }

    pub fn with_format(mut self, format: CacheFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// File extension for records written with this configuration
    pub fn extension(&self) -> String {
        if self.compress {
            format!("{}.gz", self.format.extension())
        } else {
            self.format.extension().to_string()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err("cache_dir must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        let config = CacheConfig::new("/tmp/cache");
        assert_eq!(config.extension(), "bin");

        let config = config.with_format(CacheFormat::Json).with_compression(true);
        assert_eq!(config.extension(), "json.gz");
    }

    #[test]
    fn test_validate() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(CacheConfig::new("").validate().is_err());
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"cache_dir": "models", "format": "json"}"#).unwrap();
        assert_eq!(config.format, CacheFormat::Json);
        assert!(!config.compress);
    }
}
