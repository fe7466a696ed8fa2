//! # Performance Cache
//!
//! Persists fitted player performance models keyed by (player id, season year) so a model
//! is fit once per player and season and restored on later runs.
//!
//! ## Architecture
//!
//! - **CacheBackend**: byte-level storage trait
//! - **LocalCache**: one file per key, `<cache_dir>/player_<id>_<year>.<ext>`
//! - **InMemoryCache**: map-backed storage for tests
//! - **CacheRecord**: envelope (key, version, timestamp) around the payload
//!
//! Reads never fail: a missing, unreadable, undecodable or mismatched record is a miss.
//! There is no locking; concurrent writers to one key are last-writer-wins.
//!
//! ## Usage
//!
//! ```rust
//! use performance_cache::{CacheConfig, PerformanceCache};
//! use tempfile::TempDir;
//!
//! let temp_dir = TempDir::new().unwrap();
//! let cache = PerformanceCache::local(CacheConfig::new(temp_dir.path())).unwrap();
//!
//! cache.save(4035538, 2024, &vec![18.5_f64, 4.2]).unwrap();
//! let restored: Option<Vec<f64>> = cache.load(4035538, 2024);
//! assert_eq!(restored, Some(vec![18.5, 4.2]));
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod record;

pub use backend::{CacheBackend, InMemoryCache, LocalCache};
pub use config::{CacheConfig, CacheFormat};
pub use error::{CacheError, Result};
pub use record::{CacheKey, CacheRecord, RECORD_VERSION};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Typed cache service over a storage backend
pub struct PerformanceCache {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
}

impl PerformanceCache {
    /// Create a file-backed cache rooted at `config.cache_dir`
    pub fn local(config: CacheConfig) -> Result<Self> {
        let backend = LocalCache::new(&config)?;
        Ok(Self { config, backend: Box::new(backend) })
    }

    /// Create a cache that lives only as long as this value
    pub fn in_memory() -> Self {
        Self::with_backend(CacheConfig::default(), Box::new(InMemoryCache::new()))
    }

    pub fn with_backend(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Load the payload cached for a player and season.
    ///
    /// Any failure is logged and reported as a miss.
    pub fn load<T: DeserializeOwned>(&self, player_id: u64, year: i32) -> Option<T> {
        let key = CacheKey::new(player_id, year);

        let bytes = match self.backend.read(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read cached model {}: {}", key, e);
                return None;
            }
        };

        match record::decode::<T>(&bytes, &key, &self.config) {
            Ok(record) => {
                debug!("Cache hit for {} (written {})", key, record.written_at);
                Some(record.payload)
            }
            Err(e) => {
                warn!("Ignoring unusable cached model {}: {}", key, e);
                None
            }
        }
    }

    /// Persist the payload for a player and season, replacing any previous record
    pub fn save<T: Serialize>(&self, player_id: u64, year: i32, payload: &T) -> Result<()> {
        let key = CacheKey::new(player_id, year);
        let bytes = record::encode(&CacheRecord::new(key, payload), &self.config)?;
        self.backend.write(&key, &bytes)?;

        debug!("Cached model {} ({} bytes)", key, bytes.len());

        Ok(())
    }

    pub fn contains(&self, player_id: u64, year: i32) -> bool {
        self.backend.contains(&CacheKey::new(player_id, year))
    }

    pub fn remove(&self, player_id: u64, year: i32) -> Result<bool> {
        self.backend.remove(&CacheKey::new(player_id, year))
    }

    pub fn clear(&self) -> Result<usize> {
        self.backend.clear()
    }
}
