//! Cache backend trait and implementations

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::record::CacheKey;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Byte-level storage for encoded cache records
pub trait CacheBackend: Send + Sync {
    /// Read the raw record for a key, `None` when absent
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Store the raw record for a key, replacing any previous one
    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()>;

    /// Remove a record; returns whether one existed
    fn remove(&self, key: &CacheKey) -> Result<bool>;

    /// Whether a record exists for the key
    fn contains(&self, key: &CacheKey) -> bool;

    /// Remove every record; returns how many were removed
    fn clear(&self) -> Result<usize>;
}

/// Local file-based backend: one file per key under the cache directory
pub struct LocalCache {
    cache_dir: PathBuf,
    extension: String,
}

impl LocalCache {
    /// Create a new local backend, creating the cache directory if needed
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate().map_err(CacheError::config)?;

        fs::create_dir_all(&config.cache_dir)?;

        tracing::info!("Local performance cache at: {:?}", config.cache_dir);

        Ok(Self { cache_dir: config.cache_dir.clone(), extension: config.extension() })
    }

    /// Deterministic path of the record for a key
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key.file_stem(), self.extension))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn temp_path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!(".{}.{}.tmp", key.file_stem(), self.extension))
    }

    fn is_record(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("player_") && name.ends_with(&self.extension))
    }
}

impl CacheBackend for LocalCache {
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        let temp_path = self.temp_path_for(key);

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }

        // Readers only ever see the previous record or the complete new one
        if let Err(e) = fs::rename(&temp_path, self.path_for(key)) {
            let _ = fs::remove_file(&temp_path);
            return Err(CacheError::Io(e));
        }

        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn clear(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file() && self.is_record(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        tracing::info!("Cleared {} cached models from {:?}", removed, self.cache_dir);

        Ok(removed)
    }
}

/// In-memory backend (for testing)
#[derive(Default)]
pub struct InMemoryCache {
    records: Mutex<HashMap<CacheKey, Vec<u8>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Vec<u8>>> {
        // A panic while holding the lock cannot leave a half-written Vec behind
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheBackend for InMemoryCache {
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        self.lock().insert(*key, bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    fn clear(&self) -> Result<usize> {
        let mut records = self.lock();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_cache_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("nested").join("models");

        let backend = LocalCache::new(&CacheConfig::new(&cache_dir)).unwrap();
        assert!(backend.cache_dir().is_dir());
    }

    #[test]
    fn test_local_cache_path() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalCache::new(&CacheConfig::new(temp_dir.path())).unwrap();

        assert_eq!(
            backend.path_for(&CacheKey::new(42, 2024)),
            temp_dir.path().join("player_42_2024.bin")
        );
    }

    #[test]
    fn test_local_cache_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalCache::new(&CacheConfig::new(temp_dir.path())).unwrap();
        let key = CacheKey::new(1, 2024);

        backend.write(&key, b"first").unwrap();
        backend.write(&key, b"second").unwrap();

        assert_eq!(backend.read(&key).unwrap().unwrap(), b"second");
        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["player_1_2024.bin".to_string()]);
    }

    #[test]
    fn test_local_cache_remove_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalCache::new(&CacheConfig::new(temp_dir.path())).unwrap();

        backend.write(&CacheKey::new(1, 2024), b"a").unwrap();
        backend.write(&CacheKey::new(2, 2024), b"b").unwrap();
        backend.write(&CacheKey::new(3, 2024), b"c").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "keep me").unwrap();

        assert!(backend.remove(&CacheKey::new(1, 2024)).unwrap());
        assert!(!backend.remove(&CacheKey::new(1, 2024)).unwrap());
        assert!(!backend.contains(&CacheKey::new(1, 2024)));

        assert_eq!(backend.clear().unwrap(), 2);
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_in_memory_cache() {
        let backend = InMemoryCache::new();
        let key = CacheKey::new(9, 2022);

        assert!(backend.read(&key).unwrap().is_none());
        backend.write(&key, b"payload").unwrap();
        assert!(backend.contains(&key));
        assert_eq!(backend.read(&key).unwrap().unwrap(), b"payload");
        assert_eq!(backend.clear().unwrap(), 1);
        assert!(!backend.contains(&key));
    }
}
