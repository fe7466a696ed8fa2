//! Cache record envelope and codec
//!
//! Every record is a [`CacheRecord`] wrapping the caller's payload with the key it was
//! written under, a format version and a timestamp. The envelope is encoded as JSON or
//! bincode and optionally gzipped.

use crate::config::{CacheConfig, CacheFormat};
use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Format version stamped on every record; records with another version are misses
pub const RECORD_VERSION: u32 = 1;

/// Identity of a cached model: one player in one season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub player_id: u64,
    pub year: i32,
}

impl CacheKey {
    pub fn new(player_id: u64, year: i32) -> Self {
        Self { player_id, year }
    }

    /// Stable file stem for this key
    pub fn file_stem(&self) -> String {
        format!("player_{}_{}", self.player_id, self.year)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Envelope persisted for each key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    pub key: CacheKey,
    pub version: u32,
    pub written_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> CacheRecord<T> {
    pub fn new(key: CacheKey, payload: T) -> Self {
        Self { key, version: RECORD_VERSION, written_at: Utc::now(), payload }
    }
}

/// Encode a record according to the cache configuration
pub fn encode<T: Serialize>(record: &CacheRecord<T>, config: &CacheConfig) -> Result<Vec<u8>> {
    let raw = match config.format {
        CacheFormat::Json => serde_json::to_vec(record)?,
        CacheFormat::Bincode => bincode::serialize(record)?,
    };

    if !config.compress {
        return Ok(raw);
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

/// Decode a record and check it belongs to `expected`
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    expected: &CacheKey,
    config: &CacheConfig,
) -> Result<CacheRecord<T>> {
    let raw = if config.compress {
        let mut decoder = GzDecoder::new(bytes);
        let mut buf = Vec::new();
        decoder.read_to_end(&mut buf)?;
        buf
    } else {
        bytes.to_vec()
    };

    let record: CacheRecord<T> = match config.format {
        CacheFormat::Json => serde_json::from_slice(&raw)?,
        CacheFormat::Bincode => bincode::deserialize(&raw)?,
    };

    if record.version != RECORD_VERSION {
        return Err(CacheError::corruption(format!(
            "record version {} (expected {})",
            record.version, RECORD_VERSION
        )));
    }

    if record.key != *expected {
        return Err(CacheError::corruption(format!(
            "record written for {} found under {}",
            record.key, expected
        )));
    }

    Ok(record)
}
