//! Error types for the roster simulator

use league_registry::LookupError;
use performance_cache::CacheError;
use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// A team or player reference did not resolve against the league
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SimulationError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
