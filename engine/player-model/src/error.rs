//! Error types for model fitting

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Insufficient data: need {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Invalid observation: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
