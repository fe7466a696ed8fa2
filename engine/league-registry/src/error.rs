//! Error types for league lookups and loading

use crate::league::TeamId;
use crate::types::PlayerId;
use thiserror::Error;

/// A team or player reference that does not resolve against the loaded league
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Team {0} not found in league")]
    TeamNotFound(TeamId),

    #[error("Player {0} not found in league")]
    PlayerNotFound(PlayerId),

    #[error("Player '{0}' not found in league")]
    PlayerNameNotFound(String),
}

/// Errors raised while building a registry from provider data
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid league data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Team id {0} appears more than once")]
    DuplicateTeam(TeamId),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
