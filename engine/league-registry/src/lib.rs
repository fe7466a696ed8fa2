//! League Registry - the league data model at the data-provider boundary
//!
//! Teams, rosters, schedules and per-player weekly scoring as exported by the league
//! provider, plus a registry that resolves team and player identifiers.

pub mod error;
pub mod league;
pub mod registry;
pub mod types;

pub use error::{LookupError, RegistryError};
pub use league::{League, LeagueSettings, Team, TeamId};
pub use registry::LeagueRegistry;
pub use types::{resolve_value, InjuryStatus, LineupSlot, Player, PlayerId, Position};
