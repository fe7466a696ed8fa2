//! # Roster Simulator
//!
//! Monte Carlo decision support for a fantasy football league. Player scoring comes from
//! the per-player performance models; this crate turns those draws into weekly team
//! scores and everything built on them.
//!
//! - **Matchups**: win odds and score spread for two rosters
//! - **Trades**: value impact of a proposal and a search for asymmetric trades, by season
//!   average or schedule-adjusted rest-of-season value
//! - **Free agents**: pickups ranked against the weakest incumbent
//! - **Season outlook**: remaining schedule, playoff qualification and bracket, with
//!   trials fanned out on rayon
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use roster_sim::{RosterSimulator, SimulatorConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let league = league_registry::LeagueRegistry::load_from_file("league.json")?.into_league();
//! let mut simulator = RosterSimulator::new(SimulatorConfig::load(None)?)?;
//! simulator.train_league(&league);
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let outlook = simulator.simulate_season_rest_of_season(&league, 1_000, &mut rng);
//! for projection in outlook.values() {
//!     println!("{}: {:.1}% playoffs", projection.team_name, projection.playoff_odds);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod free_agents;
pub mod lineup;
pub mod logging;
pub mod opponent;
pub mod season;
pub mod stats;
pub mod trade;
pub mod types;


pub use config::{
    FreeAgentSettings, LoggingConfig, SimulationSettings, SimulatorConfig, TradeSettings,
};
pub use engine::RosterSimulator;
pub use error::{Result, SimulationError};
pub use lineup::{LineupConfig, LineupOptimizer, SlotRequirement};
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use opponent::{OpponentConfig, OpponentStrength};
pub use types::{
    FreeAgentRecommendation, MatchupResult, PlayerSummary, Priority, Recommendation,
    ScoreSummary, SeasonProjection, TradeOpportunity, TradeResult, Valuation,
};

/// Re-export commonly used types
pub use league_registry::{League, LookupError, Player, PlayerId, Position, Team, TeamId};
pub use player_model::{ModelConfig, PlayerPerformanceModel};

/// Current version of the roster simulator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
