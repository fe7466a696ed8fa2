//! Result records produced by the roster simulator

use league_registry::{Player, PlayerId, Position, TeamId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score distribution of one side of a simulated matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub avg_score: f64,
    pub score_std: f64,      // population std
    pub score_range: (f64, f64), // (p10, p90)
}

/// Outcome of `n_simulations` head-to-head weeks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub n_simulations: usize,
    pub team1_win_probability: f64, // percent
    pub team2_win_probability: f64, // percent, always 100 - team1
    pub team1: ScoreSummary,
    pub team2: ScoreSummary,
}

/// How roster value is measured when comparing rosters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Valuation {
    /// Fitted season average, else resolved projection
    SeasonAverage,

    /// Schedule-adjusted value over the weeks starting at `start_week`
    RestOfSeason { start_week: u32 },
}

impl Valuation {
    /// Inclusive week window covered by `weeks_remaining` weeks, if any
    pub fn window(&self, weeks_remaining: u32) -> Option<(u32, u32)> {
        match self {
            Valuation::SeasonAverage => None,
            Valuation::RestOfSeason { start_week } => {
                let end_week = (start_week + weeks_remaining).checked_sub(1)?;
                (weeks_remaining > 0).then_some((*start_week, end_week))
            }
        }
    }

    pub fn is_rest_of_season(&self) -> bool {
        matches!(self, Valuation::RestOfSeason { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Accept,
    Reject,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Accept => write!(f, "ACCEPT"),
            Recommendation::Reject => write!(f, "REJECT"),
        }
    }
}

/// Value impact of a proposed trade on both rosters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub my_value_change: f64,
    pub their_value_change: f64,
    pub asymmetric_advantage: bool,
    pub advantage_margin: f64,
    pub projected_points_added_per_week: f64,
    pub total_projected_points_added: f64,
    pub recommendation: Recommendation,
    pub confidence: f64, // 0-100
    pub weeks_remaining: u32,
    pub uses_ros_projections: bool,
}

/// Identity of a player named in a trade suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self { player_id: player.player_id, name: player.name.clone(), position: player.position }
    }
}

/// A trade worth proposing to another team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOpportunity {
    pub other_team: TeamId,
    pub other_team_name: String,
    pub give: Vec<PlayerSummary>,
    pub receive: Vec<PlayerSummary>,
    pub analysis: TradeResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// A free-agent pickup and the player it would replace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeAgentRecommendation {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    pub value_added: f64,
    pub drop_candidate_id: Option<PlayerId>, // None means roster expansion
    pub drop_candidate_name: Option<String>,
    pub fa_projected_avg: f64,
    pub drop_projected_avg: f64,
    pub priority: Priority,
    pub percent_owned: f64,
}

/// Rest-of-season outlook for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProjection {
    pub team_id: TeamId,
    pub team_name: String,
    pub current_wins: u32,
    pub projected_wins: f64,     // mean over trials
    pub playoff_odds: f64,       // percent
    pub championship_odds: f64,  // percent
}
