use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique player identifier as assigned by the league data provider
pub type PlayerId = u64;

/// Roster position of a fantasy football player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "D/ST", alias = "DST")]
    Defense,
}

impl Position {
    /// All positions in canonical lineup order
    pub const ALL: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Kicker,
        Position::Defense,
    ];

    /// Short label used by the data provider (e.g. "QB", "D/ST")
    pub fn label(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "D/ST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a position label is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown position label '{0}'")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::Quarterback),
            "RB" => Ok(Position::RunningBack),
            "WR" => Ok(Position::WideReceiver),
            "TE" => Ok(Position::TightEnd),
            "K" => Ok(Position::Kicker),
            "D/ST" | "DST" | "DEF" => Ok(Position::Defense),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

/// Injury or availability status reported for a player.
///
/// The provider sends free text; it is normalized (trimmed, upper-cased) into this
/// closed set. Text that matches none of the known labels is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum InjuryStatus {
    /// No status reported (missing or empty)
    #[default]
    Unspecified,
    Active,
    Normal,
    Questionable,
    Doubtful,
    Out,
    InjuryReserve,
    Suspension,
    /// Unrecognized status text, stored normalized
    Other(String),
}

impl InjuryStatus {
    /// Normalize a raw provider status string
    pub fn parse(raw: Option<&str>) -> Self {
        let normalized = match raw.map(str::trim) {
            None | Some("") => return InjuryStatus::Unspecified,
            Some(text) => text.to_ascii_uppercase(),
        };

        match normalized.as_str() {
            "ACTIVE" => InjuryStatus::Active,
            "NORMAL" => InjuryStatus::Normal,
            "QUESTIONABLE" => InjuryStatus::Questionable,
            "DOUBTFUL" => InjuryStatus::Doubtful,
            "OUT" => InjuryStatus::Out,
            "INJURY_RESERVE" | "IR" => InjuryStatus::InjuryReserve,
            "SUSPENSION" | "SUSPENDED" => InjuryStatus::Suspension,
            _ => InjuryStatus::Other(normalized),
        }
    }

    /// Whether the player can be counted on this week.
    ///
    /// Only unspecified, ACTIVE and NORMAL statuses count as available.
    pub fn is_available(&self) -> bool {
        matches!(self, InjuryStatus::Unspecified | InjuryStatus::Active | InjuryStatus::Normal)
    }

    /// Provider label for this status (`None` when unspecified)
    pub fn label(&self) -> Option<&str> {
        match self {
            InjuryStatus::Unspecified => None,
            InjuryStatus::Active => Some("ACTIVE"),
            InjuryStatus::Normal => Some("NORMAL"),
            InjuryStatus::Questionable => Some("QUESTIONABLE"),
            InjuryStatus::Doubtful => Some("DOUBTFUL"),
            InjuryStatus::Out => Some("OUT"),
            InjuryStatus::InjuryReserve => Some("INJURY_RESERVE"),
            InjuryStatus::Suspension => Some("SUSPENSION"),
            InjuryStatus::Other(text) => Some(text.as_str()),
        }
    }
}

impl From<Option<String>> for InjuryStatus {
    fn from(raw: Option<String>) -> Self {
        InjuryStatus::parse(raw.as_deref())
    }
}

impl From<InjuryStatus> for Option<String> {
    fn from(status: InjuryStatus) -> Self {
        status.label().map(str::to_string)
    }
}

/// Lineup slot a manager has assigned a player to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineupSlot {
    /// Slot label carried but empty
    Unassigned,
    Bench,
    InjuredReserve,
    /// Any starting slot label (e.g. "QB", "RB/WR/TE", "STARTER")
    Starting(String),
}

impl LineupSlot {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" => LineupSlot::Unassigned,
            "BE" | "BENCH" => LineupSlot::Bench,
            "IR" => LineupSlot::InjuredReserve,
            other => LineupSlot::Starting(other.to_string()),
        }
    }

    pub fn is_starting(&self) -> bool {
        matches!(self, LineupSlot::Starting(_))
    }
}

impl From<String> for LineupSlot {
    fn from(raw: String) -> Self {
        LineupSlot::parse(&raw)
    }
}

impl From<LineupSlot> for String {
    fn from(slot: LineupSlot) -> Self {
        match slot {
            LineupSlot::Unassigned => String::new(),
            LineupSlot::Bench => "BE".to_string(),
            LineupSlot::InjuredReserve => "IR".to_string(),
            LineupSlot::Starting(label) => label,
        }
    }
}

/// A rostered or free-agent player as exposed by the league data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,

    pub name: String,

    pub position: Position,

    /// Fantasy points per week played (week number -> points), possibly sparse
    #[serde(default)]
    pub weekly_points: BTreeMap<u32, f64>,

    /// Current-season projected points per game
    #[serde(default)]
    pub projected_avg_points: Option<f64>,

    /// Raw season average points per game
    #[serde(default)]
    pub avg_points: f64,

    #[serde(default)]
    pub injury_status: InjuryStatus,

    #[serde(default)]
    pub lineup_slot: Option<LineupSlot>,

    /// Remaining NFL opponents by week (week number -> opponent abbreviation)
    #[serde(default)]
    pub schedule: BTreeMap<u32, String>,

    #[serde(default)]
    pub percent_owned: f64,
}

impl Player {
    /// Create a player with no history, projection or status
    pub fn new(player_id: PlayerId, name: impl Into<String>, position: Position) -> Self {
        Self {
            player_id,
            name: name.into(),
            position,
            weekly_points: BTreeMap::new(),
            projected_avg_points: None,
            avg_points: 0.0,
            injury_status: InjuryStatus::Unspecified,
            lineup_slot: None,
            schedule: BTreeMap::new(),
            percent_owned: 0.0,
        }
    }

    pub fn with_avg_points(mut self, avg_points: f64) -> Self {
        self.avg_points = avg_points;
        self
    }

    pub fn with_projection(mut self, projected_avg_points: f64) -> Self {
        self.projected_avg_points = Some(projected_avg_points);
        self
    }

    /// Record consecutive weekly scores starting at week 1 and refresh the season average
    pub fn with_weekly_scores(mut self, scores: &[f64]) -> Self {
        self.weekly_points =
            scores.iter().enumerate().map(|(i, pts)| (i as u32 + 1, *pts)).collect();
        if !scores.is_empty() {
            self.avg_points = scores.iter().sum::<f64>() / scores.len() as f64;
        }
        self
    }

    pub fn with_injury_status(mut self, status: &str) -> Self {
        self.injury_status = InjuryStatus::parse(Some(status));
        self
    }

    pub fn with_lineup_slot(mut self, slot: &str) -> Self {
        self.lineup_slot = Some(LineupSlot::parse(slot));
        self
    }

    pub fn with_opponent(mut self, week: u32, opponent: impl Into<String>) -> Self {
        self.schedule.insert(week, opponent.into());
        self
    }

    /// Weekly scores in chronological order, skipping weeks without data
    pub fn weekly_scores(&self) -> Vec<f64> {
        self.weekly_points.values().copied().filter(|pts| pts.is_finite()).collect()
    }

    /// Expected points per game: projection, else season average, else zero
    pub fn projected_value(&self) -> f64 {
        resolve_value(self.projected_avg_points, self.avg_points)
    }

    /// Whether the manager has put this player in a starting slot
    pub fn is_designated_starter(&self) -> bool {
        self.lineup_slot.as_ref().is_some_and(LineupSlot::is_starting)
    }
}

/// Ordered fallback for a per-game value: a positive projection wins, then a finite
/// historical average, then zero.
pub fn resolve_value(projected: Option<f64>, average: f64) -> f64 {
    if let Some(projection) = projected.filter(|p| p.is_finite() && *p > 0.0) {
        return projection;
    }
    if average.is_finite() {
        average
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("qb".parse::<Position>().unwrap(), Position::Quarterback);
        assert_eq!("D/ST".parse::<Position>().unwrap(), Position::Defense);
        assert_eq!("DST".parse::<Position>().unwrap(), Position::Defense);
        assert!("LB".parse::<Position>().is_err());
        assert_eq!(Position::Defense.to_string(), "D/ST");
    }

    #[test]
    fn test_position_serde_labels() {
        let json = serde_json::to_string(&Position::Defense).unwrap();
        assert_eq!(json, "\"D/ST\"");
        let parsed: Position = serde_json::from_str("\"WR\"").unwrap();
        assert_eq!(parsed, Position::WideReceiver);
    }

    #[test]
    fn test_injury_status_normalization() {
        assert_eq!(InjuryStatus::parse(None), InjuryStatus::Unspecified);
        assert_eq!(InjuryStatus::parse(Some("  ")), InjuryStatus::Unspecified);
        assert_eq!(InjuryStatus::parse(Some("active")), InjuryStatus::Active);
        assert_eq!(InjuryStatus::parse(Some("Out")), InjuryStatus::Out);
        assert_eq!(InjuryStatus::parse(Some("injury_reserve")), InjuryStatus::InjuryReserve);
        assert_eq!(
            InjuryStatus::parse(Some("day_to_day")),
            InjuryStatus::Other("DAY_TO_DAY".to_string())
        );
    }

    #[test]
    fn test_injury_status_availability() {
        let available = [None, Some(""), Some("ACTIVE"), Some("normal")];
        for raw in available {
            assert!(InjuryStatus::parse(raw).is_available(), "{raw:?} should be available");
        }

        let unavailable =
            ["OUT", "QUESTIONABLE", "DOUBTFUL", "INJURY_RESERVE", "SUSPENSION", "PUP"];
        for raw in unavailable {
            assert!(!InjuryStatus::parse(Some(raw)).is_available(), "{raw} should be excluded");
        }
    }

    #[test]
    fn test_injury_status_serde() {
        let player: Player = serde_json::from_str(
            r#"{"player_id": 1, "name": "A", "position": "RB", "injury_status": "questionable"}"#,
        )
        .unwrap();
        assert_eq!(player.injury_status, InjuryStatus::Questionable);

        let player: Player = serde_json::from_str(
            r#"{"player_id": 2, "name": "B", "position": "RB", "injury_status": null}"#,
        )
        .unwrap();
        assert_eq!(player.injury_status, InjuryStatus::Unspecified);
    }

    #[test]
    fn test_lineup_slot() {
        assert!(LineupSlot::parse("RB").is_starting());
        assert!(LineupSlot::parse("STARTER").is_starting());
        assert!(!LineupSlot::parse("BE").is_starting());
        assert!(!LineupSlot::parse("IR").is_starting());
        assert!(!LineupSlot::parse("").is_starting());

        let player = Player::new(1, "Starter", Position::Quarterback).with_lineup_slot("QB");
        assert!(player.is_designated_starter());
        let player = Player::new(2, "Nobody", Position::Quarterback);
        assert!(!player.is_designated_starter());
    }

    #[test]
    fn test_value_resolver() {
        assert_eq!(resolve_value(Some(16.5), 15.0), 16.5);
        assert_eq!(resolve_value(Some(0.0), 15.0), 15.0);
        assert_eq!(resolve_value(None, 15.0), 15.0);
        assert_eq!(resolve_value(None, f64::NAN), 0.0);
        assert_eq!(resolve_value(None, 0.0), 0.0);
    }

    #[test]
    fn test_weekly_scores_are_chronological() {
        let mut player = Player::new(1, "Sparse", Position::WideReceiver);
        player.weekly_points.insert(7, 21.0);
        player.weekly_points.insert(2, 10.0);
        player.weekly_points.insert(4, 14.0);

        assert_eq!(player.weekly_scores(), vec![10.0, 14.0, 21.0]);

        let player = Player::new(2, "Dense", Position::WideReceiver)
            .with_weekly_scores(&[10.0, 20.0]);
        assert_eq!(player.avg_points, 15.0);
        assert_eq!(player.weekly_points.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }
}
