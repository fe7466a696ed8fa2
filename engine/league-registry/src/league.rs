use crate::error::LookupError;
use crate::types::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Team identifier as assigned by the league data provider
pub type TeamId = u32;

/// A fantasy team: roster, record and regular-season schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,

    pub team_name: String,

    /// Players in provider order
    #[serde(default)]
    pub roster: Vec<Player>,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,

    /// Opponent team id per week; index 0 is week 1
    #[serde(default)]
    pub schedule: Vec<TeamId>,
}

impl Team {
    pub fn new(team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            roster: Vec::new(),
            wins: 0,
            losses: 0,
            schedule: Vec::new(),
        }
    }

    pub fn with_roster(mut self, roster: Vec<Player>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_record(mut self, wins: u32, losses: u32) -> Self {
        self.wins = wins;
        self.losses = losses;
        self
    }

    pub fn with_schedule(mut self, schedule: Vec<TeamId>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Opponent for a 1-based week, if scheduled
    pub fn opponent_in_week(&self, week: u32) -> Option<TeamId> {
        let index = week.checked_sub(1)? as usize;
        self.schedule.get(index).copied()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.player_id == player_id)
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }
}

/// League-wide settings consumed by season simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    /// Number of teams that qualify for the playoffs
    pub playoff_team_count: usize,

    /// Number of regular-season weeks
    pub reg_season_count: u32,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self { playoff_team_count: 6, reg_season_count: 14 }
    }
}

/// Snapshot of a league as exported by the data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub year: i32,

    /// Most recently completed or in-progress week
    pub current_week: u32,

    pub teams: Vec<Team>,

    #[serde(default)]
    pub settings: LeagueSettings,
}

impl League {
    pub fn new(year: i32, current_week: u32, teams: Vec<Team>) -> Self {
        Self { year, current_week, teams, settings: LeagueSettings::default() }
    }

    pub fn with_settings(mut self, settings: LeagueSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Look up a team by id
    pub fn team(&self, team_id: TeamId) -> Result<&Team, LookupError> {
        self.teams
            .iter()
            .find(|t| t.team_id == team_id)
            .ok_or(LookupError::TeamNotFound(team_id))
    }

    /// Every rostered player across all teams, in team then roster order
    pub fn rostered_players(&self) -> impl Iterator<Item = &Player> {
        self.teams.iter().flat_map(|t| t.roster.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn test_opponent_in_week() {
        let team = Team::new(1, "Alpha").with_schedule(vec![2, 3, 4]);
        assert_eq!(team.opponent_in_week(1), Some(2));
        assert_eq!(team.opponent_in_week(3), Some(4));
        assert_eq!(team.opponent_in_week(0), None);
        assert_eq!(team.opponent_in_week(4), None);
    }

    #[test]
    fn test_team_lookup() {
        let league = League::new(2024, 10, vec![Team::new(1, "Alpha"), Team::new(2, "Beta")]);
        assert_eq!(league.team(2).unwrap().team_name, "Beta");
        assert!(matches!(league.team(999), Err(LookupError::TeamNotFound(999))));
    }

    #[test]
    fn test_rostered_players() {
        let league = League::new(
            2024,
            1,
            vec![
                Team::new(1, "Alpha").with_roster(vec![Player::new(10, "A", Position::Kicker)]),
                Team::new(2, "Beta").with_roster(vec![
                    Player::new(20, "B", Position::Kicker),
                    Player::new(21, "C", Position::Defense),
                ]),
            ],
        );
        let ids: Vec<_> = league.rostered_players().map(|p| p.player_id).collect();
        assert_eq!(ids, vec![10, 20, 21]);
    }

    #[test]
    fn test_league_settings_default_when_missing() {
        let league: League =
            serde_json::from_str(r#"{"year": 2024, "current_week": 3, "teams": []}"#).unwrap();
        assert_eq!(league.settings, LeagueSettings::default());
    }
}
