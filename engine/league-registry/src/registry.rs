use crate::error::{LookupError, RegistryError};
use crate::league::{League, Team, TeamId};
use crate::types::{Player, PlayerId};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// League Registry - resolves team and player identifiers against a league snapshot
///
/// Builds id indexes once so higher-level orchestration can validate user-supplied
/// identifiers before handing teams to the simulator.
pub struct LeagueRegistry {
    league: League,

    /// Map from team id to index into `league.teams`
    teams_by_id: HashMap<TeamId, usize>,

    /// Map from player id to (team index, roster index)
    players_by_id: HashMap<PlayerId, (usize, usize)>,

    /// Map from lower-cased player name to player id
    players_by_name: HashMap<String, PlayerId>,
}

impl LeagueRegistry {
    /// Index a league snapshot
    pub fn new(league: League) -> Result<Self, RegistryError> {
        let mut teams_by_id = HashMap::new();
        let mut players_by_id = HashMap::new();
        let mut players_by_name = HashMap::new();

        for (team_idx, team) in league.teams.iter().enumerate() {
            if teams_by_id.insert(team.team_id, team_idx).is_some() {
                return Err(RegistryError::DuplicateTeam(team.team_id));
            }

            for (roster_idx, player) in team.roster.iter().enumerate() {
                if players_by_id.insert(player.player_id, (team_idx, roster_idx)).is_some() {
                    warn!(
                        "Player {} ({}) is rostered more than once, keeping team {}",
                        player.player_id, player.name, team.team_id
                    );
                }
                players_by_name.insert(player.name.to_lowercase(), player.player_id);
            }
        }

        info!(
            "Indexed league {}: {} teams, {} rostered players",
            league.year,
            teams_by_id.len(),
            players_by_id.len()
        );

        Ok(Self { league, teams_by_id, players_by_id, players_by_name })
    }

    /// Load a league export (JSON) and index it
    pub fn load_from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, RegistryError> {
        info!("Loading league data from: {:?}", file_path.as_ref());

        let json_content = std::fs::read_to_string(&file_path)?;
        let league: League = serde_json::from_str(&json_content)?;

        Self::new(league)
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn into_league(self) -> League {
        self.league
    }

    /// Get a team by id
    pub fn get_team(&self, team_id: TeamId) -> Result<&Team, LookupError> {
        self.teams_by_id
            .get(&team_id)
            .map(|idx| &self.league.teams[*idx])
            .ok_or(LookupError::TeamNotFound(team_id))
    }

    /// Get a rostered player by id
    pub fn get_player(&self, player_id: PlayerId) -> Result<&Player, LookupError> {
        self.players_by_id
            .get(&player_id)
            .map(|(team_idx, roster_idx)| &self.league.teams[*team_idx].roster[*roster_idx])
            .ok_or(LookupError::PlayerNotFound(player_id))
    }

    /// Get a rostered player by exact (case-insensitive) name
    pub fn get_player_by_name(&self, name: &str) -> Result<&Player, LookupError> {
        let player_id = self
            .players_by_name
            .get(&name.to_lowercase())
            .ok_or_else(|| LookupError::PlayerNameNotFound(name.to_string()))?;

        self.get_player(*player_id)
    }

    /// Team that currently rosters the player
    pub fn owner_of(&self, player_id: PlayerId) -> Result<&Team, LookupError> {
        self.players_by_id
            .get(&player_id)
            .map(|(team_idx, _)| &self.league.teams[*team_idx])
            .ok_or(LookupError::PlayerNotFound(player_id))
    }

    /// Resolve a list of player ids that must all belong to one team
    pub fn resolve_roster_players(
        &self,
        team_id: TeamId,
        player_ids: &[PlayerId],
    ) -> Result<Vec<&Player>, LookupError> {
        let team = self.get_team(team_id)?;
        player_ids
            .iter()
            .map(|id| team.player(*id).ok_or(LookupError::PlayerNotFound(*id)))
            .collect()
    }

    /// Look up a rostered player by numeric id or by name
    pub fn find_player(&self, reference: &str) -> Result<&Player, LookupError> {
        let reference = reference.trim();
        match reference.parse::<PlayerId>() {
            Ok(player_id) => self.get_player(player_id),
            Err(_) => self.get_player_by_name(reference),
        }
    }

    /// Resolve player ids or names that must all be on `team_id`'s roster
    pub fn resolve_player_refs<S: AsRef<str>>(
        &self,
        team_id: TeamId,
        references: &[S],
    ) -> Result<Vec<&Player>, LookupError> {
        let mut player_ids = Vec::with_capacity(references.len());
        for reference in references {
            let reference = reference.as_ref().trim();
            let player_id = match reference.parse::<PlayerId>() {
                Ok(player_id) => player_id,
                Err(_) => self.get_player_by_name(reference)?.player_id,
            };
            player_ids.push(player_id);
        }
        self.resolve_roster_players(team_id, &player_ids)
    }

    /// Search for rostered players by partial name match
    pub fn search_players(&self, query: &str) -> Vec<&Player> {
        let query_lower = query.to_lowercase();
        self.league
            .rostered_players()
            .filter(|player| player.name.to_lowercase().contains(&query_lower))
            .collect()
    }

    pub fn team_count(&self) -> usize {
        self.teams_by_id.len()
    }

    pub fn player_count(&self) -> usize {
        self.players_by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use std::io::Write;

    fn create_test_league() -> League {
        League::new(
            2024,
            10,
            vec![
                Team::new(1, "Gridiron Gurus").with_roster(vec![
                    Player::new(2560757, "Lamar Jackson", Position::Quarterback)
                        .with_avg_points(24.1),
                    Player::new(2560955, "Josh Allen", Position::Quarterback).with_avg_points(23.4),
                ]),
                Team::new(2, "Waiver Wire Warriors").with_roster(vec![Player::new(
                    4035538,
                    "Bijan Robinson",
                    Position::RunningBack,
                )
                .with_avg_points(18.2)]),
            ],
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        assert_eq!(registry.team_count(), 2);
        assert_eq!(registry.player_count(), 3);
    }

    #[test]
    fn test_team_lookup() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        assert_eq!(registry.get_team(2).unwrap().team_name, "Waiver Wire Warriors");
        assert_eq!(registry.get_team(999).unwrap_err(), LookupError::TeamNotFound(999));
    }

    #[test]
    fn test_player_lookup() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        let lamar = registry.get_player_by_name("lamar jackson").unwrap();
        assert_eq!(lamar.position, Position::Quarterback);
        assert_eq!(registry.get_player(lamar.player_id).unwrap().name, "Lamar Jackson");
        assert_eq!(registry.owner_of(4035538).unwrap().team_id, 2);
        assert!(registry.get_player(1).is_err());
    }

    #[test]
    fn test_resolve_roster_players() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        let players = registry.resolve_roster_players(1, &[2560955]).unwrap();
        assert_eq!(players[0].name, "Josh Allen");

        // Player exists in the league but not on this team
        let err = registry.resolve_roster_players(1, &[4035538]).unwrap_err();
        assert_eq!(err, LookupError::PlayerNotFound(4035538));
    }

    #[test]
    fn test_find_player_by_id_or_name() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        assert_eq!(registry.find_player("4035538").unwrap().name, "Bijan Robinson");
        assert_eq!(registry.find_player(" Josh Allen ").unwrap().player_id, 2560955);
        assert_eq!(
            registry.find_player("Nobody").unwrap_err(),
            LookupError::PlayerNameNotFound("Nobody".to_string())
        );
        assert_eq!(registry.find_player("7").unwrap_err(), LookupError::PlayerNotFound(7));
    }

    #[test]
    fn test_resolve_player_refs() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        let players = registry.resolve_player_refs(1, &["lamar jackson", "2560955"]).unwrap();
        let ids: Vec<PlayerId> = players.iter().map(|p| p.player_id).collect();
        assert_eq!(ids, vec![2560757, 2560955]);

        // Known player on the wrong team
        let err = registry.resolve_player_refs(1, &["Bijan Robinson"]).unwrap_err();
        assert_eq!(err, LookupError::PlayerNotFound(4035538));

        let err = registry.resolve_player_refs(2, &["Ghost"]).unwrap_err();
        assert_eq!(err, LookupError::PlayerNameNotFound("Ghost".to_string()));

        let err = registry.resolve_player_refs(9, &["2560757"]).unwrap_err();
        assert_eq!(err, LookupError::TeamNotFound(9));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let league = League::new(2024, 1, vec![Team::new(1, "A"), Team::new(1, "B")]);
        assert!(matches!(LeagueRegistry::new(league), Err(RegistryError::DuplicateTeam(1))));
    }

    #[test]
    fn test_search_players() {
        let registry = LeagueRegistry::new(create_test_league()).unwrap();

        let results = registry.search_players("Lamar");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lamar Jackson");

        let results = registry.search_players("josh");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Josh Allen");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&create_test_league()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let registry = LeagueRegistry::load_from_file(file.path()).unwrap();
        assert_eq!(registry.league().current_week, 10);
        assert_eq!(registry.team_count(), 2);
    }

    #[test]
    fn test_load_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(
            LeagueRegistry::load_from_file(file.path()),
            Err(RegistryError::Parse(_))
        ));
    }
}
