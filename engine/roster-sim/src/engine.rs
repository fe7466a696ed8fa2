//! Roster simulator core: scoring, matchups and roster valuation
//!
//! Trades, free agents and season projection live in their own modules as further
//! `impl RosterSimulator` blocks.

use league_registry::{League, Player, PlayerId, Position, Team};
use performance_cache::PerformanceCache;
use player_model::PlayerPerformanceModel;
use rand::Rng;
use std::borrow::Borrow;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::SimulatorConfig;
use crate::error::{Result, SimulationError};
use crate::lineup::LineupOptimizer;
use crate::opponent::OpponentStrength;
use crate::stats;
use crate::types::{MatchupResult, ScoreSummary, Valuation};

/// Monte Carlo simulator over a league's rosters
pub struct RosterSimulator {
    pub(crate) config: SimulatorConfig,
    pub(crate) model: PlayerPerformanceModel,
    pub(crate) lineup: LineupOptimizer,
    pub(crate) opponents: OpponentStrength,
}

impl RosterSimulator {
    /// Build a simulator whose player models persist under `config.cache`
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate().map_err(|e| SimulationError::config(e.to_string()))?;
        let cache = PerformanceCache::local(config.cache.clone())?;
        let model = PlayerPerformanceModel::new(config.model.clone(), cache);
        Ok(Self::with_model(config, model))
    }

    /// Build a simulator around an existing model
    pub fn with_model(config: SimulatorConfig, model: PlayerPerformanceModel) -> Self {
        let lineup = LineupOptimizer::new(config.lineup.clone());
        let opponents = OpponentStrength::new(&config.opponents);
        Self { config, model, lineup, opponents }
    }

    /// Simulator with a non-persistent cache
    pub fn in_memory(config: SimulatorConfig) -> Self {
        let model = PlayerPerformanceModel::in_memory(config.model.clone());
        Self::with_model(config, model)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn model(&self) -> &PlayerPerformanceModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut PlayerPerformanceModel {
        &mut self.model
    }

    pub fn lineup(&self) -> &LineupOptimizer {
        &self.lineup
    }

    /// Fit a performance model for every rostered player in the league
    pub fn train_league(&mut self, league: &League) -> HashMap<PlayerId, bool> {
        if !self.config.model.use_mixture {
            info!("Mixture models disabled, using projection fallback for all players");
            return HashMap::new();
        }
        self.model.bulk_train(league.rostered_players(), league.year)
    }

    /// Players who take the field for a team this week.
    ///
    /// Managers' designated starters when any exist, otherwise the optimizer's lineup.
    pub fn starters_for<'a>(&self, team: &'a Team) -> Vec<&'a Player> {
        let designated: Vec<&Player> =
            team.roster.iter().filter(|p| p.is_designated_starter()).collect();
        if designated.is_empty() {
            self.lineup.select_starters(&team.roster)
        } else {
            designated
        }
    }

    /// One simulated weekly score for a team's starters, scaled by the opposing defense.
    ///
    /// With a `week`, each starter's draw is also scaled by the strength of the defense
    /// on that player's schedule for the week.
    pub fn simulate_roster_score<R: Rng + ?Sized>(
        &self,
        team: &Team,
        week: Option<u32>,
        opponent_defense_rating: f64,
        rng: &mut R,
    ) -> f64 {
        self.starters_for(team)
            .into_iter()
            .map(|player| {
                let schedule_factor = week
                    .and_then(|w| player.schedule.get(&w))
                    .map_or(1.0, |opponent| self.opponents.multiplier(player.position, opponent));
                let draw = self.model.sample(player, true, rng);
                (draw * opponent_defense_rating * schedule_factor).max(0.0)
            })
            .sum()
    }

    /// Head-to-head win odds and score spread over `n_simulations` weeks.
    ///
    /// A request for zero trials runs one.
    pub fn simulate_matchup<R: Rng + ?Sized>(
        &self,
        team1: &Team,
        team2: &Team,
        n_simulations: usize,
        rng: &mut R,
    ) -> MatchupResult {
        if n_simulations == 0 {
            debug!("Zero trials requested for matchup, running one");
        }
        let n = n_simulations.max(1);
        let mut team1_scores = Vec::with_capacity(n);
        let mut team2_scores = Vec::with_capacity(n);

        for _ in 0..n {
            team1_scores.push(self.simulate_roster_score(team1, None, 1.0, rng));
            team2_scores.push(self.simulate_roster_score(team2, None, 1.0, rng));
        }

        let team1_wins = team1_scores.iter().zip(&team2_scores).filter(|(s1, s2)| s1 > s2).count();
        let team1_win_probability = team1_wins as f64 / n as f64 * 100.0;

        debug!(
            "{} vs {}: {:.1}% over {} trials",
            team1.team_name, team2.team_name, team1_win_probability, n
        );

        MatchupResult {
            team1_id: team1.team_id,
            team2_id: team2.team_id,
            n_simulations: n,
            team1_win_probability,
            team2_win_probability: 100.0 - team1_win_probability,
            team1: summarize(&team1_scores),
            team2: summarize(&team2_scores),
        }
    }

    /// Per-game value used for roster comparisons: fitted season average when a model
    /// exists, else the resolved projection
    pub fn base_value(&self, player: &Player) -> f64 {
        self.model.season_average(player.player_id).unwrap_or_else(|| player.projected_value())
    }

    /// Starters at full value plus the bench at `bench_weight`
    pub fn roster_value<P: Borrow<Player>>(&self, roster: &[P]) -> f64 {
        self.weighted_roster_value(roster, |player| self.base_value(player))
    }

    /// Roster value over weeks `current_week..=end_week`, each player's base value scaled
    /// by that week's opponent when `consider_schedule` is set
    pub fn roster_value_ros<P: Borrow<Player>>(
        &self,
        roster: &[P],
        current_week: u32,
        end_week: u32,
        consider_schedule: bool,
    ) -> f64 {
        self.weighted_roster_value(roster, |player| {
            self.ros_player_value(player, current_week, end_week, consider_schedule)
        })
    }

    /// Roster value under a trade valuation mode
    pub fn roster_value_for<P: Borrow<Player>>(
        &self,
        roster: &[P],
        valuation: Valuation,
        weeks_remaining: u32,
    ) -> f64 {
        match valuation.window(weeks_remaining) {
            Some((start_week, end_week)) => {
                self.roster_value_ros(roster, start_week, end_week, true)
            }
            None => self.roster_value(roster),
        }
    }

    /// How much `player` would add over the team's current starter at the same position
    pub fn player_value(&self, player: &Player, team: &Team) -> f64 {
        let value = self.base_value(player);
        match self.current_starter(team, player.position) {
            Some(starter) => value - self.base_value(starter),
            None => value,
        }
    }

    /// Highest-valued starter the team fields at `position`
    pub fn current_starter<'a>(&self, team: &'a Team, position: Position) -> Option<&'a Player> {
        let mut best: Option<&'a Player> = None;
        for player in self.starters_for(team).into_iter().filter(|p| p.position == position) {
            if best.map_or(true, |b| self.base_value(player) > self.base_value(b)) {
                best = Some(player);
            }
        }
        best
    }

    /// Scoring multiplier for `position` against the defense named by `opponent`
    pub fn calculate_opponent_strength(&self, position: Position, opponent: &str) -> f64 {
        self.opponents.multiplier(position, opponent)
    }

    /// Last regular-season week, from the configuration override or the league settings
    pub(crate) fn reg_season_weeks(&self, league: &League) -> u32 {
        self.config.simulation.reg_season_count.unwrap_or(league.settings.reg_season_count)
    }

    /// First week still to be played
    pub(crate) fn next_week(&self, league: &League) -> u32 {
        league.current_week + 1
    }

    /// Regular-season weeks from `start_week` through the final regular-season week
    pub(crate) fn weeks_left_from(&self, league: &League, start_week: u32) -> u32 {
        (self.reg_season_weeks(league) + 1).saturating_sub(start_week.max(1))
    }

    fn ros_player_value(
        &self,
        player: &Player,
        current_week: u32,
        end_week: u32,
        consider_schedule: bool,
    ) -> f64 {
        let base = self.base_value(player);
        if !consider_schedule || end_week < current_week {
            return base;
        }

        let weeks = current_week..=end_week;
        let total: f64 = weeks
            .clone()
            .map(|week| match player.schedule.get(&week) {
                Some(opponent) => base * self.opponents.multiplier(player.position, opponent),
                None => base,
            })
            .sum();

        total / weeks.count() as f64
    }

    fn weighted_roster_value<P, F>(&self, roster: &[P], value_of: F) -> f64
    where
        P: Borrow<Player>,
        F: Fn(&Player) -> f64,
    {
        let starters = self.lineup.starter_indices(roster);
        let bench_weight = self.config.trade.bench_weight;

        roster
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let player: &Player = entry.borrow();
                let weight = if starters.contains(&i) { 1.0 } else { bench_weight };
                value_of(player) * weight
            })
            .sum()
    }
}

fn summarize(scores: &[f64]) -> ScoreSummary {
    ScoreSummary {
        avg_score: stats::mean(scores),
        score_std: stats::std_dev(scores),
        score_range: (stats::percentile(scores, 10.0), stats::percentile(scores, 90.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn simulator() -> RosterSimulator {
        RosterSimulator::in_memory(SimulatorConfig::default())
    }

    fn player(id: u64, position: Position, avg: f64) -> Player {
        Player::new(id, format!("P{id}"), position).with_avg_points(avg)
    }

    #[test]
    fn test_empty_roster_scores_zero() {
        let sim = simulator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let team = Team::new(1, "Empty");

        assert_eq!(sim.simulate_roster_score(&team, None, 1.0, &mut rng), 0.0);
        assert_eq!(sim.roster_value::<Player>(&[]), 0.0);
    }

    #[test]
    fn test_designated_starters_override_optimizer() {
        let sim = simulator();
        let team = Team::new(1, "Set").with_roster(vec![
            player(1, Position::Quarterback, 25.0).with_lineup_slot("BE"),
            player(2, Position::Quarterback, 12.0).with_lineup_slot("QB"),
        ]);

        let starters: Vec<u64> = sim.starters_for(&team).iter().map(|p| p.player_id).collect();
        assert_eq!(starters, vec![2]);

        let unset = Team::new(2, "Unset").with_roster(vec![
            player(1, Position::Quarterback, 25.0),
            player(2, Position::Quarterback, 12.0),
        ]);
        let starters: Vec<u64> = sim.starters_for(&unset).iter().map(|p| p.player_id).collect();
        assert_eq!(starters, vec![1]);
    }

    #[test]
    fn test_defense_rating_scales_scores() {
        let sim = simulator();
        let team = Team::new(1, "Solo").with_roster(vec![player(1, Position::Quarterback, 20.0)]);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let neutral = sim.simulate_roster_score(&team, None, 1.0, &mut rng);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let tough = sim.simulate_roster_score(&team, None, 0.5, &mut rng);

        assert!((tough - neutral * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_week_applies_scheduled_defense() {
        let sim = simulator();
        let rb = player(1, Position::RunningBack, 20.0).with_opponent(10, "SF");
        let team = Team::new(1, "Solo").with_roster(vec![rb]);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let neutral = sim.simulate_roster_score(&team, None, 1.0, &mut rng);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let week_ten = sim.simulate_roster_score(&team, Some(10), 1.0, &mut rng);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let bye_week = sim.simulate_roster_score(&team, Some(11), 1.0, &mut rng);

        let sf = sim.calculate_opponent_strength(Position::RunningBack, "SF");
        assert!(sf < 1.0);
        assert!((week_ten - neutral * sf).abs() < 1e-9);
        assert_eq!(bye_week, neutral);
    }

    #[test]
    fn test_matchup_with_single_trial() {
        let sim = simulator();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let team1 = Team::new(1, "A").with_roster(vec![player(1, Position::Quarterback, 20.0)]);
        let team2 = Team::new(2, "B").with_roster(vec![player(2, Position::Quarterback, 20.0)]);

        // Zero trials runs one
        let result = sim.simulate_matchup(&team1, &team2, 0, &mut rng);
        assert_eq!(result.n_simulations, 1);
        assert!(result.team1_win_probability == 0.0 || result.team1_win_probability == 100.0);
        assert_eq!(result.team1_win_probability + result.team2_win_probability, 100.0);
        assert_eq!(result.team1.score_std, 0.0);
    }

    #[test]
    fn test_ros_value_uses_schedule() {
        let sim = simulator();
        let rb = player(1, Position::RunningBack, 10.0)
            .with_opponent(10, "SF")
            .with_opponent(11, "CAR");
        let roster = vec![rb];

        // (10 * 0.85 + 10 * 1.15 + 10) / 3
        let value = sim.roster_value_ros(&roster, 10, 12, true);
        assert!((value - 10.0).abs() < 1e-9);

        let tough_week = sim.roster_value_ros(&roster, 10, 10, true);
        assert!((tough_week - 8.5).abs() < 1e-9);

        assert_eq!(sim.roster_value_ros(&roster, 10, 10, false), 10.0);
        assert_eq!(sim.roster_value_ros(&roster, 12, 10, true), 10.0);
    }

    #[test]
    fn test_player_value_over_starter() {
        let sim = simulator();
        let team = Team::new(1, "Mine").with_roster(vec![
            player(1, Position::Quarterback, 18.0),
            player(2, Position::Kicker, 7.0),
        ]);

        let upgrade = player(10, Position::Quarterback, 22.0);
        assert!((sim.player_value(&upgrade, &team) - 4.0).abs() < 1e-9);

        let new_position = player(11, Position::TightEnd, 9.0);
        assert_eq!(sim.player_value(&new_position, &team), 9.0);

        let starter = sim.current_starter(&team, Position::Quarterback).unwrap();
        assert_eq!(starter.player_id, 1);
        assert!(sim.current_starter(&team, Position::Defense).is_none());
    }

    #[test]
    fn test_opponent_strength_passthrough() {
        let sim = simulator();
        assert!(sim.calculate_opponent_strength(Position::WideReceiver, "SF") < 1.0);
        assert_eq!(sim.calculate_opponent_strength(Position::WideReceiver, "???"), 1.0);
    }
}
