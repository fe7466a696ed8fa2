//! Season and playoff simulation
//!
//! Each rest-of-season trial draws from its own ChaCha8 stream derived from one base
//! seed, so a seeded run gives the same projections on the rayon pool as sequentially.

use league_registry::{League, TeamId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::engine::RosterSimulator;
use crate::types::SeasonProjection;

/// Per-team counters accumulated over trials, indexed by league team order
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeasonTally {
    wins: Vec<u64>,
    playoffs: Vec<u64>,
    championships: Vec<u64>,
}

impl SeasonTally {
    fn new(n_teams: usize) -> Self {
        Self {
            wins: vec![0; n_teams],
            playoffs: vec![0; n_teams],
            championships: vec![0; n_teams],
        }
    }

    fn merge(mut self, other: Self) -> Self {
        let pairs = [
            (&mut self.wins, &other.wins),
            (&mut self.playoffs, &other.playoffs),
            (&mut self.championships, &other.championships),
        ];
        for (total, part) in pairs {
            for (t, p) in total.iter_mut().zip(part) {
                *t += p;
            }
        }
        self
    }
}

impl RosterSimulator {
    /// Play out weeks `start_week..=reg_season_count` once and return final win totals.
    ///
    /// Each scheduled game is simulated once even when both teams list it. The first
    /// team seen wins on a strictly greater score. Opponents missing from the league
    /// are skipped.
    pub fn simulate_season<R: Rng + ?Sized>(
        &self,
        league: &League,
        start_week: u32,
        rng: &mut R,
    ) -> BTreeMap<TeamId, u32> {
        let mut wins: BTreeMap<TeamId, u32> =
            league.teams.iter().map(|t| (t.team_id, t.wins)).collect();
        let mut played: HashSet<(u32, TeamId, TeamId)> = HashSet::new();
        let last_week = self.reg_season_weeks(league);

        for week in start_week.max(1)..=last_week {
            for team in &league.teams {
                let Some(opponent_id) = team.opponent_in_week(week) else {
                    continue;
                };
                if opponent_id == team.team_id {
                    continue;
                }
                let Ok(opponent) = league.team(opponent_id) else {
                    debug!(
                        "Week {}: {} has unknown opponent {}",
                        week, team.team_name, opponent_id
                    );
                    continue;
                };

                let game = (week, team.team_id.min(opponent_id), team.team_id.max(opponent_id));
                if !played.insert(game) {
                    continue;
                }

                let team_score = self.simulate_roster_score(team, None, 1.0, rng);
                let opponent_score = self.simulate_roster_score(opponent, None, 1.0, rng);
                let winner = if team_score > opponent_score { team.team_id } else { opponent_id };

                if let Some(total) = wins.get_mut(&winner) {
                    *total += 1;
                }
            }
        }

        wins
    }

    /// Single-elimination bracket in seed order (1v2, 3v4, ...); an odd team out gets
    /// a bye. Returns `None` for an empty bracket.
    pub fn simulate_playoff_bracket<R: Rng + ?Sized>(
        &self,
        league: &League,
        seeds: &[TeamId],
        rng: &mut R,
    ) -> Option<TeamId> {
        let mut remaining = seeds.to_vec();

        while remaining.len() > 1 {
            let mut winners = Vec::with_capacity(remaining.len().div_ceil(2));
            for pair in remaining.chunks(2) {
                match *pair {
                    [higher, lower] => {
                        let higher_score = self.bracket_score(league, higher, rng);
                        let lower_score = self.bracket_score(league, lower, rng);
                        winners.push(if higher_score > lower_score { higher } else { lower });
                    }
                    [bye] => winners.push(bye),
                    _ => {}
                }
            }
            remaining = winners;
        }

        remaining.first().copied()
    }

    /// Project the rest of the regular season and playoffs over `n_simulations` trials.
    ///
    /// Trials start the week after `league.current_week`. The top `playoff_team_count`
    /// teams by wins qualify, ties broken by league order. A request for zero trials
    /// runs one.
    pub fn simulate_season_rest_of_season<R: Rng + ?Sized>(
        &self,
        league: &League,
        n_simulations: usize,
        rng: &mut R,
    ) -> BTreeMap<TeamId, SeasonProjection> {
        if n_simulations == 0 {
            debug!("Zero trials requested for season outlook, running one");
        }
        let n = n_simulations.max(1);
        let n_teams = league.teams.len();
        let base_seed: u64 = rng.gen();
        let start_week = self.next_week(league);
        let playoff_slots =
            self.config.simulation.playoff_team_count.unwrap_or(league.settings.playoff_team_count);

        info!(
            "Simulating {} seasons from week {} ({} teams, {} playoff slots)",
            n, start_week, n_teams, playoff_slots
        );

        let run_trial = |trial: usize| -> SeasonTally {
            let mut trial_rng = ChaCha8Rng::seed_from_u64(base_seed);
            trial_rng.set_stream(trial as u64);
            self.season_trial(league, start_week, playoff_slots, &mut trial_rng)
        };

        let tally = if self.config.simulation.parallel_trials {
            (0..n)
                .into_par_iter()
                .map(run_trial)
                .reduce(|| SeasonTally::new(n_teams), SeasonTally::merge)
        } else {
            (0..n).map(run_trial).fold(SeasonTally::new(n_teams), SeasonTally::merge)
        };

        let trials = n as f64;
        league
            .teams
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let projection = SeasonProjection {
                    team_id: team.team_id,
                    team_name: team.team_name.clone(),
                    current_wins: team.wins,
                    projected_wins: tally.wins[i] as f64 / trials,
                    playoff_odds: tally.playoffs[i] as f64 / trials * 100.0,
                    championship_odds: tally.championships[i] as f64 / trials * 100.0,
                };
                (team.team_id, projection)
            })
            .collect()
    }

    fn season_trial(
        &self,
        league: &League,
        start_week: u32,
        playoff_slots: usize,
        rng: &mut ChaCha8Rng,
    ) -> SeasonTally {
        let mut tally = SeasonTally::new(league.teams.len());
        let wins = self.simulate_season(league, start_week, rng);

        let mut standings: Vec<(usize, u32)> = league
            .teams
            .iter()
            .enumerate()
            .map(|(i, team)| (i, wins.get(&team.team_id).copied().unwrap_or(team.wins)))
            .collect();
        for (i, total) in &standings {
            tally.wins[*i] = u64::from(*total);
        }

        // Stable: equal records keep league order
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        let qualifiers: Vec<usize> =
            standings.iter().take(playoff_slots).map(|(i, _)| *i).collect();
        for i in &qualifiers {
            tally.playoffs[*i] = 1;
        }

        if qualifiers.len() >= 2 {
            let seeds: Vec<TeamId> = qualifiers.iter().map(|i| league.teams[*i].team_id).collect();
            if let Some(champion) = self.simulate_playoff_bracket(league, &seeds, rng) {
                if let Some(i) = league.teams.iter().position(|t| t.team_id == champion) {
                    tally.championships[i] = 1;
                }
            }
        }

        tally
    }

    /// Playoff score for a seed; a team missing from the league scores zero
    fn bracket_score<R: Rng + ?Sized>(&self, league: &League, team_id: TeamId, rng: &mut R) -> f64 {
        league
            .team(team_id)
            .map(|team| self.simulate_roster_score(team, None, 1.0, rng))
            .unwrap_or(0.0)
    }
}
