//! Trade analysis and search for asymmetric trades

use league_registry::{League, LookupError, Player, PlayerId, Team, TeamId};
use tracing::{debug, info};

use crate::engine::RosterSimulator;
use crate::types::{PlayerSummary, Recommendation, TradeOpportunity, TradeResult, Valuation};

impl RosterSimulator {
    /// Value impact of sending `players_out` to `other_team` for `players_in`.
    ///
    /// Every outgoing id must be on `my_team` and every incoming id on `other_team`.
    pub fn analyze_trade(
        &self,
        my_team: &Team,
        other_team: &Team,
        players_out: &[PlayerId],
        players_in: &[PlayerId],
        weeks_remaining: u32,
        valuation: Valuation,
    ) -> Result<TradeResult, LookupError> {
        for id in players_out {
            if !my_team.has_player(*id) {
                return Err(LookupError::PlayerNotFound(*id));
            }
        }
        for id in players_in {
            if !other_team.has_player(*id) {
                return Err(LookupError::PlayerNotFound(*id));
            }
        }

        let my_current = self.roster_value_for(&my_team.roster, valuation, weeks_remaining);
        let their_current = self.roster_value_for(&other_team.roster, valuation, weeks_remaining);

        Ok(self.evaluate_trade(
            (my_team, my_current),
            (other_team, their_current),
            players_out,
            players_in,
            weeks_remaining,
            valuation,
        ))
    }

    /// Search every other team for 1-for-1 and 2-for-1 trades that favour `my_team_id`.
    ///
    /// Keeps asymmetric trades gaining more than `min_advantage`, at most
    /// `max_per_opponent` per team, sorted by advantage margin.
    pub fn find_trade_opportunities(
        &self,
        league: &League,
        my_team_id: TeamId,
        min_advantage: f64,
        max_per_opponent: usize,
        valuation: Valuation,
    ) -> Result<Vec<TradeOpportunity>, LookupError> {
        let my_team = league.team(my_team_id)?;
        let weeks_remaining = self.weeks_remaining(league, valuation);
        let boring_threshold = self.config.trade.boring_trade_threshold;

        let my_current = self.roster_value_for(&my_team.roster, valuation, weeks_remaining);
        let mut opportunities = Vec::new();

        for other_team in league.teams.iter().filter(|t| t.team_id != my_team_id) {
            let their_current =
                self.roster_value_for(&other_team.roster, valuation, weeks_remaining);
            let mut team_trades = Vec::new();

            let mut consider = |give: &[&Player], receive: &[&Player]| {
                let out: Vec<PlayerId> = give.iter().map(|p| p.player_id).collect();
                let incoming: Vec<PlayerId> = receive.iter().map(|p| p.player_id).collect();
                let analysis = self.evaluate_trade(
                    (my_team, my_current),
                    (other_team, their_current),
                    &out,
                    &incoming,
                    weeks_remaining,
                    valuation,
                );

                if analysis.my_value_change > min_advantage && analysis.asymmetric_advantage {
                    team_trades.push(TradeOpportunity {
                        other_team: other_team.team_id,
                        other_team_name: other_team.team_name.clone(),
                        give: give.iter().map(|p| PlayerSummary::from(*p)).collect(),
                        receive: receive.iter().map(|p| PlayerSummary::from(*p)).collect(),
                        analysis,
                    });
                }
            };

            // 1-for-1
            for mine in &my_team.roster {
                for theirs in &other_team.roster {
                    let same_position = mine.position == theirs.position;
                    let gap = (mine.projected_value() - theirs.projected_value()).abs();
                    if same_position && gap < boring_threshold {
                        continue;
                    }
                    consider(&[mine], &[theirs]);
                }
            }

            // 2-for-1
            for theirs in &other_team.roster {
                for (i, first) in my_team.roster.iter().enumerate() {
                    for second in &my_team.roster[i + 1..] {
                        consider(&[first, second], &[theirs]);
                    }
                }
            }

            debug!(
                "Found {} candidate trades with {}",
                team_trades.len(),
                other_team.team_name
            );

            sort_by_margin(&mut team_trades);
            team_trades.truncate(max_per_opponent);
            opportunities.extend(team_trades);
        }

        sort_by_margin(&mut opportunities);
        info!(
            "Found {} trade opportunities for {}",
            opportunities.len(),
            my_team.team_name
        );

        Ok(opportunities)
    }

    /// Regular-season weeks a valuation covers: from its start week for rest-of-season,
    /// else from the week after the league's current week
    pub fn weeks_remaining(&self, league: &League, valuation: Valuation) -> u32 {
        let start_week = match valuation {
            Valuation::RestOfSeason { start_week } => start_week,
            Valuation::SeasonAverage => self.next_week(league),
        };
        self.weeks_left_from(league, start_week)
    }

    /// Score a trade against precomputed current roster values
    fn evaluate_trade(
        &self,
        (my_team, my_current): (&Team, f64),
        (other_team, their_current): (&Team, f64),
        players_out: &[PlayerId],
        players_in: &[PlayerId],
        weeks_remaining: u32,
        valuation: Valuation,
    ) -> TradeResult {
        let my_after = roster_after(my_team, other_team, players_out, players_in);
        let their_after = roster_after(other_team, my_team, players_in, players_out);

        let my_value_change =
            self.roster_value_for(&my_after, valuation, weeks_remaining) - my_current;
        let their_value_change =
            self.roster_value_for(&their_after, valuation, weeks_remaining) - their_current;

        let projected_points_added_per_week = if weeks_remaining > 0 {
            my_value_change / weeks_remaining as f64
        } else {
            0.0
        };

        let confidence = if my_current > 0.0 {
            (my_value_change.abs() / (my_current / 10.0)).min(100.0)
        } else {
            0.0
        };

        TradeResult {
            my_value_change,
            their_value_change,
            asymmetric_advantage: my_value_change > their_value_change,
            advantage_margin: my_value_change - their_value_change,
            projected_points_added_per_week,
            total_projected_points_added: my_value_change,
            recommendation: if my_value_change > 0.0 {
                Recommendation::Accept
            } else {
                Recommendation::Reject
            },
            confidence,
            weeks_remaining,
            uses_ros_projections: valuation.is_rest_of_season(),
        }
    }
}

/// `team`'s roster minus `leaving`, plus `arriving` taken from `partner`
fn roster_after<'a>(
    team: &'a Team,
    partner: &'a Team,
    leaving: &[PlayerId],
    arriving: &[PlayerId],
) -> Vec<&'a Player> {
    team.roster
        .iter()
        .filter(|p| !leaving.contains(&p.player_id))
        .chain(partner.roster.iter().filter(|p| arriving.contains(&p.player_id)))
        .collect()
}

fn sort_by_margin(trades: &mut [TradeOpportunity]) {
    trades.sort_by(|a, b| b.analysis.advantage_margin.total_cmp(&a.analysis.advantage_margin));
}
