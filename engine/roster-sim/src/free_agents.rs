//! Free-agent pickup recommendations

use league_registry::{Player, Position, Team};
use tracing::debug;

use crate::engine::RosterSimulator;
use crate::types::{FreeAgentRecommendation, Priority};

impl RosterSimulator {
    /// Rank free agents by how much they improve on the weakest rostered player at
    /// their position.
    ///
    /// `positions` limits the candidates (an empty list means no limit). Candidates with
    /// no incumbent at their position count at `roster_expansion_weight`. Only pickups
    /// with positive value are returned, best first, at most `top_n`.
    pub fn recommend_free_agents(
        &self,
        my_team: &Team,
        free_agents: &[Player],
        top_n: usize,
        positions: Option<&[Position]>,
        exclude_injured: bool,
    ) -> Vec<FreeAgentRecommendation> {
        let settings = &self.config.free_agents;
        let position_filter = positions.filter(|p| !p.is_empty());
        let mut recommendations = Vec::new();

        for fa in free_agents {
            if position_filter.is_some_and(|allowed| !allowed.contains(&fa.position)) {
                continue;
            }

            if exclude_injured && !fa.injury_status.is_available() {
                debug!("Skipping {}: {:?}", fa.name, fa.injury_status);
                continue;
            }

            let drop_candidate = my_team
                .roster
                .iter()
                .filter(|p| p.position == fa.position)
                .min_by(|a, b| a.projected_value().total_cmp(&b.projected_value()));

            let fa_value = fa.projected_value();
            let drop_value = drop_candidate.map(Player::projected_value).unwrap_or(0.0);
            let value_added = match drop_candidate {
                Some(_) => fa_value - drop_value,
                None => fa_value * settings.roster_expansion_weight,
            };

            if value_added <= 0.0 {
                continue;
            }

            let priority = if value_added > settings.high_priority_threshold {
                Priority::High
            } else if value_added > settings.medium_priority_threshold {
                Priority::Medium
            } else {
                Priority::Low
            };

            recommendations.push(FreeAgentRecommendation {
                player_id: fa.player_id,
                name: fa.name.clone(),
                position: fa.position,
                value_added,
                drop_candidate_id: drop_candidate.map(|p| p.player_id),
                drop_candidate_name: drop_candidate.map(|p| p.name.clone()),
                fa_projected_avg: fa_value,
                drop_projected_avg: drop_value,
                priority,
                percent_owned: fa.percent_owned,
            });
        }

        recommendations.sort_by(|a, b| b.value_added.total_cmp(&a.value_added));
        recommendations.truncate(top_n);
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;

    fn simulator() -> RosterSimulator {
        RosterSimulator::in_memory(SimulatorConfig::default())
    }

    fn player(id: u64, position: Position, avg: f64) -> Player {
        Player::new(id, format!("P{id}"), position).with_avg_points(avg)
    }

    fn my_team() -> Team {
        Team::new(1, "Mine").with_roster(vec![
            player(1, Position::RunningBack, 12.0),
            player(2, Position::RunningBack, 6.0),
            player(3, Position::WideReceiver, 10.0),
        ])
    }

    #[test]
    fn test_value_against_weakest_incumbent() {
        let sim = simulator();
        let fas = vec![player(10, Position::RunningBack, 10.0)];

        let recs = sim.recommend_free_agents(&my_team(), &fas, 10, None, true);
        assert_eq!(recs.len(), 1);
        assert!((recs[0].value_added - 4.0).abs() < 1e-9);
        assert_eq!(recs[0].drop_candidate_id, Some(2));
        assert_eq!(recs[0].drop_projected_avg, 6.0);
        assert_eq!(recs[0].priority, Priority::High);
    }

    #[test]
    fn test_roster_expansion_at_half_weight() {
        let sim = simulator();
        let fas = vec![player(10, Position::Kicker, 8.0)];

        let recs = sim.recommend_free_agents(&my_team(), &fas, 10, None, true);
        assert!((recs[0].value_added - 4.0).abs() < 1e-9);
        assert_eq!(recs[0].drop_candidate_id, None);
        assert_eq!(recs[0].drop_projected_avg, 0.0);
    }

    #[test]
    fn test_priorities_and_discards() {
        let sim = simulator();
        let fas = vec![
            player(10, Position::WideReceiver, 12.0), // +2 medium
            player(11, Position::WideReceiver, 10.5), // +0.5 low
            player(12, Position::WideReceiver, 9.0),  // -1 dropped
            player(13, Position::WideReceiver, 10.0), // 0 dropped
        ];

        let recs = sim.recommend_free_agents(&my_team(), &fas, 10, None, true);
        let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_injured_players_filtered() {
        let sim = simulator();
        let fas = vec![
            player(10, Position::RunningBack, 20.0).with_injury_status("OUT"),
            player(11, Position::RunningBack, 15.0).with_injury_status("QUESTIONABLE"),
            player(12, Position::RunningBack, 9.0).with_injury_status("ACTIVE"),
            player(13, Position::RunningBack, 8.0),
        ];

        let recs = sim.recommend_free_agents(&my_team(), &fas, 10, None, true);
        let ids: Vec<u64> = recs.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![12, 13]);

        let all = sim.recommend_free_agents(&my_team(), &fas, 10, None, false);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_position_filter_and_truncation() {
        let sim = simulator();
        let fas = vec![
            player(10, Position::RunningBack, 9.0),
            player(11, Position::WideReceiver, 14.0),
            player(12, Position::RunningBack, 11.0),
        ];

        let only_rb = sim.recommend_free_agents(
            &my_team(),
            &fas,
            10,
            Some(&[Position::RunningBack][..]),
            true,
        );
        assert!(only_rb.iter().all(|r| r.position == Position::RunningBack));
        assert_eq!(only_rb.len(), 2);

        let unfiltered = sim.recommend_free_agents(&my_team(), &fas, 10, Some(&[][..]), true);
        assert_eq!(unfiltered.len(), 3);

        let top = sim.recommend_free_agents(&my_team(), &fas, 1, None, true);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].player_id, 12);
    }
}
