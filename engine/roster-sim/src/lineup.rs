//! Lineup Optimizer - greedy starter selection by expected value

use league_registry::{Player, Position};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// A fixed lineup slot: `count` starters of one position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequirement {
    pub position: Position,
    pub count: usize,
}

impl SlotRequirement {
    pub fn new(position: Position, count: usize) -> Self {
        Self { position, count }
    }
}

/// Starting lineup layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineupConfig {
    /// Number of flex slots, filled after every fixed slot
    pub flex_count: usize,

    /// Positions eligible for the flex slots
    pub flex_positions: Vec<Position>,

    /// Single-position slots, filled in order
    pub slots: Vec<SlotRequirement>,
}

impl Default for LineupConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                SlotRequirement::new(Position::Quarterback, 1),
                SlotRequirement::new(Position::RunningBack, 2),
                SlotRequirement::new(Position::WideReceiver, 2),
                SlotRequirement::new(Position::TightEnd, 1),
                SlotRequirement::new(Position::Kicker, 1),
                SlotRequirement::new(Position::Defense, 1),
            ],
            flex_positions: vec![
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            flex_count: 1,
        }
    }
}

impl LineupConfig {
    /// Total starters in a full lineup
    pub fn starter_count(&self) -> usize {
        self.slots.iter().map(|s| s.count).sum::<usize>() + self.flex_count
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.starter_count() == 0 {
            return Err("lineup must have at least one slot".to_string());
        }

        if self.flex_count > 0 && self.flex_positions.is_empty() {
            return Err("flex slots need at least one eligible position".to_string());
        }

        Ok(())
    }
}

/// Picks the highest-value starters for a roster
#[derive(Debug, Clone, Default)]
pub struct LineupOptimizer {
    config: LineupConfig,
}

impl LineupOptimizer {
    pub fn new(config: LineupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LineupConfig {
        &self.config
    }

    /// Best lineup for the roster, in slot order then flex.
    ///
    /// Slots with no eligible player stay empty. Equal values keep roster order.
    pub fn select_starters<'a>(&self, roster: &'a [Player]) -> Vec<&'a Player> {
        self.starter_indices(roster).into_iter().map(|i| &roster[i]).collect()
    }

    /// Players not selected as starters, in roster order
    pub fn bench<'a>(&self, roster: &'a [Player]) -> Vec<&'a Player> {
        let starters = self.starter_indices(roster);
        roster.iter().enumerate().filter(|(i, _)| !starters.contains(i)).map(|(_, p)| p).collect()
    }

    /// Roster positions of the selected starters, in slot order then flex
    pub fn starter_indices<P: Borrow<Player>>(&self, roster: &[P]) -> Vec<usize> {
        let mut taken = vec![false; roster.len()];
        let mut lineup = Vec::with_capacity(self.config.starter_count());

        for slot in &self.config.slots {
            let picks = best_available(roster, &taken, slot.count, |p| p.position == slot.position);
            for i in picks {
                taken[i] = true;
                lineup.push(i);
            }
        }

        let flex = best_available(roster, &taken, self.config.flex_count, |p| {
            self.config.flex_positions.contains(&p.position)
        });
        lineup.extend(flex);

        lineup
    }
}

/// Up to `count` untaken eligible players, best projected value first
fn best_available<P, F>(roster: &[P], taken: &[bool], count: usize, eligible: F) -> Vec<usize>
where
    P: Borrow<Player>,
    F: Fn(&Player) -> bool,
{
    let mut candidates: Vec<(usize, f64)> = Vec::new();
    for (i, entry) in roster.iter().enumerate() {
        let player: &Player = entry.borrow();
        if !taken[i] && eligible(player) {
            candidates.push((i, player.projected_value()));
        }
    }

    // Stable sort keeps roster order among equal values
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.into_iter().take(count).map(|(i, _)| i).collect()
}
