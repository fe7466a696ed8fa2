//! Opponent strength multipliers for rest-of-season valuation
//!
//! A multiplier below 1.0 marks a defense that suppresses scoring at a position, above
//! 1.0 one that concedes points. Unknown opponents are neutral.

use league_registry::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Defense table and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    pub min_multiplier: f64,

    pub max_multiplier: f64,

    /// Multiplier per NFL defense abbreviation, applied to every position
    pub defense_ratings: BTreeMap<String, f64>,

    /// Per position label ("RB", "D/ST", ...) overrides of the defense table
    pub position_overrides: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        let defense_ratings = [
            // Stingy
            ("SF", 0.85),
            ("BAL", 0.88),
            ("BUF", 0.90),
            ("CLE", 0.90),
            ("NYJ", 0.92),
            ("PIT", 0.92),
            ("DAL", 0.95),
            ("KC", 0.95),
            // Generous
            ("TEN", 1.05),
            ("LV", 1.08),
            ("WAS", 1.08),
            ("NYG", 1.10),
            ("ARI", 1.12),
            ("CAR", 1.15),
        ]
        .into_iter()
        .map(|(team, rating)| (team.to_string(), rating))
        .collect();

        Self {
            defense_ratings,
            position_overrides: BTreeMap::new(),
            min_multiplier: 0.5,
            max_multiplier: 1.5,
        }
    }
}

impl OpponentConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_multiplier > 0.0 && self.min_multiplier <= self.max_multiplier) {
            return Err("opponent multiplier bounds must satisfy 0 < min <= max".to_string());
        }

        let all_ratings = self
            .defense_ratings
            .values()
            .chain(self.position_overrides.values().flat_map(|table| table.values()));
        for rating in all_ratings {
            if !rating.is_finite() {
                return Err(format!("opponent rating {rating} is not finite"));
            }
        }

        Ok(())
    }
}

/// Normalised defense lookup built from [`OpponentConfig`]
#[derive(Debug, Clone)]
pub struct OpponentStrength {
    defense_ratings: BTreeMap<String, f64>,
    position_overrides: BTreeMap<Position, BTreeMap<String, f64>>,
    min_multiplier: f64,
    max_multiplier: f64,
}

impl OpponentStrength {
    pub fn new(config: &OpponentConfig) -> Self {
        let normalize_table = |table: &BTreeMap<String, f64>| -> BTreeMap<String, f64> {
            table.iter().map(|(team, rating)| (normalize_label(team), *rating)).collect()
        };

        let position_overrides = config
            .position_overrides
            .iter()
            .filter_map(|(label, table)| match label.parse::<Position>() {
                Ok(position) => Some((position, normalize_table(table))),
                Err(e) => {
                    tracing::warn!("Ignoring opponent overrides: {}", e);
                    None
                }
            })
            .collect();

        Self {
            defense_ratings: normalize_table(&config.defense_ratings),
            position_overrides,
            min_multiplier: config.min_multiplier,
            max_multiplier: config.max_multiplier,
        }
    }

    /// Scoring multiplier for a player at `position` facing `opponent`
    pub fn multiplier(&self, position: Position, opponent: &str) -> f64 {
        let label = normalize_label(opponent);
        if label.is_empty() {
            return 1.0;
        }

        let rating = self
            .position_overrides
            .get(&position)
            .and_then(|table| table.get(&label))
            .or_else(|| self.defense_ratings.get(&label))
            .copied()
            .unwrap_or(1.0);

        rating.clamp(self.min_multiplier, self.max_multiplier)
    }
}

impl Default for OpponentStrength {
    fn default() -> Self {
        Self::new(&OpponentConfig::default())
    }
}

/// Canonical team abbreviation: trimmed, upper-cased, without home/away markers
fn normalize_label(raw: &str) -> String {
    let upper = raw.trim().trim_start_matches('@').to_ascii_uppercase();
    let label = upper.strip_prefix("VS ").unwrap_or(&upper).trim().to_string();

    match label.as_str() {
        "WSH" => "WAS".to_string(),
        "JAC" => "JAX".to_string(),
        "LA" => "LAR".to_string(),
        _ => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tough_and_weak_defenses() {
        let strength = OpponentStrength::default();

        for team in ["SF", "BAL", "BUF"] {
            assert!(strength.multiplier(Position::RunningBack, team) < 1.0, "{team}");
        }
        for team in ["ARI", "CAR", "NYG"] {
            assert!(strength.multiplier(Position::RunningBack, team) > 1.0, "{team}");
        }
    }

    #[test]
    fn test_unknown_opponent_is_neutral() {
        let strength = OpponentStrength::default();
        assert_eq!(strength.multiplier(Position::WideReceiver, "XYZ"), 1.0);
        assert_eq!(strength.multiplier(Position::WideReceiver, ""), 1.0);
    }

    #[test]
    fn test_label_normalisation() {
        let strength = OpponentStrength::default();
        let sf = strength.multiplier(Position::Quarterback, "SF");
        assert_eq!(strength.multiplier(Position::Quarterback, " sf "), sf);
        assert_eq!(strength.multiplier(Position::Quarterback, "@SF"), sf);
        assert_eq!(
            strength.multiplier(Position::Quarterback, "WSH"),
            strength.multiplier(Position::Quarterback, "WAS")
        );
    }

    #[test]
    fn test_position_override_and_clamp() {
        let mut config = OpponentConfig::default();
        config
            .position_overrides
            .insert("TE".to_string(), BTreeMap::from([("sf".to_string(), 1.2)]));
        config.defense_ratings.insert("MIA".to_string(), 3.0);
        let strength = OpponentStrength::new(&config);

        assert_eq!(strength.multiplier(Position::TightEnd, "SF"), 1.2);
        assert_eq!(strength.multiplier(Position::RunningBack, "SF"), 0.85);
        assert_eq!(strength.multiplier(Position::RunningBack, "MIA"), 1.5);
    }

    #[test]
    fn test_validate() {
        assert!(OpponentConfig::default().validate().is_ok());
        let config = OpponentConfig { min_multiplier: 2.0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
