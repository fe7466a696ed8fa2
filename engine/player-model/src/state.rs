use serde::{Deserialize, Serialize};
use std::fmt;

/// Short-term form relative to the season average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Hot,
    #[default]
    Normal,
    Cold,
}

impl FormState {
    /// Classify a recent average against the season average.
    ///
    /// A non-positive season average has no meaningful relative gap and is always normal.
    pub fn classify(season_avg: f64, recent_avg: f64, threshold: f64) -> Self {
        if season_avg.is_nan() || season_avg <= 0.0 || !recent_avg.is_finite() {
            return FormState::Normal;
        }

        let relative_gap = (recent_avg - season_avg) / season_avg;
        if relative_gap > threshold {
            FormState::Hot
        } else if relative_gap < -threshold {
            FormState::Cold
        } else {
            FormState::Normal
        }
    }

    /// Multiplier applied to draws for this form
    pub fn bias_factor(&self, state_bias: f64) -> f64 {
        match self {
            FormState::Hot => 1.0 + state_bias,
            FormState::Normal => 1.0,
            FormState::Cold => 1.0 - state_bias,
        }
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormState::Hot => f.write_str("hot"),
            FormState::Normal => f.write_str("normal"),
            FormState::Cold => f.write_str("cold"),
        }
    }
}

/// Season summary and current form, recomputed on every fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub season_avg: f64,

    /// Population standard deviation of the weekly scores
    pub season_std: f64,

    /// Most recent weekly scores, oldest first
    pub recent_scores: Vec<f64>,

    pub recent_avg: f64,

    pub form: FormState,
}

impl PlayerState {
    /// Summarise a chronological score history
    pub fn from_scores(scores: &[f64], recent_weeks: usize, threshold: f64) -> Self {
        if scores.is_empty() {
            return Self {
                season_avg: 0.0,
                season_std: 0.0,
                recent_scores: Vec::new(),
                recent_avg: 0.0,
                form: FormState::Normal,
            };
        }

        let n = scores.len() as f64;
        let season_avg = scores.iter().sum::<f64>() / n;
        let season_std = (scores.iter().map(|x| (x - season_avg).powi(2)).sum::<f64>() / n).sqrt();

        let recent_scores = scores[scores.len().saturating_sub(recent_weeks)..].to_vec();
        let recent_avg = recent_scores.iter().sum::<f64>() / recent_scores.len() as f64;

        Self {
            season_avg,
            season_std,
            form: FormState::classify(season_avg, recent_avg, threshold),
            recent_scores,
            recent_avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_streak() {
        let state =
            PlayerState::from_scores(&[10.0, 11.0, 12.0, 13.0, 14.0, 18.0, 19.0, 20.0], 3, 0.2);
        assert_eq!(state.form, FormState::Hot);
        assert_eq!(state.recent_scores, vec![18.0, 19.0, 20.0]);
        assert!((state.season_avg - 14.625).abs() < 1e-12);
    }

    #[test]
    fn test_cold_streak() {
        let state =
            PlayerState::from_scores(&[20.0, 19.0, 18.0, 17.0, 16.0, 12.0, 10.0, 8.0], 3, 0.2);
        assert_eq!(state.form, FormState::Cold);
        assert!((state.recent_avg - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_steady_player_is_normal() {
        let state =
            PlayerState::from_scores(&[15.0, 16.0, 14.0, 17.0, 15.5, 16.5, 14.5, 15.8], 3, 0.2);
        assert_eq!(state.form, FormState::Normal);
    }

    #[test]
    fn test_population_std() {
        let state = PlayerState::from_scores(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 3, 0.2);
        assert!((state.season_std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_history_uses_all_weeks_as_recent() {
        let state = PlayerState::from_scores(&[8.0, 12.0], 3, 0.2);
        assert_eq!(state.recent_scores.len(), 2);
        assert_eq!(state.form, FormState::Normal);
    }

    #[test]
    fn test_zero_average_never_hot() {
        assert_eq!(FormState::classify(0.0, 5.0, 0.2), FormState::Normal);
        assert_eq!(FormState::classify(-1.0, 5.0, 0.2), FormState::Normal);
    }

    #[test]
    fn test_bias_factor() {
        assert!((FormState::Hot.bias_factor(0.1) - 1.1).abs() < 1e-12);
        assert_eq!(FormState::Normal.bias_factor(0.1), 1.0);
        assert!((FormState::Cold.bias_factor(0.1) - 0.9).abs() < 1e-12);
    }
}
