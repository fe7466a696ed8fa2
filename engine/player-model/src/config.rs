//! Configuration for the player performance model

use serde::{Deserialize, Serialize};

/// Expectation-maximisation settings for mixture fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmConfig {
    /// Iteration cap per fit
    pub max_iterations: usize,

    /// Stop when the log-likelihood improves by less than this
    pub tolerance: f64,

    /// Added to every component variance to keep it positive
    pub reg_covar: f64,
}

impl Default for EmConfig {
    fn default() -> Self {
        Self { max_iterations: 200, tolerance: 1e-6, reg_covar: 1e-6 }
    }
}

/// Player performance model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Fit mixtures at all; when false every player uses the Normal fallback
    pub use_mixture: bool,

    /// Configured mixture components (reduced for short histories)
    pub n_components: usize,

    /// Minimum weekly observations before a mixture is fit
    pub min_observations: usize,

    /// Number of most recent weeks that define current form
    pub recent_weeks: usize,

    /// Relative gap between recent and season average that marks hot/cold form
    pub form_threshold: f64,

    /// Multiplicative adjustment applied to draws of hot/cold players
    pub state_bias: f64,

    /// Fallback standard deviation as a fraction of the player's expected value
    pub fallback_std_ratio: f64,

    pub em: EmConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            use_mixture: true,
            n_components: 3,
            min_observations: 5,
            recent_weeks: 3,
            form_threshold: 0.20,
            state_bias: 0.10,
            fallback_std_ratio: 0.25,
            em: EmConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Component count actually used for a history of `n_observations` weeks
    pub fn components_for(&self, n_observations: usize) -> usize {
        self.n_components.min(n_observations.saturating_sub(1)).max(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.n_components == 0 {
            return Err("n_components must be greater than 0".to_string());
        }

        if self.min_observations < 2 {
            return Err("min_observations must be at least 2".to_string());
        }

        if self.recent_weeks == 0 {
            return Err("recent_weeks must be greater than 0".to_string());
        }

        if !(self.form_threshold.is_finite() && self.form_threshold > 0.0) {
            return Err("form_threshold must be a positive number".to_string());
        }

        if !(0.0..1.0).contains(&self.state_bias) {
            return Err("state_bias must be in [0, 1)".to_string());
        }

        if !(self.fallback_std_ratio.is_finite() && self.fallback_std_ratio >= 0.0) {
            return Err("fallback_std_ratio must be non-negative".to_string());
        }

        if self.em.max_iterations == 0 {
            return Err("em.max_iterations must be greater than 0".to_string());
        }

        if !(self.em.reg_covar > 0.0 && self.em.tolerance > 0.0) {
            return Err("em.reg_covar and em.tolerance must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_for_history_length() {
        let config = ModelConfig::default();
        assert_eq!(config.components_for(10), 3);
        assert_eq!(config.components_for(3), 2);
        assert_eq!(config.components_for(1), 1);
        assert_eq!(config.components_for(0), 1);
    }

    #[test]
    fn test_validate() {
        assert!(ModelConfig::default().validate().is_ok());

        let config = ModelConfig { state_bias: 1.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = ModelConfig { n_components: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
