use crate::config::ModelConfig;
use crate::gmm::GaussianMixture;
use crate::state::PlayerState;
use league_registry::{Player, PlayerId};
use performance_cache::PerformanceCache;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Mixture and state fitted for one player-season; the unit stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub mixture: GaussianMixture,
    pub state: PlayerState,
    pub n_observations: usize,
}

impl FittedModel {
    pub fn n_components(&self) -> usize {
        self.mixture.n_components()
    }
}

/// Player Performance Model - learns each player's weekly scoring distribution
///
/// Fitted models live in memory for the lifetime of the value and are persisted through
/// the [`PerformanceCache`] so later runs can skip fitting.
pub struct PlayerPerformanceModel {
    config: ModelConfig,
    cache: PerformanceCache,
    models: HashMap<PlayerId, FittedModel>,
}

impl PlayerPerformanceModel {
    pub fn new(config: ModelConfig, cache: PerformanceCache) -> Self {
        Self { config, cache, models: HashMap::new() }
    }

    /// Model backed by a throwaway in-memory cache
    pub fn in_memory(config: ModelConfig) -> Self {
        Self::new(config, PerformanceCache::in_memory())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn cache(&self) -> &PerformanceCache {
        &self.cache
    }

    /// Fit (or restore from cache) the model for one player-season.
    ///
    /// Returns `None` when the player has fewer than `min_observations` weekly scores or
    /// mixtures are disabled; no state is recorded in that case.
    pub fn train(
        &mut self,
        player: &Player,
        year: i32,
        force_retrain: bool,
    ) -> Option<&FittedModel> {
        if !self.config.use_mixture {
            return None;
        }

        if !force_retrain {
            if let Some(cached) = self.cache.load::<FittedModel>(player.player_id, year) {
                debug!(
                    "Restored model for {} ({}) from cache, form {}",
                    player.name, player.player_id, cached.state.form
                );
                self.models.insert(player.player_id, cached);
                return self.models.get(&player.player_id);
            }
        }

        let scores = player.weekly_scores();
        if scores.len() < self.config.min_observations {
            debug!(
                "Skipping {} ({}): {} weekly scores, need {}",
                player.name,
                player.player_id,
                scores.len(),
                self.config.min_observations
            );
            return None;
        }

        let n_components = self.config.components_for(scores.len());
        let mixture = match GaussianMixture::fit(&scores, n_components, &self.config.em) {
            Ok(mixture) => mixture,
            Err(e) => {
                warn!("Failed to fit model for {} ({}): {}", player.name, player.player_id, e);
                return None;
            }
        };

        if !mixture.converged() {
            debug!(
                "Mixture for {} stopped after {} iterations without converging",
                player.name,
                mixture.iterations()
            );
        }

        let state = PlayerState::from_scores(
            &scores,
            self.config.recent_weeks,
            self.config.form_threshold,
        );
        let fitted = FittedModel { mixture, state, n_observations: scores.len() };

        if let Err(e) = self.cache.save(player.player_id, year, &fitted) {
            warn!("Failed to cache model for {} ({}): {}", player.name, player.player_id, e);
        }

        debug!(
            "Trained {}-component model for {} ({} weeks, form {})",
            n_components,
            player.name,
            scores.len(),
            fitted.state.form
        );

        self.models.insert(player.player_id, fitted);
        self.models.get(&player.player_id)
    }

    /// Train every player independently; maps player id to whether a model now exists
    pub fn bulk_train<'a, I>(&mut self, players: I, year: i32) -> HashMap<PlayerId, bool>
    where
        I: IntoIterator<Item = &'a Player>,
    {
        let results: HashMap<PlayerId, bool> = players
            .into_iter()
            .map(|player| (player.player_id, self.train(player, year, false).is_some()))
            .collect();

        let trained = results.values().filter(|ok| **ok).count();
        info!("Trained {}/{} player models for {}", trained, results.len(), year);

        results
    }

    /// Draw `n_samples` non-negative weekly scores for a player
    pub fn predict<R: Rng + ?Sized>(
        &self,
        player: &Player,
        n_samples: usize,
        use_state_bias: bool,
        rng: &mut R,
    ) -> Vec<f64> {
        (0..n_samples).map(|_| self.sample(player, use_state_bias, rng)).collect()
    }

    /// Draw a single non-negative weekly score.
    ///
    /// Uses the fitted mixture (scaled by form when `use_state_bias`) or, without a model,
    /// a Normal around the player's expected value.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        player: &Player,
        use_state_bias: bool,
        rng: &mut R,
    ) -> f64 {
        let draw = match self.models.get(&player.player_id) {
            Some(fitted) => {
                let factor = if use_state_bias {
                    fitted.state.form.bias_factor(self.config.state_bias)
                } else {
                    1.0
                };
                fitted.mixture.sample(rng) * factor
            }
            None => {
                let mean = player.projected_value();
                if mean <= 0.0 {
                    return 0.0;
                }
                let z: f64 = StandardNormal.sample(rng);
                mean + self.config.fallback_std_ratio * mean * z
            }
        };

        draw.max(0.0)
    }

    /// Spread of a player's weekly score: fitted season std, else a fraction of the
    /// expected value
    pub fn variance(&self, player: &Player) -> f64 {
        match self.models.get(&player.player_id) {
            Some(fitted) => fitted.state.season_std,
            None => self.config.fallback_std_ratio * player.projected_value(),
        }
    }

    pub fn get_state(&self, player: &Player) -> Option<&PlayerState> {
        self.models.get(&player.player_id).map(|fitted| &fitted.state)
    }

    pub fn model(&self, player_id: PlayerId) -> Option<&FittedModel> {
        self.models.get(&player_id)
    }

    pub fn has_model(&self, player_id: PlayerId) -> bool {
        self.models.contains_key(&player_id)
    }

    /// Season average from the fitted state, if a model exists
    pub fn season_average(&self, player_id: PlayerId) -> Option<f64> {
        self.models.get(&player_id).map(|fitted| fitted.state.season_avg)
    }

    /// Number of players with a model in memory
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
