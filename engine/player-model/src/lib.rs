//! # Player Performance Model
//!
//! Learns each player's weekly fantasy scoring as a one-dimensional Gaussian mixture,
//! tracks short-term form (hot / normal / cold) and samples future weeks.
//!
//! - **GaussianMixture**: deterministic EM fit over the weekly score history
//! - **PlayerState**: season average, population std, recent form
//! - **PlayerPerformanceModel**: train / restore from cache / sample, with a Normal
//!   fallback for players lacking enough history

pub mod config;
pub mod error;
pub mod gmm;
pub mod model;
pub mod state;

pub use config::{EmConfig, ModelConfig};
pub use error::{ModelError, Result};
pub use gmm::GaussianMixture;
pub use model::{FittedModel, PlayerPerformanceModel};
pub use state::{FormState, PlayerState};

#[cfg(test)]
mod proptests {
    use super::*;
    use league_registry::{Player, Position};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    proptest! {
        #[test]
        fn prop_component_count_bounded(
            scores in prop::collection::vec(0.0f64..40.0, 0..20),
            n_components in 1usize..6,
        ) {
            let config = ModelConfig { n_components, ..Default::default() };
            let mut model = PlayerPerformanceModel::in_memory(config);
            let player = Player::new(1, "P", Position::RunningBack).with_weekly_scores(&scores);

            match model.train(&player, 2024, false) {
                Some(fitted) => {
                    prop_assert!(scores.len() >= 5);
                    prop_assert!(fitted.n_components() <= n_components.min(scores.len() - 1));
                    prop_assert!(fitted.n_components() >= 1);
                }
                None => prop_assert!(scores.len() < 5),
            }
        }

        #[test]
        fn prop_draws_never_negative(
            scores in prop::collection::vec(-5.0f64..30.0, 0..12),
            projection in -10.0f64..30.0,
            seed in any::<u64>(),
        ) {
            let mut model = PlayerPerformanceModel::in_memory(ModelConfig::default());
            let player = Player::new(2, "Q", Position::WideReceiver)
                .with_weekly_scores(&scores)
                .with_projection(projection);
            model.train(&player, 2024, false);

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for draw in model.predict(&player, 50, true, &mut rng) {
                prop_assert!(draw >= 0.0);
            }
        }
    }
}
