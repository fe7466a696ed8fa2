//! One-dimensional Gaussian mixture fit by expectation-maximisation
//!
//! Fitting is deterministic: components start at evenly spaced quantiles of the data with
//! the pooled variance, so the same history always yields the same mixture.

use crate::config::EmConfig;
use crate::error::{ModelError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Fitted mixture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianMixture {
    weights: Vec<f64>,
    means: Vec<f64>,
    variances: Vec<f64>,
    converged: bool,
    iterations: usize,
    log_likelihood: f64,
}

impl GaussianMixture {
    /// Fit `n_components` Gaussians to `data`
    pub fn fit(data: &[f64], n_components: usize, config: &EmConfig) -> Result<Self> {
        if n_components == 0 {
            return Err(ModelError::Config("mixture needs at least one component".to_string()));
        }
        if data.len() < n_components {
            return Err(ModelError::InsufficientData { needed: n_components, got: data.len() });
        }
        if let Some(bad) = data.iter().find(|x| !x.is_finite()) {
            return Err(ModelError::InvalidData(format!("non-finite score {bad}")));
        }

        let n = data.len() as f64;
        let pooled_mean = data.iter().sum::<f64>() / n;
        let pooled_var = data.iter().map(|x| (x - pooled_mean).powi(2)).sum::<f64>() / n;

        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);

        let k = n_components as f64;
        let mut mixture = Self {
            weights: vec![1.0 / k; n_components],
            means: (0..n_components).map(|j| quantile(&sorted, (j as f64 + 0.5) / k)).collect(),
            variances: vec![pooled_var + config.reg_covar; n_components],
            converged: false,
            iterations: 0,
            log_likelihood: f64::NEG_INFINITY,
        };

        let mut responsibilities = vec![vec![0.0; n_components]; data.len()];
        let mut previous = f64::NEG_INFINITY;

        for iteration in 1..=config.max_iterations {
            let log_likelihood = mixture.expectation(data, &mut responsibilities);
            mixture.maximization(data, &responsibilities, config.reg_covar);
            mixture.iterations = iteration;
            mixture.log_likelihood = log_likelihood;

            if (log_likelihood - previous).abs() < config.tolerance {
                mixture.converged = true;
                break;
            }
            previous = log_likelihood;
        }

        Ok(mixture)
    }

    /// Fill per-observation component responsibilities; returns the total log-likelihood
    fn expectation(&self, data: &[f64], responsibilities: &mut [Vec<f64>]) -> f64 {
        let mut total = 0.0;

        for (x, row) in data.iter().zip(responsibilities.iter_mut()) {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = self.weights[j].ln() + log_normal_pdf(*x, self.means[j], self.variances[j]);
            }

            // log-sum-exp
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let log_norm = max + row.iter().map(|v| (v - max).exp()).sum::<f64>().ln();

            for slot in row.iter_mut() {
                *slot = (*slot - log_norm).exp();
            }
            total += log_norm;
        }

        total
    }

    fn maximization(&mut self, data: &[f64], responsibilities: &[Vec<f64>], reg_covar: f64) {
        let n = data.len() as f64;

        for j in 0..self.weights.len() {
            // Keeps empty components from dividing by zero
            let nk = responsibilities.iter().map(|r| r[j]).sum::<f64>() + 10.0 * f64::EPSILON;

            let mean =
                data.iter().zip(responsibilities).map(|(x, r)| r[j] * x).sum::<f64>() / nk;
            let variance = data
                .iter()
                .zip(responsibilities)
                .map(|(x, r)| r[j] * (x - mean).powi(2))
                .sum::<f64>()
                / nk
                + reg_covar;

            self.weights[j] = nk / n;
            self.means[j] = mean;
            self.variances[j] = variance;
        }

        let total: f64 = self.weights.iter().sum();
        for w in &mut self.weights {
            *w /= total;
        }
    }

    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Expected value of the mixture
    pub fn mean(&self) -> f64 {
        self.weights.iter().zip(&self.means).map(|(w, m)| w * m).sum()
    }

    /// Variance of the mixture (law of total variance)
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        let second_moment: f64 = self
            .weights
            .iter()
            .zip(self.means.iter().zip(&self.variances))
            .map(|(w, (m, v))| w * (v + m * m))
            .sum();
        (second_moment - mean * mean).max(0.0)
    }

    /// Draw one value: pick a component by weight, then sample its Gaussian
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let component = match WeightedIndex::new(&self.weights) {
            Ok(index) => index.sample(rng),
            Err(_) => 0,
        };
        let z: f64 = StandardNormal.sample(rng);
        self.means[component] + self.variances[component].sqrt() * z
    }
}

fn log_normal_pdf(x: f64, mean: f64, variance: f64) -> f64 {
    -0.5 * ((2.0 * PI * variance).ln() + (x - mean).powi(2) / variance)
}

/// Linear-interpolated quantile of already sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_mean(data: &[f64]) -> f64 {
        data.iter().sum::<f64>() / data.len() as f64
    }

    #[test]
    fn test_single_component_matches_moments() {
        let data = [15.0, 20.0, 10.0, 18.0, 12.0, 16.0, 14.0, 17.0];
        let config = EmConfig::default();
        let gmm = GaussianMixture::fit(&data, 1, &config).unwrap();

        let mean = sample_mean(&data);
        let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64;

        assert!(gmm.converged());
        assert!((gmm.mean() - mean).abs() < 1e-9);
        assert!((gmm.variance() - (var + config.reg_covar)).abs() < 1e-9);
    }

    #[test]
    fn test_bimodal_history_separates() {
        let data = [2.0, 3.0, 2.5, 3.5, 2.0, 20.0, 21.0, 22.0, 19.0, 20.5];
        let gmm = GaussianMixture::fit(&data, 2, &EmConfig::default()).unwrap();

        let mut means = gmm.means().to_vec();
        means.sort_by(f64::total_cmp);
        assert!((means[0] - 2.6).abs() < 0.5, "low component at {}", means[0]);
        assert!((means[1] - 20.5).abs() < 0.5, "high component at {}", means[1]);
        assert!((gmm.weights().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixture_mean_equals_data_mean() {
        let data = [15.2, 18.3, 12.1, 20.5, 14.8, 16.9, 11.2, 19.4, 17.1, 13.6];
        let gmm = GaussianMixture::fit(&data, 3, &EmConfig::default()).unwrap();
        assert!((gmm.mean() - sample_mean(&data)).abs() < 1e-6);
    }

    #[test]
    fn test_constant_history() {
        let data = [10.0; 6];
        let gmm = GaussianMixture::fit(&data, 3, &EmConfig::default()).unwrap();

        assert_eq!(gmm.n_components(), 3);
        assert!((gmm.mean() - 10.0).abs() < 1e-9);
        assert!(gmm.variances().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_fit_errors() {
        let config = EmConfig::default();
        assert!(matches!(
            GaussianMixture::fit(&[1.0, 2.0], 3, &config),
            Err(ModelError::InsufficientData { needed: 3, got: 2 })
        ));
        assert!(matches!(
            GaussianMixture::fit(&[1.0, f64::NAN, 2.0], 1, &config),
            Err(ModelError::InvalidData(_))
        ));
        assert!(matches!(GaussianMixture::fit(&[1.0], 0, &config), Err(ModelError::Config(_))));
    }

    #[test]
    fn test_samples_follow_mixture_mean() {
        let data = [15.0, 16.0, 14.0, 17.0, 15.5, 16.5, 14.5, 15.8];
        let gmm = GaussianMixture::fit(&data, 3, &EmConfig::default()).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let draws: Vec<f64> = (0..5000).map(|_| gmm.sample(&mut rng)).collect();

        assert!((sample_mean(&draws) - gmm.mean()).abs() < 0.2);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
    }
}
