//! Simulator configuration management
//!
//! One TOML document configures every layer: trial counts, the performance model, the
//! model cache, lineup layout, trade and free-agent thresholds, opponent table and
//! logging. Environment variables prefixed `FANTASY_SIM_` override file values.

use anyhow::{anyhow, Context, Result};
use performance_cache::CacheConfig;
use player_model::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::lineup::LineupConfig;
use crate::opponent::OpponentConfig;

/// Main simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub simulation: SimulationSettings,

    pub model: ModelConfig,

    pub cache: CacheConfig,

    pub lineup: LineupConfig,

    pub trade: TradeSettings,

    pub free_agents: FreeAgentSettings,

    pub opponents: OpponentConfig,

    pub logging: LoggingConfig,
}

/// Trial counts and season overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Trials per matchup or season projection
    pub n_simulations: usize,

    /// Run season trials on the rayon thread pool
    pub parallel_trials: bool,

    /// Seed for the driver RNG; entropy when unset
    pub seed: Option<u64>,

    /// Overrides the league's playoff team count
    pub playoff_team_count: Option<usize>,

    /// Overrides the league's regular-season length
    pub reg_season_count: Option<u32>,
}

/// Roster valuation and trade search thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSettings {
    /// Weight of bench players relative to starters
    pub bench_weight: f64,

    /// Same-position 1-for-1 swaps closer than this in value are skipped
    pub boring_trade_threshold: f64,
}

/// Free-agent priority thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeAgentSettings {
    /// Value added above which a pickup is HIGH priority
    pub high_priority_threshold: f64,

    /// Value added above which a pickup is MEDIUM priority
    pub medium_priority_threshold: f64,

    /// Weight for candidates with no incumbent at their position
    pub roster_expansion_weight: f64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            n_simulations: 10_000,
            parallel_trials: true,
            seed: None,
            playoff_team_count: None,
            reg_season_count: None,
        }
    }
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self { bench_weight: 0.3, boring_trade_threshold: 1.0 }
    }
}

impl Default for FreeAgentSettings {
    fn default() -> Self {
        Self {
            high_priority_threshold: 3.0,
            medium_priority_threshold: 1.0,
            roster_expansion_weight: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl SimulatorConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        let config: SimulatorConfig =
            toml::from_str(&content).with_context(|| format!("Invalid config file {path:?}"))?;
        Ok(config)
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Defaults overridden by `FANTASY_SIM_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from an optional file, apply environment overrides, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading configuration from file: {:?}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup using the `FANTASY_SIM_*` names
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = parse_var(&lookup, "FANTASY_SIM_SIMULATIONS")? {
            self.simulation.n_simulations = n;
        }

        if let Some(parallel) = parse_var(&lookup, "FANTASY_SIM_PARALLEL")? {
            self.simulation.parallel_trials = parallel;
        }

        if let Some(seed) = parse_var(&lookup, "FANTASY_SIM_SEED")? {
            self.simulation.seed = Some(seed);
        }

        if let Some(count) = parse_var(&lookup, "FANTASY_SIM_PLAYOFF_TEAMS")? {
            self.simulation.playoff_team_count = Some(count);
        }

        if let Some(weeks) = parse_var(&lookup, "FANTASY_SIM_REG_SEASON_WEEKS")? {
            self.simulation.reg_season_count = Some(weeks);
        }

        if let Some(components) = parse_var(&lookup, "FANTASY_SIM_COMPONENTS")? {
            self.model.n_components = components;
        }

        if let Some(use_mixture) = parse_var(&lookup, "FANTASY_SIM_USE_MIXTURE")? {
            self.model.use_mixture = use_mixture;
        }

        if let Some(cache_dir) = lookup("FANTASY_SIM_CACHE_DIR") {
            self.cache.cache_dir = PathBuf::from(cache_dir);
        }

        if let Some(level) = lookup("FANTASY_SIM_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("FANTASY_SIM_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.simulation.n_simulations == 0 {
            return Err(anyhow!("simulation.n_simulations must be greater than 0"));
        }

        if self.simulation.playoff_team_count == Some(0) {
            return Err(anyhow!("simulation.playoff_team_count must be greater than 0"));
        }

        self.model.validate().map_err(|e| anyhow!("model: {e}"))?;
        self.cache.validate().map_err(|e| anyhow!("cache: {e}"))?;
        self.lineup.validate().map_err(|e| anyhow!("lineup: {e}"))?;
        self.opponents.validate().map_err(|e| anyhow!("opponents: {e}"))?;

        if !(0.0..=1.0).contains(&self.trade.bench_weight) {
            return Err(anyhow!("trade.bench_weight must be in [0, 1]"));
        }

        if self.trade.boring_trade_threshold < 0.0 {
            return Err(anyhow!("trade.boring_trade_threshold must be non-negative"));
        }

        let fa = &self.free_agents;
        if fa.medium_priority_threshold > fa.high_priority_threshold {
            return Err(anyhow!("free_agents: medium threshold exceeds high threshold"));
        }

        if !["pretty", "json", "compact"].contains(&self.logging.format.as_str()) {
            return Err(anyhow!("logging.format must be pretty, json or compact"));
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw.trim().parse().with_context(|| format!("Invalid {key}={raw:?}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
