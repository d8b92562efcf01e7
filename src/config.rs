/// Generator configuration
///
/// Defaults reproduce the classic fixture: prices around 42 with spread 8,
/// eight-letter symbols, jitter 0.25, ten lots per order.

use crate::population::{PopulationConfig, PricePolicy};
use crate::protocol::DEFAULT_QUANTITY;
use crate::sampler::{ActionSampler, DEFAULT_JITTER_STD_DEV};
use crate::sink::DEFAULT_HIGH_WATER_MARK;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

pub const DEFAULT_PRICE_MEAN: f64 = 42.0;
pub const DEFAULT_PRICE_STD_DEV: f64 = 8.0;
pub const DEFAULT_SYMBOL_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("population size must be positive")]
    EmptyPopulation,

    #[error("symbol length must be positive")]
    EmptySymbol,

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("resample attempts must be positive")]
    ZeroResampleAttempts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub population: PopulationConfig,
    /// Spread of each action's price around its symbol's base price
    pub jitter_std_dev: f64,
    pub quantity: u32,
    /// Actions per symbol (batch) or the default total multiplier (streaming)
    pub actions_per_symbol: usize,
    /// Explicit total for streaming runs; defaults to size * actions_per_symbol
    pub total_actions: Option<u64>,
    pub high_water_mark: usize,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            population: PopulationConfig {
                size: 1,
                price_mean: DEFAULT_PRICE_MEAN,
                price_std_dev: DEFAULT_PRICE_STD_DEV,
                symbol_len: DEFAULT_SYMBOL_LEN,
                price_policy: PricePolicy::Strict,
            },
            jitter_std_dev: DEFAULT_JITTER_STD_DEV,
            quantity: DEFAULT_QUANTITY,
            actions_per_symbol: 1,
            total_actions: None,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn new(symbols: usize, actions_per_symbol: usize) -> Self {
        let mut config = Self::default();
        config.population.size = symbols;
        config.actions_per_symbol = actions_per_symbol;
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pop = &self.population;
        if pop.size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if pop.symbol_len == 0 {
            return Err(ConfigError::EmptySymbol);
        }
        check_finite("price mean", pop.price_mean)?;
        check_non_negative("price std dev", pop.price_std_dev)?;
        check_non_negative("jitter std dev", self.jitter_std_dev)?;
        if self.quantity == 0 {
            return Err(ConfigError::ZeroQuantity);
        }
        if pop.price_policy == (PricePolicy::Resample { max_attempts: 0 }) {
            return Err(ConfigError::ZeroResampleAttempts);
        }
        Ok(())
    }

    /// Streaming loop bound
    pub fn streaming_total(&self) -> u64 {
        self.total_actions
            .unwrap_or((self.population.size as u64).saturating_mul(self.actions_per_symbol as u64))
    }

    pub fn sampler(&self) -> ActionSampler {
        ActionSampler::new(self.jitter_std_dev, self.quantity)
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(name, value)?;
    if value < 0.0 {
        Err(ConfigError::Negative { name, value })
    } else {
        Ok(())
    }
}
