/// Symbol/price population
///
/// Draws N distinct symbols, each paired with a base price from a normal
/// distribution. Every action later sampled is centered on one of these prices.

use crate::protocol::Symbol;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;
use thiserror::Error;

const ALPHABET_SIZE: u128 = 26;

/// Redraws allowed per symbol before giving up on finding an unused label
const MAX_SYMBOL_ATTEMPTS: u32 = 1_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PopulationError {
    #[error("invalid price distribution: {0}")]
    Distribution(String),

    #[error("base price {price} for symbol #{index} is not positive")]
    NonPositivePrice { index: usize, price: f64 },

    #[error("no positive base price for symbol #{index} after {attempts} draws")]
    ResampleExhausted { index: usize, attempts: u32 },

    #[error("cannot draw {requested} distinct symbols of length {len}: only {capacity} exist")]
    SymbolSpaceExhausted { requested: usize, len: usize, capacity: u128 },

    #[error("could not find an unused symbol after {0} draws")]
    SymbolCollision(u32),
}

/// What to do with a non-positive base price draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricePolicy {
    /// Any non-positive draw fails the whole population
    #[default]
    Strict,
    /// Redraw that one sample, up to `max_attempts` draws in total
    Resample { max_attempts: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    pub size: usize,
    pub price_mean: f64,
    pub price_std_dev: f64,
    pub symbol_len: usize,
    pub price_policy: PricePolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            size: 1,
            price_mean: 42.0,
            price_std_dev: 8.0,
            symbol_len: 8,
            price_policy: PricePolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEntry {
    pub symbol: Symbol,
    pub base_price: f64,
}

#[derive(Debug, Clone)]
pub struct Population {
    entries: Vec<PopulationEntry>,
}

impl Population {
    /// Generate a population; fails before anything is emitted if the
    /// distribution or symbol space cannot satisfy the request
    pub fn generate<R: Rng + ?Sized>(
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Result<Self, PopulationError> {
        let capacity = symbol_capacity(config.symbol_len);
        if (config.size as u128) > capacity {
            return Err(PopulationError::SymbolSpaceExhausted {
                requested: config.size,
                len: config.symbol_len,
                capacity,
            });
        }

        if !config.price_mean.is_finite() {
            return Err(PopulationError::Distribution(format!(
                "mean {} is not finite",
                config.price_mean
            )));
        }
        if !(config.price_std_dev.is_finite() && config.price_std_dev >= 0.0) {
            return Err(PopulationError::Distribution(format!(
                "std dev {} must be finite and non-negative",
                config.price_std_dev
            )));
        }
        let dist = Normal::new(config.price_mean, config.price_std_dev)
            .map_err(|e| PopulationError::Distribution(e.to_string()))?;

        let prices = draw_prices(&dist, config, rng)?;
        let symbols = draw_symbols(config.size, config.symbol_len, rng)?;

        let entries: Vec<PopulationEntry> = symbols
            .into_iter()
            .zip(prices)
            .map(|(symbol, base_price)| PopulationEntry { symbol, base_price })
            .collect();

        tracing::debug!(
            size = entries.len(),
            mean = config.price_mean,
            std_dev = config.price_std_dev,
            "population generated"
        );

        Ok(Population { entries })
    }

    /// Build from explicit entries
    pub fn from_entries(entries: Vec<PopulationEntry>) -> Self {
        Population { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PopulationEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PopulationEntry> {
        self.entries.get(index)
    }

    /// Uniform pick, independent per call
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PopulationEntry> {
        self.entries.choose(rng)
    }

    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.symbol.as_str() == symbol)
            .map(|e| e.base_price)
    }
}

fn symbol_capacity(len: usize) -> u128 {
    // saturate: anything past 26^27 is effectively unbounded here
    u32::try_from(len)
        .ok()
        .and_then(|exp| ALPHABET_SIZE.checked_pow(exp))
        .unwrap_or(u128::MAX)
}

fn draw_prices<R: Rng + ?Sized>(
    dist: &Normal<f64>,
    config: &PopulationConfig,
    rng: &mut R,
) -> Result<Vec<f64>, PopulationError> {
    match config.price_policy {
        PricePolicy::Strict => {
            let prices: Vec<f64> = (0..config.size).map(|_| dist.sample(rng)).collect();
            match prices.iter().position(|&p| p <= 0.0) {
                Some(index) => Err(PopulationError::NonPositivePrice {
                    index,
                    price: prices[index],
                }),
                None => Ok(prices),
            }
        }
        PricePolicy::Resample { max_attempts } => (0..config.size)
            .map(|index| {
                (0..max_attempts)
                    .map(|_| dist.sample(rng))
                    .find(|&p| p > 0.0)
                    .ok_or(PopulationError::ResampleExhausted {
                        index,
                        attempts: max_attempts,
                    })
            })
            .collect(),
    }
}

fn draw_symbols<R: Rng + ?Sized>(
    count: usize,
    len: usize,
    rng: &mut R,
) -> Result<Vec<Symbol>, PopulationError> {
    let mut seen = HashSet::with_capacity(count);
    let mut symbols = Vec::with_capacity(count);

    for _ in 0..count {
        let mut attempts = 0;
        let symbol = loop {
            if attempts == MAX_SYMBOL_ATTEMPTS {
                return Err(PopulationError::SymbolCollision(attempts));
            }
            attempts += 1;
            let candidate = Symbol::random(rng, len);
            if seen.insert(candidate.clone()) {
                break candidate;
            }
            tracing::trace!(symbol = %candidate, "symbol collision, redrawing");
        };
        symbols.push(symbol);
    }

    Ok(symbols)
}
