/// Per-action sampling around a symbol's base price

use crate::id_allocator::IdAllocator;
use crate::population::PopulationEntry;
use crate::protocol::{Action, Side, DEFAULT_QUANTITY};
use rand::Rng;
use rand_distr::StandardNormal;

pub const DEFAULT_JITTER_STD_DEV: f64 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct ActionSampler {
    jitter_std_dev: f64,
    quantity: u32,
}

impl ActionSampler {
    pub fn new(jitter_std_dev: f64, quantity: u32) -> Self {
        ActionSampler {
            jitter_std_dev,
            quantity,
        }
    }

    pub fn jitter_std_dev(&self) -> f64 {
        self.jitter_std_dev
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Draw one action for `entry`, consuming exactly one identifier.
    /// The perturbed price is not clamped and may be non-positive.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        entry: &PopulationEntry,
        ids: &mut IdAllocator,
    ) -> Action {
        let z: f64 = rng.sample(StandardNormal);
        let price = entry.base_price + self.jitter_std_dev * z;
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };

        Action {
            id: ids.next(),
            symbol: entry.symbol.clone(),
            side,
            quantity: self.quantity,
            price,
        }
    }
}

impl Default for ActionSampler {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_STD_DEV, DEFAULT_QUANTITY)
    }
}
