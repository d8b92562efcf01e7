/// Batch delivery
///
/// Materializes every action up front (N symbols x M actions each), shuffles
/// them uniformly and writes them in one synchronous pass, then the sentinel.

use crate::error::GeneratorResult;
use crate::id_allocator::IdAllocator;
use crate::population::Population;
use crate::protocol::{Action, SENTINEL};
use crate::sampler::ActionSampler;
use crate::stats::GenerationStats;
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::{BufWriter, Write};

pub struct BatchPipeline<'a, R> {
    population: &'a Population,
    sampler: ActionSampler,
    rng: R,
    ids: IdAllocator,
}

impl<'a, R: Rng> BatchPipeline<'a, R> {
    pub fn new(population: &'a Population, sampler: ActionSampler, rng: R) -> Self {
        BatchPipeline {
            population,
            sampler,
            rng,
            ids: IdAllocator::new(),
        }
    }

    /// Exactly `per_symbol` actions for every symbol, in shuffled order.
    /// Identifiers are issued in generation order, before the shuffle.
    pub fn generate(&mut self, per_symbol: usize) -> Vec<Action> {
        // an overflowing product cannot be materialized anyway; skip the reservation
        let capacity = self.population.len().checked_mul(per_symbol).unwrap_or(0);
        let mut actions = Vec::with_capacity(capacity);
        for entry in self.population.entries() {
            for _ in 0..per_symbol {
                actions.push(self.sampler.sample(&mut self.rng, entry, &mut self.ids));
            }
        }
        actions.shuffle(&mut self.rng);
        actions
    }

    /// Generate, shuffle and write everything followed by the sentinel
    pub fn run<W: Write>(&mut self, per_symbol: usize, out: W) -> GeneratorResult<GenerationStats> {
        let mut stats = GenerationStats::new();
        stats.start();

        let actions = self.generate(per_symbol);
        tracing::info!(
            symbols = self.population.len(),
            per_symbol,
            actions = actions.len(),
            "batch materialized"
        );

        let mut out = BufWriter::new(out);
        let mut line = String::with_capacity(64);
        for action in &actions {
            line.clear();
            action.encode_into(&mut line);
            out.write_all(line.as_bytes())?;
            stats.record_action(&action.symbol, line.len());
        }
        writeln!(out, "{}", SENTINEL)?;
        stats.record_bytes(SENTINEL.len() + 1);
        out.flush()?;

        stats.finish();
        Ok(stats)
    }

    /// Identifiers issued so far
    pub fn issued(&self) -> u64 {
        self.ids.issued()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::PopulationEntry;
    use crate::protocol::Symbol;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population() -> Population {
        Population::from_entries(vec![
            PopulationEntry {
                symbol: Symbol::new("AAAAAAAA").unwrap(),
                base_price: 10.0,
            },
            PopulationEntry {
                symbol: Symbol::new("BBBBBBBB").unwrap(),
                base_price: 20.0,
            },
        ])
    }

    #[test]
    fn test_generate_counts() {
        let pop = population();
        let mut batch = BatchPipeline::new(&pop, ActionSampler::default(), StdRng::seed_from_u64(1));
        let actions = batch.generate(3);
        assert_eq!(actions.len(), 6);
        assert_eq!(batch.issued(), 6);

        let mut ids: Vec<u64> = actions.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(actions.iter().filter(|a| a.symbol.as_str() == "AAAAAAAA").count(), 3);
    }

    #[test]
    fn test_run_ends_with_sentinel() {
        let pop = population();
        let mut batch = BatchPipeline::new(&pop, ActionSampler::default(), StdRng::seed_from_u64(2));
        let mut out = Vec::new();
        let stats = batch.run(2, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.last(), Some(&"P"));
        assert_eq!(stats.total_actions(), 4);
        assert_eq!(stats.total_bytes(), text.len() as u64);
    }

    #[test]
    fn test_zero_per_symbol_emits_only_sentinel() {
        let pop = population();
        let mut batch = BatchPipeline::new(&pop, ActionSampler::default(), StdRng::seed_from_u64(3));
        let mut out = Vec::new();
        batch.run(0, &mut out).unwrap();
        assert_eq!(out, b"P\n");
    }

    #[test]
    fn test_empty_population_with_huge_quota() {
        let pop = Population::from_entries(Vec::new());
        let mut batch = BatchPipeline::new(&pop, ActionSampler::default(), StdRng::seed_from_u64(4));
        assert!(batch.generate(usize::MAX).is_empty());

        let mut out = Vec::new();
        batch.run(usize::MAX, &mut out).unwrap();
        assert_eq!(out, b"P\n");
    }
}
