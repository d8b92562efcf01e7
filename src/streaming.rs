/// Streaming delivery
///
/// Generates one action at a time against a uniformly chosen symbol and hands
/// it to a flow-controlled sink, waiting for the drain signal after every
/// line. Emission order is generation order, so identifiers leave strictly
/// increasing. Per-symbol counts drift: symbols are drawn independently per
/// action, not from a quota.

use crate::config::GeneratorConfig;
use crate::error::GeneratorResult;
use crate::id_allocator::IdAllocator;
use crate::population::Population;
use crate::protocol::SENTINEL;
use crate::sampler::ActionSampler;
use crate::sink::ActionSink;
use crate::stats::GenerationStats;
use rand::Rng;
use std::time::Instant;

pub struct StreamingPipeline<'a, R> {
    population: &'a Population,
    sampler: ActionSampler,
    rng: R,
    ids: IdAllocator,
}

impl<'a, R: Rng> StreamingPipeline<'a, R> {
    pub fn new(population: &'a Population, sampler: ActionSampler, rng: R) -> Self {
        StreamingPipeline {
            population,
            sampler,
            rng,
            ids: IdAllocator::new(),
        }
    }

    /// Emit `total` actions then the sentinel. Any sink failure aborts the
    /// run immediately; a failed run never carries a sentinel.
    pub async fn run<S: ActionSink>(&mut self, total: u64, sink: &mut S) -> GeneratorResult<GenerationStats> {
        let mut stats = GenerationStats::new();
        stats.start();
        tracing::info!(symbols = self.population.len(), total, "streaming started");

        let mut line = String::with_capacity(64);
        for _ in 0..total {
            let entry = match self.population.choose(&mut self.rng) {
                Some(entry) => entry,
                None => break,
            };
            let action = self.sampler.sample(&mut self.rng, entry, &mut self.ids);

            line.clear();
            action.encode_into(&mut line);
            let body = line.trim_end_matches('\n');
            sink.write_line(body).await?;
            stats.record_action(&action.symbol, line.len());

            let started = Instant::now();
            sink.drained().await?;
            stats.record_drain_latency(started.elapsed());
        }

        sink.write_line(SENTINEL).await?;
        stats.record_bytes(SENTINEL.len() + 1);
        sink.drained().await?;
        sink.close().await?;

        stats.finish();
        Ok(stats)
    }

    /// Identifiers issued so far
    pub fn issued(&self) -> u64 {
        self.ids.issued()
    }
}

/// Validate, draw the population, then stream into `sink`. Configuration
/// and population failures return before the sink sees any call.
pub async fn stream_actions<S: ActionSink>(
    config: &GeneratorConfig,
    sink: &mut S,
) -> GeneratorResult<GenerationStats> {
    config.validate()?;
    let mut rng = config.rng();
    let population = Population::generate(&config.population, &mut rng)?;
    StreamingPipeline::new(&population, config.sampler(), rng)
        .run(config.streaming_total(), sink)
        .await
}
