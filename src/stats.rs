/// Generation statistics
///
/// Tracks actions/sec, bytes emitted, per-symbol counts and how long the
/// producer spent waiting on the sink to drain.

use crate::protocol::Symbol;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

const WINDOW_SIZE: usize = 10000;

#[derive(Debug, Clone, Copy)]
pub struct LatencyStats {
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p99_us: u64,
}

#[derive(Debug, Clone)]
pub struct GenerationStats {
    start_time: Option<Instant>,
    finish_time: Option<Instant>,
    total_actions: u64,
    total_bytes: u64,
    per_symbol: HashMap<Symbol, u64>,

    // Time spent suspended on drain, in microseconds
    drain_latencies: VecDeque<u64>,
    drain_waits: u64,
}

impl GenerationStats {
    pub fn new() -> Self {
        GenerationStats {
            start_time: None,
            finish_time: None,
            total_actions: 0,
            total_bytes: 0,
            per_symbol: HashMap::new(),
            drain_latencies: VecDeque::with_capacity(WINDOW_SIZE),
            drain_waits: 0,
        }
    }

    /// Mark the start of the run; the first recorded action also does this
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Record one emitted action line of `size` bytes
    pub fn record_action(&mut self, symbol: &Symbol, size: usize) {
        self.start();
        self.total_actions += 1;
        self.total_bytes += size as u64;
        *self.per_symbol.entry(symbol.clone()).or_insert(0) += 1;
    }

    /// Record bytes that are not actions (the sentinel)
    pub fn record_bytes(&mut self, size: usize) {
        self.total_bytes += size as u64;
    }

    /// Record time spent waiting for the sink to drain
    pub fn record_drain_latency(&mut self, wait: Duration) {
        if self.drain_latencies.len() >= WINDOW_SIZE {
            self.drain_latencies.pop_front();
        }
        self.drain_latencies.push_back(wait.as_micros() as u64);
        self.drain_waits += 1;
    }

    pub fn finish(&mut self) {
        self.start();
        self.finish_time = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| match self.finish_time {
            Some(end) => end.duration_since(st),
            None => st.elapsed(),
        })
    }

    pub fn actions_per_sec(&self) -> f64 {
        self.rate(self.total_actions)
    }

    pub fn bytes_per_sec(&self) -> f64 {
        self.rate(self.total_bytes)
    }

    fn rate(&self, count: u64) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed.as_secs_f64() > 0.0 => count as f64 / elapsed.as_secs_f64(),
            _ => 0.0,
        }
    }

    pub fn drain_latency_stats(&self) -> Option<LatencyStats> {
        if self.drain_latencies.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = self.drain_latencies.iter().copied().collect();
        sorted.sort_unstable();

        Some(LatencyStats {
            min_us: sorted[0],
            max_us: sorted[sorted.len() - 1],
            mean_us: sorted.iter().sum::<u64>() as f64 / sorted.len() as f64,
            p50_us: sorted[sorted.len() / 2],
            p99_us: sorted[(sorted.len() * 99) / 100],
        })
    }

    pub fn total_actions(&self) -> u64 {
        self.total_actions
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn drain_waits(&self) -> u64 {
        self.drain_waits
    }

    /// Emit a summary through tracing
    pub fn log_summary(&self) {
        tracing::info!(
            actions = self.total_actions,
            bytes = self.total_bytes,
            symbols = self.per_symbol.len(),
            elapsed_ms = self.elapsed().map(|e| e.as_millis() as u64).unwrap_or(0),
            actions_per_sec = self.actions_per_sec(),
            "generation complete"
        );

        if let Some(stats) = self.drain_latency_stats() {
            tracing::info!(
                waits = self.drain_waits,
                min_us = stats.min_us,
                max_us = stats.max_us,
                mean_us = stats.mean_us,
                p50_us = stats.p50_us,
                p99_us = stats.p99_us,
                "drain latency"
            );
        }
    }
}

impl Default for GenerationStats {
    fn default() -> Self {
        Self::new()
    }
}
