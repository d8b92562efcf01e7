/// Action Gen - Synthetic Order Action Generator
///
/// Produces streams of simulated order placements for feeding a matching
/// engine under test. Features include:
/// - Normally distributed symbol/price population
/// - Per-action price jitter around each symbol's base price
/// - Gap-free, strictly increasing order identifiers
/// - Batch delivery (materialize, shuffle, write)
/// - Streaming delivery with drain-based backpressure
/// - Line decoder and stream audit for captured output

pub mod protocol;
pub mod id_allocator;
pub mod population;
pub mod sampler;
pub mod batch;
pub mod sink;
pub mod streaming;
pub mod decoder;
pub mod gap_detector;
pub mod audit;
pub mod stats;
pub mod config;
pub mod error;

pub use protocol::{Action, Side, Symbol, SENTINEL};
pub use id_allocator::IdAllocator;
pub use population::{Population, PopulationConfig, PopulationEntry, PopulationError, PricePolicy};
pub use sampler::ActionSampler;
pub use batch::BatchPipeline;
pub use sink::{ActionSink, FlowControlledWriter, SinkError};
pub use streaming::{stream_actions, StreamingPipeline};
pub use decoder::{Decoder, DecodeError, OrderLine, Record};
pub use gap_detector::GapDetector;
pub use audit::{audit_text, AuditReport, StreamAudit};
pub use stats::{GenerationStats, LatencyStats};
pub use config::{ConfigError, GeneratorConfig};
pub use error::{GeneratorError, GeneratorResult};
