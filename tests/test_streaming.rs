/// Streaming delivery: generation order, write/drain alternation, slow
/// consumers and sink failures

use action_gen::{
    audit_text, stream_actions, ActionSink, ConfigError, FlowControlledWriter, GeneratorConfig,
    GeneratorError, Population, PopulationError, PricePolicy, SinkError, StreamingPipeline,
};
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Write(String),
    Drain,
    Close,
}

/// Records every call; optionally fails the nth write
#[derive(Default)]
struct RecordingSink {
    events: Vec<Event>,
    writes: usize,
    fail_on_write: Option<usize>,
}

#[async_trait]
impl ActionSink for RecordingSink {
    async fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        if self.fail_on_write == Some(self.writes) {
            return Err(SinkError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "consumer gone")));
        }
        self.writes += 1;
        self.events.push(Event::Write(line.to_string()));
        Ok(())
    }

    async fn drained(&mut self) -> Result<(), SinkError> {
        self.events.push(Event::Drain);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.events.push(Event::Close);
        Ok(())
    }
}

fn population(symbols: usize, seed: u64) -> (GeneratorConfig, Population) {
    let mut config = GeneratorConfig::new(symbols, 1);
    config.seed = Some(seed);
    let mut rng = config.rng();
    let population = Population::generate(&config.population, &mut rng).unwrap();
    (config, population)
}

#[tokio::test]
async fn test_every_write_waits_for_drain() {
    let (config, pop) = population(4, 1);
    let mut sink = RecordingSink::default();
    StreamingPipeline::new(&pop, config.sampler(), config.rng())
        .run(25, &mut sink)
        .await
        .unwrap();

    // write, drain, write, drain, ..., sentinel, drain, close
    assert_eq!(sink.events.len(), 26 * 2 + 1);
    for pair in sink.events[..52].chunks(2) {
        assert!(matches!(pair[0], Event::Write(_)));
        assert_eq!(pair[1], Event::Drain);
    }
    assert_eq!(sink.events[50], Event::Write("P".to_string()));
    assert_eq!(sink.events[52], Event::Close);
}

#[tokio::test]
async fn test_identifiers_leave_in_order() {
    let (config, pop) = population(3, 2);
    let mut sink = FlowControlledWriter::new(Vec::new(), 256);
    let stats = StreamingPipeline::new(&pop, config.sampler(), config.rng())
        .run(500, &mut sink)
        .await
        .unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let report = audit_text(&text);
    assert!(report.is_valid());
    assert!(report.sequential);
    assert_eq!(report.actions, 500);
    assert_eq!(stats.total_actions(), 500);
    assert_eq!(stats.total_bytes(), text.len() as u64);
    // independent draws: counts vary per symbol but cover the total
    assert_eq!(report.symbols.values().sum::<u64>(), 500);
}

#[tokio::test]
async fn test_zero_total_emits_only_sentinel() {
    let (config, pop) = population(2, 3);
    let mut sink = FlowControlledWriter::new(Vec::new(), 0);
    StreamingPipeline::new(&pop, config.sampler(), config.rng())
        .run(0, &mut sink)
        .await
        .unwrap();
    assert_eq!(sink.into_inner(), b"P\n");
}

#[tokio::test]
async fn test_slow_consumer_receives_complete_stream() {
    let (config, pop) = population(5, 4);
    let (producer_end, mut consumer_end) = tokio::io::duplex(64);

    let consumer = tokio::spawn(async move {
        let mut received = Vec::new();
        let mut chunk = [0u8; 16];
        loop {
            let n = consumer_end.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            tokio::time::sleep(Duration::from_micros(50)).await;
        }
        received
    });

    let mut sink = FlowControlledWriter::new(producer_end, 0);
    let stats = StreamingPipeline::new(&pop, config.sampler(), config.rng())
        .run(200, &mut sink)
        .await
        .unwrap();
    assert_eq!(stats.drain_waits(), 200);

    let text = String::from_utf8(consumer.await.unwrap()).unwrap();
    let report = audit_text(&text);
    assert!(report.is_valid());
    assert!(report.sequential);
    assert_eq!(report.actions, 200);
}

#[tokio::test]
async fn test_sink_failure_aborts_without_sentinel() {
    let (config, pop) = population(2, 5);
    let mut sink = RecordingSink {
        fail_on_write: Some(10),
        ..RecordingSink::default()
    };
    let mut pipeline = StreamingPipeline::new(&pop, config.sampler(), config.rng());
    let result = pipeline.run(100, &mut sink).await;

    assert!(matches!(result, Err(GeneratorError::Sink(SinkError::Io(_)))));
    assert_eq!(sink.writes, 10);
    assert!(!sink.events.contains(&Event::Write("P".to_string())));
    assert!(!sink.events.contains(&Event::Close));
    // the failed action had already taken its identifier
    assert_eq!(pipeline.issued(), 11);
}

#[tokio::test]
async fn test_closed_consumer_is_fatal() {
    let (config, pop) = population(2, 6);
    let (producer_end, consumer_end) = tokio::io::duplex(64);
    drop(consumer_end);

    let mut sink = FlowControlledWriter::new(producer_end, 0);
    let result = StreamingPipeline::new(&pop, config.sampler(), config.rng())
        .run(10, &mut sink)
        .await;
    assert!(matches!(result, Err(GeneratorError::Sink(SinkError::Io(_)))));
}

#[tokio::test]
async fn test_negative_base_price_aborts_before_any_line() {
    let mut config = GeneratorConfig::new(1000, 10);
    config.seed = Some(5);
    config.population.price_mean = 1.0;
    config.population.price_std_dev = 1000.0;

    let mut sink = RecordingSink::default();
    let result = stream_actions(&config, &mut sink).await;

    assert!(matches!(
        result,
        Err(GeneratorError::Population(PopulationError::NonPositivePrice { .. }))
    ));
    assert!(sink.events.is_empty());
}

#[tokio::test]
async fn test_invalid_config_aborts_before_any_line() {
    let mut config = GeneratorConfig::new(2, 2);
    config.population.price_policy = PricePolicy::Resample { max_attempts: 0 };

    let mut sink = RecordingSink::default();
    let result = stream_actions(&config, &mut sink).await;

    assert!(matches!(
        result,
        Err(GeneratorError::Config(ConfigError::ZeroResampleAttempts))
    ));
    assert!(sink.events.is_empty());
}

#[tokio::test]
async fn test_stream_actions_from_config() {
    let mut config = GeneratorConfig::new(3, 4);
    config.seed = Some(8);
    let mut sink = FlowControlledWriter::new(Vec::new(), 0);
    let stats = stream_actions(&config, &mut sink).await.unwrap();

    let report = audit_text(&String::from_utf8(sink.into_inner()).unwrap());
    assert!(report.is_valid());
    assert_eq!(report.actions, 12);
    assert_eq!(stats.total_actions(), 12);
}
