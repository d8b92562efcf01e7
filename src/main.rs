//! gen-actions - synthetic order action generator
//!
//! Writes `O <id> <symbol> <B|S> <qty> <price>` lines followed by `P`.
//!
//! # Usage
//!
//! ```bash
//! gen-actions batch 100 1000 --output actions.txt
//! gen-actions stream 100 1000 | matching-engine
//! gen-actions audit --input actions.txt
//! ```
//!
//! Logs go to stderr; filter with `RUST_LOG` (default: info).

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use action_gen::{
    audit::StreamAudit, stream_actions, BatchPipeline, FlowControlledWriter, GeneratorConfig,
    GeneratorError, Population, PricePolicy,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gen-actions")]
#[command(about = "Generate simulated order actions for a matching engine under test")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Materialize every action, shuffle, then write
    Batch {
        #[command(flatten)]
        opts: GenArgs,

        /// Output file (stdout when omitted)
        #[arg(long, short, env = "ACTION_GEN_OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Generate and write one action at a time with backpressure
    Stream {
        #[command(flatten)]
        opts: GenArgs,

        /// Total actions to emit (default: SYMBOLS * ACTIONS_PER_SYMBOL)
        #[arg(long, env = "ACTION_GEN_TOTAL")]
        total: Option<u64>,

        /// Buffered bytes before the producer waits for the sink (0 = every line)
        #[arg(long, env = "ACTION_GEN_HIGH_WATER_MARK", default_value_t = action_gen::sink::DEFAULT_HIGH_WATER_MARK)]
        high_water_mark: usize,
    },
    /// Check a captured stream for gaps, duplicates and termination
    Audit {
        /// Input file (stdin when omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenArgs {
    /// Number of distinct symbols
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    symbols: u64,

    /// Actions per symbol
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    actions_per_symbol: u64,

    /// RNG seed for reproducible output
    #[arg(long, env = "ACTION_GEN_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "ACTION_GEN_PRICE_MEAN", default_value_t = action_gen::config::DEFAULT_PRICE_MEAN)]
    price_mean: f64,

    #[arg(long, env = "ACTION_GEN_PRICE_STD_DEV", default_value_t = action_gen::config::DEFAULT_PRICE_STD_DEV)]
    price_std_dev: f64,

    #[arg(long, env = "ACTION_GEN_SYMBOL_LEN", default_value_t = action_gen::config::DEFAULT_SYMBOL_LEN)]
    symbol_len: usize,

    /// Spread of each action's price around its symbol's base price
    #[arg(long, env = "ACTION_GEN_JITTER", default_value_t = action_gen::sampler::DEFAULT_JITTER_STD_DEV)]
    jitter: f64,

    #[arg(long, env = "ACTION_GEN_QUANTITY", default_value_t = action_gen::protocol::DEFAULT_QUANTITY)]
    quantity: u32,

    /// Redraw non-positive base prices up to N times instead of failing
    #[arg(long, env = "ACTION_GEN_RESAMPLE_ATTEMPTS")]
    resample_attempts: Option<u32>,
}

impl GenArgs {
    fn into_config(self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(self.symbols as usize, self.actions_per_symbol as usize);
        config.seed = self.seed;
        config.population.price_mean = self.price_mean;
        config.population.price_std_dev = self.price_std_dev;
        config.population.symbol_len = self.symbol_len;
        config.population.price_policy = match self.resample_attempts {
            Some(max_attempts) => PricePolicy::Resample { max_attempts },
            None => PricePolicy::Strict,
        };
        config.jitter_std_dev = self.jitter;
        config.quantity = self.quantity;
        config
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_batch(config: &GeneratorConfig, output: Option<PathBuf>) -> Result<(), GeneratorError> {
    config.validate()?;
    let mut rng = config.rng();
    // population first: a distribution violation must leave no output behind
    let population = Population::generate(&config.population, &mut rng)?;

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let mut pipeline = BatchPipeline::new(&population, config.sampler(), rng);
    let stats = pipeline.run(config.actions_per_symbol, out)?;
    stats.log_summary();
    Ok(())
}

async fn run_stream(config: &GeneratorConfig) -> Result<(), GeneratorError> {
    let mut sink = FlowControlledWriter::new(tokio::io::stdout(), config.high_water_mark);
    let stats = stream_actions(config, &mut sink).await?;
    stats.log_summary();
    Ok(())
}

fn run_audit(input: Option<PathBuf>) -> Result<bool, GeneratorError> {
    let mut audit = StreamAudit::new();
    match input {
        Some(path) => audit.process_reader(BufReader::new(File::open(path)?))?,
        None => audit.process_reader(io::stdin().lock())?,
    }
    let report = audit.finish();

    tracing::info!(
        actions = report.actions,
        symbols = report.symbols.len(),
        terminated = report.is_terminated(),
        sequential = report.sequential,
        gaps = report.gaps.len(),
        missing = report.missing,
        duplicates = report.duplicates.len(),
        malformed = report.malformed.len(),
        "audit complete"
    );
    for (line, err) in report.malformed.iter().take(10) {
        tracing::warn!(line, error = %err, "malformed line");
    }
    Ok(report.is_valid())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Command::Batch { opts, output } => run_batch(&opts.into_config(), output).map(|_| true),
        Command::Stream {
            opts,
            total,
            high_water_mark,
        } => {
            let mut config = opts.into_config();
            config.total_actions = total;
            config.high_water_mark = high_water_mark;
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(GeneratorError::from)
                .and_then(|rt| rt.block_on(run_stream(&config)))
                .map(|_| true)
        }
        Command::Audit { input } => run_audit(input),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
