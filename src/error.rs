/// Run-level errors
///
/// Nothing is recovered locally: every variant aborts the run.

use crate::config::ConfigError;
use crate::population::PopulationError;
use crate::sink::SinkError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("distribution violation: {0}")]
    Population(#[from] PopulationError),

    #[error("sink failure: {0}")]
    Sink(#[from] SinkError),

    #[error("output failure: {0}")]
    Io(#[from] io::Error),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
