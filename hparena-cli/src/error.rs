use hparena_config::ConfigError;
use hparena_core::ArenaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Allocation failed: {0}")]
    Arena(#[from] ArenaError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
