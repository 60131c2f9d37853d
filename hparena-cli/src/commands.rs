use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hparena_config::HparenaConfig;
use hparena_core::{FailurePolicy, GrowthStrategy};
use hparena_telemetry::MetricsRecorder;

use crate::circular::{self, CircularReport};
use crate::error::CliError;
use crate::replay::{self, ReplayReport};

#[derive(Parser, Debug)]
#[command(name = "hparena", version, about)]
pub struct Cli {
    /// Configuration file (defaults to config/hparena.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the huge-page failure policy (strict | fallback)
    #[arg(long, global = true)]
    pub policy: Option<FailurePolicy>,

    /// Override the chunk growth strategy (minimum | doubling)
    #[arg(long, global = true)]
    pub growth: Option<GrowthStrategy>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Time pointer chasing through a cycle of page-sized nodes
    Circular(CircularArgs),
    /// Replay an allocation size sequence through a hugepage arena
    Replay(ReplayArgs),
}

/// Where the benchmark nodes live.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryResource {
    /// The global allocator
    Global,
    /// A `bumpalo` bump arena on regular pages
    Bumpalo,
    /// `hparena_core::HugepageArena`
    HugepageArena,
}

#[derive(Args, Debug, Clone)]
pub struct CircularArgs {
    /// The number of objects to be allocated
    #[arg(short = 'n', long = "number-objects", value_name = "N")]
    pub number_objects: usize,
    /// The number of nodes visited, the starting node included
    #[arg(short, long, value_name = "N")]
    pub iterations: u64,
    /// Which memory resource backs the nodes
    #[arg(long, value_enum, default_value_t = MemoryResource::Global)]
    pub memory_resource: MemoryResource,
    /// Link nodes in allocation order instead of a random order
    #[arg(long)]
    pub no_shuffle: bool,
    /// Seed for the shuffle; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Comma separated allocation sizes; defaults to the reference sequence
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<usize>,
    /// Alignment of every allocation
    #[arg(long, default_value_t = 8)]
    pub alignment: usize,
}

pub enum Report {
    Circular(CircularReport),
    Replay(ReplayReport),
}

/// Runs a parsed command against an already resolved configuration.
pub fn run_command(
    command: Commands,
    config: &HparenaConfig,
    metrics: &MetricsRecorder,
) -> Result<Report, CliError> {
    let options = config.arena.options();

    match command {
        Commands::Circular(args) => {
            circular::run(&args, options, metrics).map(Report::Circular)
        }
        Commands::Replay(args) => replay::run(&args, options, metrics).map(Report::Replay),
    }
}

/// Loads configuration and applies command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<HparenaConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => HparenaConfig::load_from_path(path)?,
        None => HparenaConfig::load()?,
    };
    if let Some(policy) = cli.policy {
        config.arena.policy = policy;
    }
    if let Some(growth) = cli.growth {
        config.arena.growth = growth;
    }
    config.telemetry.metrics |= cli.metrics;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_circular_arguments() {
        let cli = Cli::try_parse_from([
            "hparena",
            "circular",
            "-n",
            "1000",
            "-i",
            "50000",
            "--memory-resource",
            "hugepage-arena",
            "--no-shuffle",
            "--policy",
            "strict",
        ])
        .unwrap();

        assert_eq!(cli.policy, Some(FailurePolicy::Strict));
        match cli.command {
            Commands::Circular(args) => {
                assert_eq!(args.number_objects, 1000);
                assert_eq!(args.iterations, 50000);
                assert_eq!(args.memory_resource, MemoryResource::HugepageArena);
                assert!(args.no_shuffle);
                assert_eq!(args.seed, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_replay_sizes() {
        let cli = Cli::try_parse_from([
            "hparena", "replay", "--sizes", "88,1400,320", "--growth", "doubling",
        ])
        .unwrap();
        assert_eq!(cli.growth, Some(GrowthStrategy::Doubling));
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.sizes, vec![88, 1400, 320]);
                assert_eq!(args.alignment, 8);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_policy() {
        let result = Cli::try_parse_from(["hparena", "--policy", "sometimes", "replay"]);
        assert!(result.is_err());
    }

    #[test]
    fn circular_requires_counts() {
        assert!(Cli::try_parse_from(["hparena", "circular", "-n", "10"]).is_err());
    }
}
