//! ## hparena-cli
//! **Workload driver for the hugepage arena**
//! Runs the pointer-chasing benchmark against several memory resources and
//! replays allocation size sequences through a configured arena.
//!
//! ### Expectations:
//! - Configuration from `config/hparena.yaml` and `HPARENA_*`, overridable per run
//! - Arena footprint logged after every arena-backed command

use clap::Parser;
use hparena_telemetry::{EventLogger, MetricsRecorder};

mod circular;
mod commands;
mod error;
mod replay;

use commands::{Cli, Report};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = commands::resolve_config(&cli)?;

    EventLogger::init(&config.telemetry.log_level);
    let metrics = MetricsRecorder::new()?;

    match commands::run_command(cli.command, &config, &metrics)? {
        Report::Circular(report) => {
            println!(
                "{:?}: {} ms (final node {})",
                report.resource,
                report.elapsed.as_millis(),
                report.final_node
            );
            if let Some(stats) = report.arena {
                println!("{stats}");
            }
        }
        Report::Replay(report) => {
            println!(
                "{} allocations, {} bytes requested in {} us",
                report.allocations,
                report.bytes_requested,
                report.elapsed.as_micros()
            );
            println!("{}", report.stats);
        }
    }

    if config.telemetry.metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}
