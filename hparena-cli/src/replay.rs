//! Allocation-trace replay.
//!
//! Feeds a size sequence through one arena and touches every byte, the way a
//! compression workload fills its working buffers.

use std::time::{Duration, Instant};

use hparena_core::{ArenaOptions, ArenaStats, HugepageArena};
use hparena_telemetry::{EventLogger, MetricsRecorder};
use tracing::{debug, info};

use crate::commands::ReplayArgs;
use crate::error::CliError;

/// Buffer sizes requested by an LZ compressor setting up its state.
pub const REFERENCE_SIZES: [usize; 9] = [88, 1400, 320, 112, 216, 4272, 184, 28352, 4194304];

/// Small nodes allocated after the reference buffers.
pub const TRAILING_NODES: usize = 400;

#[derive(Debug)]
pub struct ReplayReport {
    pub allocations: usize,
    pub bytes_requested: usize,
    pub elapsed: Duration,
    pub stats: ArenaStats,
}

pub fn default_sizes() -> Vec<usize> {
    REFERENCE_SIZES
        .iter()
        .copied()
        .chain(std::iter::repeat(112).take(TRAILING_NODES))
        .collect()
}

pub fn run(
    args: &ReplayArgs,
    options: ArenaOptions,
    metrics: &MetricsRecorder,
) -> Result<ReplayReport, CliError> {
    let sizes = if args.sizes.is_empty() {
        default_sizes()
    } else {
        args.sizes.clone()
    };

    info!(
        allocations = sizes.len(),
        alignment = args.alignment,
        policy = %options.policy,
        growth = %options.growth,
        "Replaying allocation sequence"
    );

    let arena = HugepageArena::with_options(options);
    let start = Instant::now();
    let mut bytes_requested = 0usize;
    for (index, &size) in sizes.iter().enumerate() {
        let buffer = arena.alloc_bytes(size, args.alignment)?;
        buffer.fill(0xA5);
        bytes_requested += size;
        debug!(index, size, chunks = arena.chunk_count(), "allocated");
    }
    let elapsed = start.elapsed();

    let stats = arena.stats();
    EventLogger::log_arena_stats("replay", &stats);
    metrics.record_arena(&stats);

    Ok(ReplayReport {
        allocations: sizes.len(),
        bytes_requested,
        elapsed,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hparena_core::{FailurePolicy, GrowthStrategy};

    #[test]
    fn reference_sequence_fits_in_predictable_chunks() {
        let metrics = MetricsRecorder::new().unwrap();
        let args = ReplayArgs {
            sizes: Vec::new(),
            alignment: 8,
        };
        let report = run(
            &args,
            ArenaOptions::new(FailurePolicy::FallbackToRegularPages),
            &metrics,
        )
        .unwrap();

        assert_eq!(report.allocations, REFERENCE_SIZES.len() + TRAILING_NODES);
        // Small buffers share the first chunk, the 4 MiB buffer fills a chunk
        // of its own, and the trailing nodes start a third.
        assert_eq!(report.stats.chunks, 3);
        assert_eq!(report.stats.bytes_mapped, (2 << 20) + (4 << 20) + (2 << 20));
        assert!(report.bytes_requested < report.stats.bytes_mapped);
    }

    #[test]
    fn explicit_sizes_and_growth() {
        let metrics = MetricsRecorder::new().unwrap();
        let args = ReplayArgs {
            sizes: vec![1 << 20; 5],
            alignment: 4096,
        };
        let options = ArenaOptions::default().with_growth(GrowthStrategy::Doubling);
        let report = run(&args, options, &metrics).unwrap();
        assert_eq!(report.bytes_requested, 5 << 20);
        // 2 MiB holds two buffers, the doubled 4 MiB chunk the remaining three.
        assert_eq!(report.stats.chunks, 2);
    }

    #[test]
    fn oversized_alignment_is_reported() {
        let metrics = MetricsRecorder::new().unwrap();
        let args = ReplayArgs {
            sizes: vec![64],
            alignment: 8192,
        };
        let err = run(&args, ArenaOptions::default(), &metrics).unwrap_err();
        assert!(matches!(err, CliError::Arena(_)));
    }
}
