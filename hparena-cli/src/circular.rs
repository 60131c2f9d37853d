//! Pointer-chasing benchmark.
//!
//! Every node is larger than a 4 KiB page, so each hop of the walk lands on a
//! different page. With a shuffled cycle the walk is dominated by TLB misses,
//! which is where huge-page backing pays off.

use std::hint::black_box;
use std::time::{Duration, Instant};

use bumpalo::Bump;
use hparena_core::{ArenaOptions, ArenaStats, HugepageArena};
use hparena_telemetry::{EventLogger, MetricsRecorder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::commands::{CircularArgs, MemoryResource};
use crate::error::CliError;

pub const NODE_SIZE: usize = 4128;

pub struct Node {
    next: usize,
    _padding: [u8; NODE_SIZE - std::mem::size_of::<usize>()],
}

const _: () = assert!(std::mem::size_of::<Node>() >= 4096);

impl Node {
    fn new() -> Self {
        Self {
            next: 0,
            _padding: [0; NODE_SIZE - std::mem::size_of::<usize>()],
        }
    }
}

#[derive(Debug)]
pub struct CircularReport {
    pub resource: MemoryResource,
    pub elapsed: Duration,
    pub final_node: usize,
    pub arena: Option<ArenaStats>,
}

pub fn run(
    args: &CircularArgs,
    options: ArenaOptions,
    metrics: &MetricsRecorder,
) -> Result<CircularReport, CliError> {
    if args.number_objects == 0 {
        return Err(CliError::InvalidArgument(
            "--number-objects must be at least 1".into(),
        ));
    }

    info!(
        resource = ?args.memory_resource,
        objects = args.number_objects,
        iterations = args.iterations,
        shuffle = !args.no_shuffle,
        "Starting circular benchmark"
    );

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let shuffle = (!args.no_shuffle).then_some(&mut rng);

    let (elapsed, final_node, arena) = match args.memory_resource {
        MemoryResource::Global => {
            let mut nodes: Vec<Node> = (0..args.number_objects).map(|_| Node::new()).collect();
            let (elapsed, last) = walk(&mut nodes, args.iterations, shuffle);
            (elapsed, last, None)
        }
        MemoryResource::Bumpalo => {
            let bump = Bump::new();
            let nodes = bump.alloc_slice_fill_with(args.number_objects, |_| Node::new());
            let (elapsed, last) = walk(nodes, args.iterations, shuffle);
            (elapsed, last, None)
        }
        MemoryResource::HugepageArena => {
            let arena = HugepageArena::with_options(options);
            let nodes = arena.alloc_slice_fill_with(args.number_objects, |_| Node::new())?;
            let (elapsed, last) = walk(nodes, args.iterations, shuffle);
            let stats = arena.stats();
            EventLogger::log_arena_stats("circular", &stats);
            metrics.record_arena(&stats);
            (elapsed, last, Some(stats))
        }
    };

    metrics.observe_traversal(elapsed);
    info!(seed, elapsed_ms = elapsed.as_millis() as u64, "Done");

    Ok(CircularReport {
        resource: args.memory_resource,
        elapsed,
        final_node,
        arena,
    })
}

/// Links `nodes` into one cycle and visits `iterations` nodes of it, the
/// starting node included.
fn walk(nodes: &mut [Node], iterations: u64, shuffle: Option<&mut StdRng>) -> (Duration, usize) {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    if let Some(rng) = shuffle {
        order.shuffle(rng);
    }

    for pair in order.windows(2) {
        nodes[pair[0]].next = pair[1];
    }
    let last = order[order.len() - 1];
    nodes[last].next = order[0];

    let mut current = order[0];
    let start = Instant::now();
    for _ in 1..iterations {
        current = nodes[current].next;
    }
    let current = black_box(current);
    let elapsed = start.elapsed();
    (elapsed, current)
}
