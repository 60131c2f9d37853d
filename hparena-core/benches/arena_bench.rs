#[macro_use]
extern crate criterion;

use std::hint::black_box;

use bumpalo::Bump;
use criterion::{BatchSize, Criterion, Throughput};

use hparena_core::{ArenaOptions, FailurePolicy, GrowthStrategy, HugepageArena};

const OBJECTS: usize = 10_000;

fn bench_small_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_112_bytes");
    group.throughput(Throughput::Elements(OBJECTS as u64));

    for growth in [GrowthStrategy::Minimum, GrowthStrategy::Doubling] {
        group.bench_function(format!("hugepage_arena_{}", growth), |b| {
            b.iter_batched(
                || {
                    HugepageArena::with_options(
                        ArenaOptions::new(FailurePolicy::FallbackToRegularPages).with_growth(growth),
                    )
                },
                |arena| {
                    for _ in 0..OBJECTS {
                        black_box(arena.allocate(112, 8).unwrap());
                    }
                    arena
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("bumpalo", |b| {
        b.iter_batched(
            Bump::new,
            |bump| {
                for _ in 0..OBJECTS {
                    black_box(bump.alloc([0u8; 112]));
                }
                bump
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("box", |b| {
        b.iter_batched(
            || Vec::with_capacity(OBJECTS),
            |mut boxes| {
                for _ in 0..OBJECTS {
                    boxes.push(black_box(Box::new([0u8; 112])));
                }
                boxes
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_mixed_sizes(c: &mut Criterion) {
    const SIZES: [usize; 8] = [88, 1400, 320, 112, 216, 4272, 184, 28352];

    c.bench_function("hugepage_arena_mixed_sizes", |b| {
        b.iter_batched(
            HugepageArena::default,
            |arena| {
                for size in SIZES.iter().cycle().take(OBJECTS) {
                    black_box(arena.allocate(*size, 8).unwrap());
                }
                arena
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_small_objects, bench_mixed_sizes);
criterion_main!(benches);
