//! Minimum spanning tree engine benchmarks.
//!
//! Compares the sequential and data-parallel backends over seeded synthetic
//! sparse graphs of increasing size.

use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use stemma_benches::{SyntheticConfig, sparse_graph};
use stemma_core::{Backend, MstEngine};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Candidate neighbours drawn per vertex.
const NEIGHBOURS: usize = 8;

/// Graph sizes to benchmark.
const NODE_COUNTS: &[usize] = &[100, 500, 1_000];

fn mst_engines(c: &mut Criterion) {
    let mut group = c.benchmark_group("mst_engines");
    group.sample_size(20);

    for &node_count in NODE_COUNTS {
        let graph = sparse_graph(&SyntheticConfig {
            node_count,
            neighbours: NEIGHBOURS,
            seed: SEED,
        });

        for (label, backend, threads) in [
            ("sequential", Backend::Sequential, 1),
            ("data_parallel_t4", Backend::DataParallel, 4),
        ] {
            let engine = MstEngine::new(backend, NonZeroUsize::new(threads).expect("non-zero"));
            group.bench_with_input(
                BenchmarkId::new(label, node_count),
                &graph,
                |bencher, graph| {
                    // The engine consumes the graph; the clone is part of
                    // every measured iteration for both backends alike.
                    bencher.iter(|| engine.compute(graph.clone()).expect("MST must succeed"));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, mst_engines);
criterion_main!(benches);
