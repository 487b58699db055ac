//! Graph generation strategies for MST property tests.
//!
//! Fixtures are generated from a seeded [`SmallRng`] so that every failure
//! reduces to a `(distribution, seed)` pair that replays exactly.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::types::{GraphFixture, WeightDistribution};

const MIN_NODES: usize = 4;
const MAX_NODES: usize = 48;

/// Upper bound on vertices for exhaustively checkable graphs.
const SMALL_MAX_NODES: usize = 8;
/// Upper bound on edges for exhaustively checkable graphs; the oracle
/// enumerates every edge subset, so this bounds the search at `2^12`.
const SMALL_MAX_EDGES: usize = 12;

/// Generates fixtures across all weight distributions.
pub(super) fn fixture_strategy() -> impl Strategy<Value = GraphFixture> {
    (any::<u8>(), any::<u64>()).prop_map(|(selector, seed)| {
        let distribution = match selector % 3 {
            0 => WeightDistribution::Unique,
            1 => WeightDistribution::ManyIdentical,
            _ => WeightDistribution::Disconnected,
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(distribution, &mut rng)
    })
}

/// Generates a fixture for a specific weight distribution.
///
/// Used by targeted rstest cases where the distribution is chosen
/// explicitly rather than sampled by proptest.
pub(super) fn generate_fixture(
    distribution: WeightDistribution,
    rng: &mut SmallRng,
) -> GraphFixture {
    match distribution {
        WeightDistribution::Unique => generate_weighted(rng, distribution, |r| {
            r.gen_range(0.1_f32..100.0)
        }),
        WeightDistribution::ManyIdentical => {
            let pool: Vec<f32> = (0..rng.gen_range(1..=3))
                .map(|_| f32::from(rng.gen_range(1_u8..=8)))
                .collect();
            generate_weighted(rng, distribution, move |r| pool[r.gen_range(0..pool.len())])
        }
        WeightDistribution::Disconnected => generate_disconnected(rng),
    }
}

/// Generates small graphs suitable for the exhaustive minimality oracle.
pub(super) fn small_graph_strategy() -> impl Strategy<Value = GraphFixture> {
    (2..=SMALL_MAX_NODES, any::<u64>()).prop_map(|(node_count, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let edge_count = rng.gen_range(1..=SMALL_MAX_EDGES);
        let mut triples = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            let row = rng.gen_range(0..node_count);
            let col = rng.gen_range(0..node_count);
            if row != col {
                // Small integral weights to force plenty of ties.
                triples.push((row, col, f32::from(rng.gen_range(1_u8..=5))));
            }
        }
        if triples.is_empty() {
            triples.push((0, 1, 1.0));
        }
        GraphFixture {
            node_count,
            triples,
            distribution: WeightDistribution::ManyIdentical,
        }
    })
}

fn generate_weighted(
    rng: &mut SmallRng,
    distribution: WeightDistribution,
    mut weight: impl FnMut(&mut SmallRng) -> f32,
) -> GraphFixture {
    let node_count = rng.gen_range(MIN_NODES..=MAX_NODES);
    let edge_probability: f64 = rng.gen_range(0.2..=0.7);
    let mut triples = Vec::new();
    for row in 0..node_count {
        for col in (row + 1)..node_count {
            if rng.gen_bool(edge_probability) {
                triples.push((row, col, weight(rng)));
            }
        }
    }
    if triples.is_empty() {
        triples.push((0, 1, weight(rng)));
    }
    GraphFixture {
        node_count,
        triples,
        distribution,
    }
}

fn generate_disconnected(rng: &mut SmallRng) -> GraphFixture {
    let component_count = rng.gen_range(2..=4);
    let sizes: Vec<usize> = (0..component_count).map(|_| rng.gen_range(2..=8)).collect();
    let node_count = sizes.iter().sum();
    let mut triples = Vec::new();
    let mut offset = 0;
    for &size in &sizes {
        let start = triples.len();
        for row in offset..offset + size {
            for col in (row + 1)..offset + size {
                if rng.gen_bool(0.5) {
                    triples.push((row, col, rng.gen_range(0.1_f32..100.0)));
                }
            }
        }
        // Keep every multi-vertex component at least minimally wired.
        if triples.len() == start {
            triples.push((offset, offset + 1, rng.gen_range(0.1_f32..100.0)));
        }
        offset += size;
    }
    GraphFixture {
        node_count,
        triples,
        distribution: WeightDistribution::Disconnected,
    }
}
