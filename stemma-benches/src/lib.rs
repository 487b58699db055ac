//! Synthetic inputs for stemma benchmarks.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use stemma_core::EdgeList;

/// Configuration for synthetic sparse-graph generation.
pub struct SyntheticConfig {
    /// Number of vertices.
    pub node_count: usize,
    /// Candidate neighbours drawn per vertex.
    pub neighbours: usize,
    /// Seed for reproducible generation.
    pub seed: u64,
}

/// Generates a seeded sparse graph shaped like a rank-limited distance fit:
/// every vertex draws a handful of weighted neighbours.
#[must_use]
pub fn sparse_graph(config: &SyntheticConfig) -> EdgeList {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut triples = Vec::with_capacity(config.node_count * config.neighbours);
    for node in 0..config.node_count {
        for _ in 0..config.neighbours {
            let other = rng.gen_range(0..config.node_count);
            if other != node {
                triples.push((node, other, rng.gen_range(0.001_f32..1.0)));
            }
        }
    }
    EdgeList::from_sparse(config.node_count, triples).expect("generated triples are in bounds")
}
