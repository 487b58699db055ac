//! Sequential Kruskal backend.
//!
//! The accept loop is strictly ordered, so results cannot depend on the
//! configured thread count; only the edge sort is farmed out to a worker
//! pool, and only when one is available and asked for.

use std::num::NonZeroUsize;

use crate::graph::EdgeList;

use super::{MinimumSpanningForest, MstError, canonical_edge, dedup_edges};

pub(super) fn minimum_spanning_forest(
    graph: &EdgeList,
    threads: NonZeroUsize,
) -> Result<MinimumSpanningForest, MstError> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Err(MstError::EmptyGraph);
    }

    let mut pending = Vec::with_capacity(graph.len());
    for edge in graph.edges() {
        if let Some(canonical) = canonical_edge(edge.source, edge.target, edge.weight, node_count)?
        {
            pending.push(canonical);
        }
    }

    sort_edges(&mut pending, threads)?;
    dedup_edges(&mut pending);

    let mut sets = DisjointSets::new(node_count);
    let mut accepted = Vec::with_capacity(node_count.saturating_sub(1));
    for edge in &pending {
        if sets.join(edge.source(), edge.target()) {
            accepted.push(*edge);
            if accepted.len() == node_count.saturating_sub(1) {
                break;
            }
        }
    }

    let component_count = sets.component_count();
    Ok(MinimumSpanningForest::new(
        accepted,
        component_count,
        node_count,
    ))
}

#[cfg(feature = "data-parallel")]
fn sort_edges(edges: &mut [super::MstEdge], threads: NonZeroUsize) -> Result<(), MstError> {
    use rayon::prelude::*;

    if threads.get() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build()
            .map_err(|source| MstError::WorkerPool {
                reason: source.to_string(),
            })?;
        pool.install(|| edges.par_sort_unstable());
    } else {
        edges.sort_unstable();
    }
    Ok(())
}

#[cfg(not(feature = "data-parallel"))]
fn sort_edges(edges: &mut [super::MstEdge], _threads: NonZeroUsize) -> Result<(), MstError> {
    edges.sort_unstable();
    Ok(())
}

/// Union-find with union by rank and path halving.
pub(super) struct DisjointSets {
    parents: Vec<usize>,
    ranks: Vec<usize>,
    components: usize,
}

impl DisjointSets {
    pub(super) fn new(node_count: usize) -> Self {
        Self {
            parents: (0..node_count).collect(),
            ranks: vec![0; node_count],
            components: node_count,
        }
    }

    pub(super) const fn component_count(&self) -> usize {
        self.components
    }

    /// Joins the sets containing `left` and `right`.
    ///
    /// Returns `false` when they were already in the same set. Rank ties
    /// make the smaller root the parent, keeping the structure
    /// deterministic.
    pub(super) fn join(&mut self, left: usize, right: usize) -> bool {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return false;
        }

        let (parent, child) = match self.ranks[left_root].cmp(&self.ranks[right_root]) {
            std::cmp::Ordering::Greater => (left_root, right_root),
            std::cmp::Ordering::Less => (right_root, left_root),
            std::cmp::Ordering::Equal if left_root <= right_root => (left_root, right_root),
            std::cmp::Ordering::Equal => (right_root, left_root),
        };
        self.parents[child] = parent;
        if self.ranks[parent] == self.ranks[child] {
            self.ranks[parent] += 1;
        }
        self.components -= 1;
        true
    }

    fn find(&mut self, node: usize) -> usize {
        let mut current = node;
        while self.parents[current] != current {
            let grandparent = self.parents[self.parents[current]];
            self.parents[current] = grandparent;
            current = grandparent;
        }
        current
    }
}
