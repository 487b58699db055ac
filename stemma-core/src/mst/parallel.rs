//! Data-parallel Kruskal backend over flat edge arrays.
//!
//! This is the primitive the engine dispatches to when the data-parallel
//! backend is selected: edge triples arrive as three flat arrays, are
//! validated and canonicalised in parallel, sorted in parallel, and then
//! folded through a striped-lock union-find. Edges sharing one weight form
//! a group that is accepted in canonical order, so the output is identical
//! to the sequential backend's regardless of worker count.

use std::num::NonZeroUsize;

use rayon::prelude::*;

use super::union_find::StripedUnionFind;
use super::{MinimumSpanningForest, MstEdge, MstError, canonical_edge, dedup_edges};

/// Computes a minimum spanning forest from flat source/target/weight arrays.
///
/// The three arrays must have equal length; entry `i` of each describes one
/// edge. Work runs inside a dedicated pool of `threads` workers.
///
/// # Errors
///
/// Returns an error when the arrays disagree on length, the graph has no
/// vertices, an edge references a vertex id `>= node_count`, an edge weight
/// is non-finite, or the worker pool cannot be built.
pub fn minimum_spanning_forest_from_arrays(
    node_count: usize,
    sources: &[usize],
    targets: &[usize],
    weights: &[f32],
    threads: NonZeroUsize,
) -> Result<MinimumSpanningForest, MstError> {
    if node_count == 0 {
        return Err(MstError::EmptyGraph);
    }
    if sources.len() != targets.len() || sources.len() != weights.len() {
        return Err(MstError::ArrayLengthMismatch {
            sources: sources.len(),
            targets: targets.len(),
            weights: weights.len(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .build()
        .map_err(|source| MstError::WorkerPool {
            reason: source.to_string(),
        })?;

    pool.install(|| forest_in_pool(node_count, sources, targets, weights))
}

fn forest_in_pool(
    node_count: usize,
    sources: &[usize],
    targets: &[usize],
    weights: &[f32],
) -> Result<MinimumSpanningForest, MstError> {
    let mut pending = prepare_edges(node_count, sources, targets, weights)?;
    pending.par_sort_unstable();
    dedup_edges(&mut pending);

    if pending.is_empty() {
        return Ok(MinimumSpanningForest::new(Vec::new(), node_count, node_count));
    }

    let sets = StripedUnionFind::new(node_count);
    let mut accepted = Vec::with_capacity(node_count.saturating_sub(1));

    let mut cursor = 0;
    while cursor < pending.len() {
        let group_end = end_of_weight_group(&pending, cursor);
        // Accept within the group in canonical order so repeated runs and
        // both backends agree on the exact edge membership.
        for edge in &pending[cursor..group_end] {
            if sets.try_join(edge.source(), edge.target())? {
                accepted.push(*edge);
            }
        }
        if accepted.len() == node_count.saturating_sub(1) {
            break;
        }
        cursor = group_end;
    }

    let component_count = sets.component_count();
    Ok(MinimumSpanningForest::new(
        accepted,
        component_count,
        node_count,
    ))
}

fn prepare_edges(
    node_count: usize,
    sources: &[usize],
    targets: &[usize],
    weights: &[f32],
) -> Result<Vec<MstEdge>, MstError> {
    (0..sources.len())
        .into_par_iter()
        .try_fold(Vec::new, |mut acc, index| {
            if let Some(edge) =
                canonical_edge(sources[index], targets[index], weights[index], node_count)?
            {
                acc.push(edge);
            }
            Ok(acc)
        })
        .try_reduce(Vec::new, |mut left, right| {
            left.extend(right);
            Ok(left)
        })
}

/// Returns the index one past the last edge sharing `edges[start]`'s weight.
fn end_of_weight_group(edges: &[MstEdge], start: usize) -> usize {
    let weight = edges[start].weight();
    let mut end = start.saturating_add(1);
    while end < edges.len() && edges[end].weight() == weight {
        end = end.saturating_add(1);
    }
    end
}
