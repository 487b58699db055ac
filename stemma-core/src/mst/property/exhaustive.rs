//! Exhaustive spanning-structure oracle for small graphs.
//!
//! Enumerates every edge subset and keeps the cheapest acyclic subset that
//! spans the input's connectivity. Exponential in the edge count, so only
//! usable for the small fixtures produced by `small_graph_strategy`, but it
//! verifies true minimality rather than agreement with another Kruskal.

/// Result of the exhaustive search.
pub(super) struct ExhaustiveResult {
    /// Minimum total weight over all spanning structures.
    pub best_weight: f64,
    /// Number of connected components of the input graph.
    pub component_count: usize,
}

/// Finds the minimum spanning-structure weight by enumerating subsets.
pub(super) fn optimal_spanning_weight(
    node_count: usize,
    triples: &[(usize, usize, f32)],
) -> ExhaustiveResult {
    let component_count = count_components(node_count, triples);
    let required = node_count - component_count;
    assert!(
        triples.len() < usize::BITS as usize,
        "edge count exceeds the subset enumeration width"
    );

    let mut best_weight = f64::INFINITY;
    for mask in 0_u64..(1_u64 << triples.len()) {
        if mask.count_ones() as usize != required {
            continue;
        }
        if let Some(weight) = subset_weight_if_acyclic(node_count, triples, mask) {
            if weight < best_weight {
                best_weight = weight;
            }
        }
    }

    ExhaustiveResult {
        best_weight,
        component_count,
    }
}

fn subset_weight_if_acyclic(
    node_count: usize,
    triples: &[(usize, usize, f32)],
    mask: u64,
) -> Option<f64> {
    let mut parent: Vec<usize> = (0..node_count).collect();
    let mut weight = 0.0_f64;
    for (index, &(row, col, w)) in triples.iter().enumerate() {
        if mask & (1 << index) == 0 {
            continue;
        }
        let row_root = find(&mut parent, row);
        let col_root = find(&mut parent, col);
        if row_root == col_root {
            return None;
        }
        parent[row_root] = col_root;
        weight += f64::from(w);
    }
    Some(weight)
}

fn count_components(node_count: usize, triples: &[(usize, usize, f32)]) -> usize {
    let mut parent: Vec<usize> = (0..node_count).collect();
    for &(row, col, _) in triples {
        let row_root = find(&mut parent, row);
        let col_root = find(&mut parent, col);
        if row_root != col_root {
            parent[row_root] = col_root;
        }
    }
    let mut roots: Vec<usize> = (0..node_count).map(|node| find(&mut parent, node)).collect();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}

fn find(parent: &mut [usize], node: usize) -> usize {
    let mut current = node;
    while parent[current] != current {
        let grandparent = parent[parent[current]];
        parent[current] = grandparent;
        current = grandparent;
    }
    current
}
