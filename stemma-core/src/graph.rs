//! Weighted undirected edge lists over integer vertex ids.
//!
//! An [`EdgeList`] is the common currency of the pipeline: the sparse
//! distance loader produces one, prior-network import produces another, and
//! the two are merged into the single list handed to the MST engine. Edges
//! are undirected and parallel edges are permitted; redundancy is resolved
//! by the engine, which only ever accepts the lighter of two parallel edges.

use thiserror::Error;

/// Errors raised while constructing an [`EdgeList`].
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    /// An edge endpoint referenced a vertex id outside the identity space.
    #[error("edge references vertex {node}, but the graph has {node_count} vertices")]
    NodeOutOfBounds {
        /// The offending vertex id.
        node: usize,
        /// The number of vertices in the graph.
        node_count: usize,
    },
}

impl GraphError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NodeOutOfBounds { .. } => "NODE_OUT_OF_BOUNDS",
        }
    }
}

/// A single weighted undirected edge.
///
/// Endpoint order carries no meaning; `(a, b, w)` and `(b, a, w)` describe
/// the same relationship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// One endpoint.
    pub source: usize,
    /// The other endpoint.
    pub target: usize,
    /// Non-negative distance between the endpoints.
    pub weight: f32,
}

impl Edge {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(source: usize, target: usize, weight: f32) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// An ordered collection of edges over a fixed number of vertices.
///
/// # Examples
/// ```
/// use stemma_core::EdgeList;
///
/// let graph = EdgeList::from_sparse(3, [(0, 1, 0.5), (1, 2, 1.5)])?;
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.node_count(), 3);
/// # Ok::<(), stemma_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeList {
    edges: Vec<Edge>,
    node_count: usize,
}

impl EdgeList {
    /// Creates an edge list with no edges over `node_count` vertices.
    #[must_use]
    pub const fn empty(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            node_count,
        }
    }

    /// Builds an edge list from sparse `(row, col, weight)` triples.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when a triple references a
    /// vertex id at or beyond `node_count`; the sparse matrix and the sample
    /// list disagree and no consistent graph can be built.
    pub fn from_sparse<I>(node_count: usize, triples: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize, f32)>,
    {
        let mut edges = Vec::new();
        for (row, col, weight) in triples {
            let node = if row >= node_count {
                Some(row)
            } else if col >= node_count {
                Some(col)
            } else {
                None
            };
            if let Some(node) = node {
                return Err(GraphError::NodeOutOfBounds { node, node_count });
            }
            edges.push(Edge::new(row, col, weight));
        }
        Ok(Self { edges, node_count })
    }

    /// Returns the number of vertices the edges are defined over.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the list holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Concatenates a current-run edge list with remapped prior edges.
    ///
    /// Current-run edges come first, prior edges are appended, and the
    /// vertex count is the larger of the two (prior import may have
    /// extended the identity space). No deduplication happens here: the
    /// MST engine never accepts the heavier of two parallel edges.
    #[must_use]
    pub fn merge(current: Self, prior: Self) -> Self {
        let node_count = current.node_count.max(prior.node_count);
        let mut edges = current.edges;
        edges.extend(prior.edges);
        Self { edges, node_count }
    }

    /// Decomposes the list into flat source/target/weight arrays.
    ///
    /// This is the hand-off format of the data-parallel MST backend.
    #[must_use]
    pub fn to_arrays(&self) -> (Vec<usize>, Vec<usize>, Vec<f32>) {
        let sources = self.edges.iter().map(|edge| edge.source).collect();
        let targets = self.edges.iter().map(|edge| edge.target).collect();
        let weights = self.edges.iter().map(|edge| edge.weight).collect();
        (sources, targets, weights)
    }
}
