//! Minimum spanning tree construction over merged distance graphs.
//!
//! Two backends satisfy one contract: sort edges by ascending weight with a
//! canonical `(weight, smaller endpoint, larger endpoint)` tie-break, accept
//! each edge whose endpoints are still in different sets, and stop once
//! `n - 1` edges are in. The sequential backend works over the in-memory
//! edge list; the data-parallel backend takes the edge triples as flat
//! arrays and hands them to a Rayon-based parallel Kruskal primitive. Given
//! the same input and thread count, both produce bit-identical results.

#[cfg(feature = "data-parallel")]
mod parallel;
mod sequential;
#[cfg(feature = "data-parallel")]
mod union_find;

#[cfg(test)]
mod property;

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::graph::EdgeList;

#[cfg(feature = "data-parallel")]
pub use self::parallel::minimum_spanning_forest_from_arrays;

/// Errors returned while computing a minimum spanning tree/forest.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MstError {
    /// The caller requested an MST for a graph with no vertices.
    #[error("cannot compute an MST for a graph with no vertices")]
    EmptyGraph,
    /// An edge referenced a vertex id that is not present in the graph.
    #[error("edge references vertex {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// The invalid vertex id referenced by an edge.
        node: usize,
        /// The number of vertices in the graph.
        node_count: usize,
    },
    /// An edge carried a non-finite weight.
    #[error("edge ({left}, {right}) has non-finite weight")]
    NonFiniteWeight {
        /// The left endpoint id (as provided).
        left: usize,
        /// The right endpoint id (as provided).
        right: usize,
    },
    /// The flat edge arrays disagreed on length.
    #[error(
        "edge arrays disagree on length: {sources} sources, {targets} targets, {weights} weights"
    )]
    ArrayLengthMismatch {
        /// Length of the source array.
        sources: usize,
        /// Length of the target array.
        targets: usize,
        /// Length of the weight array.
        weights: usize,
    },
    /// The worker pool for the requested thread count could not be built.
    #[error("failed to build worker pool: {reason}")]
    WorkerPool {
        /// Human-readable cause reported by the pool builder.
        reason: String,
    },
    /// A synchronisation primitive became poisoned after a panic.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the locked resource that was poisoned.
        resource: &'static str,
    },
    /// An internal invariant was violated, indicating a logic error.
    #[error("MST invariant violated: {invariant} (index {index})")]
    InvariantViolation {
        /// Name of the violated invariant to assist debugging.
        invariant: &'static str,
        /// The index that violated the invariant.
        index: usize,
    },
}

impl MstError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> MstErrorCode {
        match self {
            Self::EmptyGraph => MstErrorCode::EmptyGraph,
            Self::InvalidNodeId { .. } => MstErrorCode::InvalidNodeId,
            Self::NonFiniteWeight { .. } => MstErrorCode::NonFiniteWeight,
            Self::ArrayLengthMismatch { .. } => MstErrorCode::ArrayLengthMismatch,
            Self::WorkerPool { .. } => MstErrorCode::WorkerPool,
            Self::LockPoisoned { .. } => MstErrorCode::LockPoisoned,
            Self::InvariantViolation { .. } => MstErrorCode::InvariantViolation,
        }
    }
}

/// Machine-readable error codes for [`MstError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MstErrorCode {
    /// The caller requested an MST for a graph with no vertices.
    EmptyGraph,
    /// An edge referenced a vertex id that is not present in the graph.
    InvalidNodeId,
    /// An edge carried a non-finite weight.
    NonFiniteWeight,
    /// The flat edge arrays disagreed on length.
    ArrayLengthMismatch,
    /// The worker pool could not be built.
    WorkerPool,
    /// A synchronisation primitive became poisoned after a panic.
    LockPoisoned,
    /// An internal invariant was violated.
    InvariantViolation,
}

impl MstErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyGraph => "EMPTY_GRAPH",
            Self::InvalidNodeId => "INVALID_NODE_ID",
            Self::NonFiniteWeight => "NON_FINITE_WEIGHT",
            Self::ArrayLengthMismatch => "ARRAY_LENGTH_MISMATCH",
            Self::WorkerPool => "WORKER_POOL",
            Self::LockPoisoned => "LOCK_POISONED",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }
}

/// A single MST edge in canonical undirected form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    target: usize,
    weight: f32,
}

impl MstEdge {
    /// Returns the smaller endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> usize { self.target }

    /// Returns the edge weight.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f32 { self.weight }
}

impl Eq for MstEdge {}

impl Ord for MstEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.target.cmp(&other.target))
    }
}

impl PartialOrd for MstEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The output of a minimum spanning forest computation.
///
/// When the input graph is connected, the forest is a minimum spanning
/// tree. A disconnected input is not an error: the result spans each
/// component minimally and reports how many components there are.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimumSpanningForest {
    edges: Vec<MstEdge>,
    component_count: usize,
    node_count: usize,
}

impl MinimumSpanningForest {
    pub(crate) const fn new(
        edges: Vec<MstEdge>,
        component_count: usize,
        node_count: usize,
    ) -> Self {
        Self {
            edges,
            component_count,
            node_count,
        }
    }

    /// Returns the MST/forest edges in ascending canonical order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[MstEdge] { &self.edges }

    /// Returns the number of connected components in the resulting forest.
    #[must_use]
    #[rustfmt::skip]
    pub fn component_count(&self) -> usize { self.component_count }

    /// Returns the number of vertices the forest spans.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Returns `true` when the forest spans a single connected component.
    #[must_use]
    pub fn is_tree(&self) -> bool {
        self.component_count == 1
    }

    /// Returns the total edge weight, accumulated as `f64` for precision.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|edge| f64::from(edge.weight)).sum()
    }
}

/// The closed set of MST computation backends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Backend {
    /// In-memory edge list, ordered accept loop, optional parallel sort.
    Sequential,
    /// Flat edge arrays dispatched to the parallel Kruskal primitive.
    DataParallel,
}

/// Returns `true` when this build carries the data-parallel backend.
#[must_use]
pub const fn data_parallel_available() -> bool {
    cfg!(feature = "data-parallel")
}

/// Configured MST computation engine.
///
/// Backend selection happens once, at construction: requesting the
/// data-parallel backend in a build without it falls back to the
/// sequential backend, which satisfies the same contract. The thread
/// count sizes the worker pool of whichever backend runs.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use stemma_core::{Backend, EdgeList, MstEngine};
///
/// let graph = EdgeList::from_sparse(3, [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 4.0)])?;
/// let engine = MstEngine::new(Backend::Sequential, NonZeroUsize::MIN);
/// let forest = engine.compute(graph)?;
/// assert!(forest.is_tree());
/// assert_eq!(forest.edges().len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct MstEngine {
    backend: Backend,
    threads: NonZeroUsize,
}

impl MstEngine {
    /// Creates an engine, resolving the requested backend against this
    /// build's capabilities.
    #[must_use]
    pub fn new(requested: Backend, threads: NonZeroUsize) -> Self {
        let backend = resolve_backend(requested);
        Self { backend, threads }
    }

    /// Returns the backend that will run.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Returns the configured thread count.
    #[must_use]
    pub const fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    /// Computes a minimum spanning forest over `graph`.
    ///
    /// # Errors
    ///
    /// Returns an error when the graph has no vertices, an edge references
    /// a vertex id `>= node_count`, an edge weight is non-finite, or the
    /// worker pool cannot be built.
    #[instrument(
        name = "mst.compute",
        err,
        skip(self, graph),
        fields(
            nodes = graph.node_count(),
            edges = graph.len(),
            backend = ?self.backend,
            threads = %self.threads,
        ),
    )]
    pub fn compute(&self, graph: EdgeList) -> Result<MinimumSpanningForest, MstError> {
        let forest = match self.backend {
            Backend::Sequential => sequential::minimum_spanning_forest(&graph, self.threads)?,
            Backend::DataParallel => self.compute_data_parallel(&graph)?,
        };
        info!(
            accepted = forest.edges().len(),
            components = forest.component_count(),
            "minimum spanning forest computed"
        );
        Ok(forest)
    }

    #[cfg(feature = "data-parallel")]
    fn compute_data_parallel(&self, graph: &EdgeList) -> Result<MinimumSpanningForest, MstError> {
        let (sources, targets, weights) = graph.to_arrays();
        parallel::minimum_spanning_forest_from_arrays(
            graph.node_count(),
            &sources,
            &targets,
            &weights,
            self.threads,
        )
    }

    #[cfg(not(feature = "data-parallel"))]
    fn compute_data_parallel(&self, graph: &EdgeList) -> Result<MinimumSpanningForest, MstError> {
        // resolve_backend never selects DataParallel without the feature.
        sequential::minimum_spanning_forest(graph, self.threads)
    }
}

fn resolve_backend(requested: Backend) -> Backend {
    if requested == Backend::DataParallel && !data_parallel_available() {
        warn!("data-parallel MST backend is not compiled into this build, using sequential");
        return Backend::Sequential;
    }
    requested
}

/// Validates one edge and rewrites it into canonical `(min, max)` form.
///
/// Self-loops are dropped (`Ok(None)`); they can never join two sets.
fn canonical_edge(
    source: usize,
    target: usize,
    weight: f32,
    node_count: usize,
) -> Result<Option<MstEdge>, MstError> {
    if source >= node_count {
        return Err(MstError::InvalidNodeId {
            node: source,
            node_count,
        });
    }
    if target >= node_count {
        return Err(MstError::InvalidNodeId {
            node: target,
            node_count,
        });
    }
    if !weight.is_finite() {
        return Err(MstError::NonFiniteWeight {
            left: source,
            right: target,
        });
    }
    if source == target {
        return Ok(None);
    }

    let (source, target) = if source < target {
        (source, target)
    } else {
        (target, source)
    };
    Ok(Some(MstEdge {
        source,
        target,
        weight,
    }))
}

/// Removes consecutive duplicates sharing `(weight, source, target)`.
///
/// After sorting, parallel edges with identical weight are adjacent and
/// carry no information beyond the first occurrence.
fn dedup_edges(edges: &mut Vec<MstEdge>) {
    edges.dedup_by(|left, right| {
        left.weight == right.weight && left.source == right.source && left.target == right.target
    });
}

#[cfg(kani)]
mod kani_proofs {
    //! Bounded model-checking harnesses for forest invariants.

    use std::num::NonZeroUsize;

    use crate::graph::EdgeList;

    use super::{Backend, MstEngine};

    /// Verifies forest structure over every 4-vertex edge selection.
    ///
    /// Weights are `u8` cast to `f32` so every generated weight is finite.
    #[kani::proof]
    #[kani::unwind(12)]
    fn verify_forest_structure_4_nodes() {
        let node_count = 4_usize;
        let pairs = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

        let mut triples = Vec::new();
        for &(source, target) in &pairs {
            if kani::any::<bool>() {
                let weight: u8 = kani::any();
                triples.push((source, target, f32::from(weight)));
            }
        }

        let graph = EdgeList::from_sparse(node_count, triples).expect("pairs are in bounds");
        let forest = MstEngine::new(Backend::Sequential, NonZeroUsize::MIN)
            .compute(graph)
            .expect("finite weights must succeed");

        kani::assert(
            forest.edges().len() == node_count - forest.component_count(),
            "forest must have n - c edges",
        );
        for edge in forest.edges() {
            kani::assert(edge.source() < edge.target(), "edges must be canonical");
        }
        if forest.component_count() == 1 {
            kani::assert(
                forest.edges().len() == node_count - 1,
                "a spanning tree must have n - 1 edges",
            );
        }
    }
}
