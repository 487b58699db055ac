//! Importing edges from a previously computed spanning tree.
//!
//! Incremental runs keep the topology of earlier runs by folding the prior
//! tree's edges back into the new graph before the MST is computed. The
//! prior tree lives in a different id space, so its edges arrive labelled by
//! sample name and are re-expressed in the current run's numbering here.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    graph::{EdgeList, GraphError},
    samples::{SampleIndex, SampleIndexError},
};

/// An edge whose endpoints are sample names rather than vertex ids.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledEdge {
    /// One endpoint's sample name.
    pub source: String,
    /// The other endpoint's sample name.
    pub target: String,
    /// Edge weight carried over from the prior tree.
    pub weight: f32,
}

impl LabelledEdge {
    /// Creates a new labelled edge.
    #[must_use]
    pub const fn new(source: String, target: String, weight: f32) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// A previously persisted network, opaque except for its sample universe
/// and its weighted edges by label.
///
/// Implemented by whatever storage format holds the previous run's tree;
/// the import below only needs labels and weights.
pub trait PriorNetwork {
    /// Sample names of the prior run, in prior-run id order.
    fn node_names(&self) -> Vec<String>;

    /// Edges with endpoint labels and weights.
    fn labelled_edges(&self) -> Vec<LabelledEdge>;
}

/// Errors raised while importing a prior network.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum PriorImportError {
    /// The prior run's sample universe was inconsistent.
    #[error(transparent)]
    Samples(#[from] SampleIndexError),
    /// The remapped edges did not fit the extended identity space.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Re-expresses a prior network's edges in the current run's vertex ids.
///
/// The prior run's sample universe (`old_samples` when supplied, otherwise
/// the network's own node list) is reconciled into `current` first, so every
/// prior-run sample keeps a vertex even when the current distance matrix no
/// longer covers it. Edge labels unknown to either universe are inserted on
/// demand; no prior edge is ever dropped.
///
/// An absent prior network is a no-op: the result is an empty edge list and
/// `current` is left untouched, so merging it is indistinguishable from
/// never having taken the merge path.
///
/// # Errors
/// Returns [`PriorImportError::Samples`] when the prior node list contains
/// duplicate names.
#[instrument(name = "prior.import", err, skip_all, fields(samples = current.len()))]
pub fn import_prior_network(
    prior: Option<&dyn PriorNetwork>,
    old_samples: Option<&SampleIndex>,
    current: &mut SampleIndex,
) -> Result<EdgeList, PriorImportError> {
    let Some(prior) = prior else {
        return Ok(EdgeList::empty(current.len()));
    };

    let owned_old;
    let old = match old_samples {
        Some(old) => old,
        None => {
            owned_old = SampleIndex::from_names(prior.node_names())?;
            &owned_old
        }
    };
    SampleIndex::reconcile(old, current);

    let labelled = prior.labelled_edges();
    let mut triples = Vec::with_capacity(labelled.len());
    for edge in labelled {
        let source = current.get_or_insert(&edge.source);
        let target = current.get_or_insert(&edge.target);
        triples.push((source, target, edge.weight));
    }
    debug!(
        edges = triples.len(),
        samples = current.len(),
        "prior network remapped"
    );

    Ok(EdgeList::from_sparse(current.len(), triples)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubNetwork {
        names: Vec<String>,
        edges: Vec<LabelledEdge>,
    }

    impl StubNetwork {
        fn new(names: &[&str], edges: &[(&str, &str, f32)]) -> Self {
            Self {
                names: names.iter().map(|&n| n.to_owned()).collect(),
                edges: edges
                    .iter()
                    .map(|&(s, t, w)| LabelledEdge::new(s.to_owned(), t.to_owned(), w))
                    .collect(),
            }
        }
    }

    impl PriorNetwork for StubNetwork {
        fn node_names(&self) -> Vec<String> {
            self.names.clone()
        }

        fn labelled_edges(&self) -> Vec<LabelledEdge> {
            self.edges.clone()
        }
    }

    #[test]
    fn absent_prior_network_is_a_no_op() {
        let mut current = SampleIndex::from_names(["a", "b"]).expect("unique names");
        let before = current.clone();
        let imported =
            import_prior_network(None, None, &mut current).expect("no-op import must succeed");
        assert!(imported.is_empty());
        assert_eq!(imported.node_count(), 2);
        assert_eq!(current, before);
    }

    #[test]
    fn remaps_labels_into_current_ids() {
        let prior = StubNetwork::new(&["a", "b"], &[("a", "b", 1.0)]);
        let mut current = SampleIndex::from_names(["b", "a", "c"]).expect("unique names");
        let imported = import_prior_network(Some(&prior), None, &mut current)
            .expect("import must succeed");
        assert_eq!(imported.node_count(), 3);
        assert_eq!(imported.edges().len(), 1);
        assert_eq!(imported.edges()[0].source, 1);
        assert_eq!(imported.edges()[0].target, 0);
    }

    #[test]
    fn retains_samples_missing_from_the_current_run() {
        let prior = StubNetwork::new(&["a", "gone", "b"], &[("a", "gone", 0.5)]);
        let mut current = SampleIndex::from_names(["a", "b"]).expect("unique names");
        let imported = import_prior_network(Some(&prior), None, &mut current)
            .expect("import must succeed");
        assert_eq!(current.names(), ["a", "b", "gone"]);
        assert_eq!(imported.node_count(), 3);
        assert_eq!(imported.edges()[0].target, 2);
    }

    #[test]
    fn uses_supplied_old_sample_list_over_embedded_names() {
        // The old sample list carries an isolate the network itself has no
        // edge for; reconciliation must still give it a vertex.
        let prior = StubNetwork::new(&["a", "b"], &[("a", "b", 1.0)]);
        let old = SampleIndex::from_names(["a", "b", "isolated"]).expect("unique names");
        let mut current = SampleIndex::from_names(["a"]).expect("unique names");
        let imported = import_prior_network(Some(&prior), Some(&old), &mut current)
            .expect("import must succeed");
        assert_eq!(current.names(), ["a", "b", "isolated"]);
        assert_eq!(imported.node_count(), 3);
    }

    #[test]
    fn inserts_unknown_edge_labels_on_demand() {
        let prior = StubNetwork::new(&["a"], &[("a", "stranger", 2.0)]);
        let mut current = SampleIndex::from_names(["a"]).expect("unique names");
        let imported = import_prior_network(Some(&prior), None, &mut current)
            .expect("import must succeed");
        assert_eq!(current.names(), ["a", "stranger"]);
        assert_eq!(imported.edges().len(), 1);
    }

    #[test]
    fn rejects_duplicate_prior_node_names() {
        let prior = StubNetwork::new(&["a", "a"], &[]);
        let mut current = SampleIndex::from_names(["b"]).expect("unique names");
        let err = import_prior_network(Some(&prior), None, &mut current)
            .expect_err("duplicate prior names must fail");
        assert!(matches!(
            err,
            PriorImportError::Samples(SampleIndexError::DuplicateSample { .. })
        ));
    }
}
