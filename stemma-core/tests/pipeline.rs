//! End-to-end tests for the graph construction and MST pipeline.

use std::num::NonZeroUsize;

use stemma_core::{
    Backend, EdgeList, LabelledEdge, MstEngine, PriorNetwork, SampleIndex, import_prior_network,
};

struct RecordedNetwork {
    names: Vec<String>,
    edges: Vec<LabelledEdge>,
}

impl RecordedNetwork {
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

impl PriorNetwork for RecordedNetwork {
    fn node_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn labelled_edges(&self) -> Vec<LabelledEdge> {
        self.edges.clone()
    }
}

fn sequential_engine() -> MstEngine {
    MstEngine::new(Backend::Sequential, NonZeroUsize::MIN)
}

#[test]
fn square_graph_keeps_the_three_light_edges() {
    let samples = SampleIndex::from_names(["A", "B", "C", "D"]).expect("unique names");
    let graph = EdgeList::from_sparse(
        samples.len(),
        [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 2.5), (2, 3, 1.5)],
    )
    .expect("triples are in bounds");

    let forest = sequential_engine().compute(graph).expect("MST must succeed");

    let named: Vec<(&str, &str, f32)> = forest
        .edges()
        .iter()
        .map(|edge| {
            (
                samples.name(edge.source()).expect("id in range"),
                samples.name(edge.target()).expect("id in range"),
                edge.weight(),
            )
        })
        .collect();
    assert_eq!(
        named,
        vec![("A", "B", 1.0), ("C", "D", 1.5), ("B", "C", 2.0)]
    );
    assert!((forest.total_weight() - 4.5).abs() < f64::EPSILON);
}

#[test]
fn merging_no_prior_network_changes_nothing() {
    let mut samples = SampleIndex::from_names(["A", "B", "C"]).expect("unique names");
    let graph = EdgeList::from_sparse(samples.len(), [(0, 1, 1.0), (1, 2, 2.0), (0, 2, 0.5)])
        .expect("triples are in bounds");

    let direct = sequential_engine()
        .compute(graph.clone())
        .expect("MST must succeed");

    let prior = import_prior_network(None, None, &mut samples).expect("no-op import");
    let merged_forest = sequential_engine()
        .compute(EdgeList::merge(graph, prior))
        .expect("MST must succeed");

    assert_eq!(direct, merged_forest);
}

#[test]
fn prior_edges_compete_with_new_distances() {
    // The prior run related A and B; the new run introduces C with a much
    // shorter path to A. The merged tree keeps the cheap new edge and one
    // edge linking B, totalling 1.5.
    let prior = RecordedNetwork::new(&["A", "B"], &[("A", "B", 1.0)]);
    let old_samples = SampleIndex::from_names(["A", "B"]).expect("unique names");

    let mut samples = SampleIndex::from_names(["A", "B", "C"]).expect("unique names");
    let new_edges = EdgeList::from_sparse(samples.len(), [(0, 2, 0.5), (1, 2, 3.0)])
        .expect("triples are in bounds");

    let prior_edges = import_prior_network(Some(&prior), Some(&old_samples), &mut samples)
        .expect("import must succeed");
    let forest = sequential_engine()
        .compute(EdgeList::merge(new_edges, prior_edges))
        .expect("MST must succeed");

    assert!(forest.is_tree());
    assert!((forest.total_weight() - 1.5).abs() < f64::EPSILON);
    assert!(forest.edges().iter().any(|edge| {
        edge.weight() == 0.5 && edge.source() == 0 && edge.target() == 2
    }));
}

#[test]
fn prior_only_samples_survive_as_vertices() {
    let prior = RecordedNetwork::new(
        &["A", "retired", "B"],
        &[("A", "retired", 0.75), ("A", "B", 1.0)],
    );

    let mut samples = SampleIndex::from_names(["A", "B", "C"]).expect("unique names");
    let new_edges = EdgeList::from_sparse(samples.len(), [(0, 2, 0.5)])
        .expect("triples are in bounds");

    let prior_edges =
        import_prior_network(Some(&prior), None, &mut samples).expect("import must succeed");
    let forest = sequential_engine()
        .compute(EdgeList::merge(new_edges, prior_edges))
        .expect("MST must succeed");

    assert_eq!(samples.names(), ["A", "B", "C", "retired"]);
    assert_eq!(forest.node_count(), 4);
    assert!(forest.is_tree());
    let retired = samples.id_of("retired").expect("retired is indexed");
    assert!(forest
        .edges()
        .iter()
        .any(|edge| edge.source() == retired || edge.target() == retired));
}

#[cfg(feature = "data-parallel")]
#[test]
fn both_backends_agree_on_a_merged_graph() {
    let prior = RecordedNetwork::new(&["A", "B"], &[("A", "B", 1.0)]);

    let build = |backend: Backend, threads: usize| {
        let mut samples = SampleIndex::from_names(["A", "B", "C", "D"]).expect("unique names");
        let new_edges = EdgeList::from_sparse(
            samples.len(),
            [(0, 2, 0.5), (1, 2, 3.0), (2, 3, 1.0), (0, 3, 1.0)],
        )
        .expect("triples are in bounds");
        let prior_edges =
            import_prior_network(Some(&prior), None, &mut samples).expect("import must succeed");
        let threads = NonZeroUsize::new(threads).expect("non-zero");
        MstEngine::new(backend, threads)
            .compute(EdgeList::merge(new_edges, prior_edges))
            .expect("MST must succeed")
    };

    let sequential = build(Backend::Sequential, 1);
    let parallel = build(Backend::DataParallel, 4);
    assert_eq!(sequential, parallel);
}
