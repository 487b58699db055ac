//! Property-based test runners for the MST engine.

use std::num::NonZeroUsize;

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rstest::rstest;

use crate::graph::EdgeList;
use crate::mst::{Backend, MinimumSpanningForest, MstEngine};

use super::exhaustive::optimal_spanning_weight;
use super::strategies::{fixture_strategy, generate_fixture, small_graph_strategy};
use super::types::{GraphFixture, WeightDistribution};

fn compute(fixture: &GraphFixture, backend: Backend, threads: usize) -> MinimumSpanningForest {
    let graph = EdgeList::from_sparse(fixture.node_count, fixture.triples.iter().copied())
        .expect("generated triples are in bounds");
    let threads = NonZeroUsize::new(threads).expect("thread count must be non-zero");
    MstEngine::new(backend, threads)
        .compute(graph)
        .expect("generated graphs must not fail")
}

/// Verifies acyclicity, canonical edge form, and the `n - k` edge count.
fn run_structural_property(fixture: &GraphFixture) -> TestCaseResult {
    let forest = compute(fixture, Backend::Sequential, 1);

    let mut parent: Vec<usize> = (0..fixture.node_count).collect();
    for edge in forest.edges() {
        prop_assert!(edge.source() < edge.target());
        prop_assert!(edge.target() < fixture.node_count);
        let source_root = find(&mut parent, edge.source());
        let target_root = find(&mut parent, edge.target());
        prop_assert_ne!(source_root, target_root, "forest contains a cycle");
        parent[source_root] = target_root;
    }

    let mut roots: Vec<usize> = (0..fixture.node_count)
        .map(|node| find(&mut parent, node))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    prop_assert_eq!(roots.len(), forest.component_count());
    prop_assert_eq!(
        forest.edges().len(),
        fixture.node_count - forest.component_count()
    );
    Ok(())
}

/// Verifies the result weight against the exhaustive oracle.
fn run_minimality_property(fixture: &GraphFixture) -> TestCaseResult {
    let forest = compute(fixture, Backend::Sequential, 1);
    let oracle = optimal_spanning_weight(fixture.node_count, &fixture.triples);

    prop_assert_eq!(forest.component_count(), oracle.component_count);
    prop_assert!(
        (forest.total_weight() - oracle.best_weight).abs() < 1e-6,
        "engine weight {} differs from optimal {} (nodes={}, edges={})",
        forest.total_weight(),
        oracle.best_weight,
        fixture.node_count,
        fixture.triples.len(),
    );
    Ok(())
}

/// Verifies repeated runs produce bit-identical results.
fn run_determinism_property(fixture: &GraphFixture) -> TestCaseResult {
    let first = compute(fixture, Backend::Sequential, 1);
    let second = compute(fixture, Backend::Sequential, 1);
    prop_assert_eq!(first, second);
    Ok(())
}

/// Verifies the two backends agree edge for edge.
#[cfg(feature = "data-parallel")]
fn run_backend_equivalence_property(fixture: &GraphFixture) -> TestCaseResult {
    let sequential = compute(fixture, Backend::Sequential, 1);
    for threads in [1, 2, 4] {
        let parallel = compute(fixture, Backend::DataParallel, threads);
        prop_assert!(
            (sequential.total_weight() - parallel.total_weight()).abs() < 1e-6,
            "backend weights diverge at {threads} threads"
        );
        prop_assert_eq!(sequential.edges(), parallel.edges());
        prop_assert_eq!(sequential.component_count(), parallel.component_count());
    }
    Ok(())
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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn forest_structure_holds(fixture in fixture_strategy()) {
        run_structural_property(&fixture)?;
    }

    #[test]
    fn results_are_deterministic(fixture in fixture_strategy()) {
        run_determinism_property(&fixture)?;
    }

    #[cfg(feature = "data-parallel")]
    #[test]
    fn backends_are_equivalent(fixture in fixture_strategy()) {
        run_backend_equivalence_property(&fixture)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn small_graphs_are_truly_minimal(fixture in small_graph_strategy()) {
        run_minimality_property(&fixture)?;
    }
}

#[rstest]
#[case::unique_42(WeightDistribution::Unique, 42)]
#[case::unique_999(WeightDistribution::Unique, 999)]
#[case::identical_42(WeightDistribution::ManyIdentical, 42)]
#[case::identical_7777(WeightDistribution::ManyIdentical, 7777)]
#[case::disconnected_42(WeightDistribution::Disconnected, 42)]
#[case::disconnected_999(WeightDistribution::Disconnected, 999)]
fn structure_holds_for_pinned_seeds(#[case] distribution: WeightDistribution, #[case] seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let fixture = generate_fixture(distribution, &mut rng);
    run_structural_property(&fixture).expect("structural invariants must hold");
    run_determinism_property(&fixture).expect("determinism must hold");
}

#[cfg(feature = "data-parallel")]
#[rstest]
#[case::identical_42(WeightDistribution::ManyIdentical, 42)]
#[case::identical_999(WeightDistribution::ManyIdentical, 999)]
#[case::disconnected_42(WeightDistribution::Disconnected, 42)]
fn backends_agree_for_pinned_seeds(#[case] distribution: WeightDistribution, #[case] seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let fixture = generate_fixture(distribution, &mut rng);
    run_backend_equivalence_property(&fixture).expect("backends must agree");
}
