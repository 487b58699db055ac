//! Artifact writers for the stemma pipeline.
//!
//! The network document and the Newick tree travel as a pair: both are
//! rendered to strings before anything touches the filesystem, and a
//! failure writing the second removes the first, so an interrupted run
//! never leaves a half-exported result. The Graphviz plot is independent;
//! its failure is the caller's to soften.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use stemma_core::{ClusteringProvider, MinimumSpanningForest, Phylogeny, SampleIndex};
use stemma_providers_network::{NetworkDocument, NetworkDocumentError};

/// Suffix of the serialized network artifact.
pub const NETWORK_SUFFIX: &str = "_MST.json";
/// Suffix of the Newick tree artifact.
pub const TREE_SUFFIX: &str = "_MST.nwk";
/// Suffix of the Graphviz plot artifact.
pub const PLOT_SUFFIX: &str = "_MST.dot";

/// Node fill colours cycled per distinct cluster label.
const PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// Errors raised while writing output artifacts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArtifactError {
    /// An artifact file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// The network document could not be serialised.
    #[error(transparent)]
    Network(#[from] NetworkDocumentError),
}

/// Writes the network document and the Newick tree as a pair.
///
/// # Errors
/// Returns [`ArtifactError`] when either file cannot be written; the
/// network file is removed again when the tree write fails.
pub fn write_network_and_tree(
    output: &Path,
    base: &str,
    document: &NetworkDocument,
    phylogeny: &Phylogeny,
) -> Result<Vec<PathBuf>, ArtifactError> {
    let network_path = output.join(format!("{base}{NETWORK_SUFFIX}"));
    let tree_path = output.join(format!("{base}{TREE_SUFFIX}"));

    // Render both artifacts up front so a serialisation failure writes
    // nothing at all.
    let network_json = document.to_json()?;
    let newick = phylogeny.to_newick();

    write_file(&network_path, &network_json)?;
    if let Err(err) = write_file(&tree_path, &newick) {
        let _ = fs::remove_file(&network_path);
        return Err(err);
    }

    Ok(vec![network_path, tree_path])
}

/// Writes the Graphviz plot, colouring nodes by cluster label.
///
/// # Errors
/// Returns [`ArtifactError::Io`] when the file cannot be written.
pub fn write_plot(
    output: &Path,
    base: &str,
    forest: &MinimumSpanningForest,
    samples: &SampleIndex,
    clustering: &dyn ClusteringProvider,
    column: &str,
) -> Result<PathBuf, ArtifactError> {
    let path = output.join(format!("{base}{PLOT_SUFFIX}"));
    let dot = render_dot(forest, samples, clustering, column);
    write_file(&path, &dot)?;
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    fs::write(path, contents).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render_dot(
    forest: &MinimumSpanningForest,
    samples: &SampleIndex,
    clustering: &dyn ClusteringProvider,
    column: &str,
) -> String {
    let mut seen_labels: Vec<String> = Vec::new();
    let mut dot = String::new();
    dot.push_str("graph mst {\n");
    dot.push_str("    node [style=filled];\n");

    for id in 0..forest.node_count() {
        let name = samples.name(id).unwrap_or_default();
        let label = clustering.label_of(name).unwrap_or("NA");
        let colour = colour_for(label, &mut seen_labels);
        let _ = writeln!(
            dot,
            "    \"{}\" [fillcolor=\"{colour}\", tooltip=\"{}: {}\"];",
            escape(name),
            escape(column),
            escape(label),
        );
    }
    for edge in forest.edges() {
        let source = samples.name(edge.source()).unwrap_or_default();
        let target = samples.name(edge.target()).unwrap_or_default();
        let _ = writeln!(
            dot,
            "    \"{}\" -- \"{}\" [label=\"{}\"];",
            escape(source),
            escape(target),
            edge.weight(),
        );
    }
    dot.push_str("}\n");
    dot
}

/// Returns a palette colour per distinct label, in first-seen order.
fn colour_for(label: &str, seen_labels: &mut Vec<String>) -> &'static str {
    let index = seen_labels
        .iter()
        .position(|known| known == label)
        .unwrap_or_else(|| {
            seen_labels.push(label.to_owned());
            seen_labels.len() - 1
        });
    PALETTE[index % PALETTE.len()]
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
