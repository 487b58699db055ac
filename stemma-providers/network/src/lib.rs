//! Persisted network documents for stemma runs.
//!
//! A run's spanning tree is saved as a small JSON document holding the
//! sample names and the tree edges by vertex id. The same document read
//! back in a later run supplies the prior-network seam of the core
//! pipeline, closing the incremental loop: each run's output is the next
//! run's `--previous-mst`.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stemma_core::{LabelledEdge, MinimumSpanningForest, PriorNetwork, SampleIndex};

/// Errors raised while loading or saving a network document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkDocumentError {
    /// The document file could not be opened or written.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("invalid network document: {0}")]
    Json(#[from] serde_json::Error),
    /// An edge referenced a node id outside the document's node list.
    #[error("network edge references node {node}, but the document lists {node_count} nodes")]
    NodeOutOfBounds {
        /// The offending node id.
        node: usize,
        /// Number of nodes the document lists.
        node_count: usize,
    },
    /// The forest and the sample index disagree on the vertex count.
    #[error("forest spans {nodes} vertices but the sample index has {samples}")]
    NodeCountMismatch {
        /// Vertices in the forest.
        nodes: usize,
        /// Samples in the index.
        samples: usize,
    },
}

/// One edge of a persisted network, endpoints by document node id.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct NetworkEdge {
    /// One endpoint's node id.
    pub source: usize,
    /// The other endpoint's node id.
    pub target: usize,
    /// Edge weight.
    pub weight: f32,
}

/// Raw document shape as serialized; validated into [`NetworkDocument`].
#[derive(Deserialize, Serialize)]
struct RawDocument {
    nodes: Vec<String>,
    edges: Vec<NetworkEdge>,
}

/// A validated persisted network: every edge endpoint indexes `nodes`.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkDocument {
    nodes: Vec<String>,
    edges: Vec<NetworkEdge>,
}

impl NetworkDocument {
    /// Builds a document, validating edge endpoints against the node list.
    ///
    /// # Errors
    /// Returns [`NetworkDocumentError::NodeOutOfBounds`] when an edge
    /// references a node id the node list does not cover.
    pub fn new(
        nodes: Vec<String>,
        edges: Vec<NetworkEdge>,
    ) -> Result<Self, NetworkDocumentError> {
        let node_count = nodes.len();
        for edge in &edges {
            let node = if edge.source >= node_count {
                Some(edge.source)
            } else if edge.target >= node_count {
                Some(edge.target)
            } else {
                None
            };
            if let Some(node) = node {
                return Err(NetworkDocumentError::NodeOutOfBounds { node, node_count });
            }
        }
        Ok(Self { nodes, edges })
    }

    /// Builds a document from a spanning forest and its sample names.
    ///
    /// # Errors
    /// Returns [`NetworkDocumentError::NodeCountMismatch`] when the forest
    /// and the sample index disagree on the vertex count.
    pub fn from_forest(
        forest: &MinimumSpanningForest,
        samples: &SampleIndex,
    ) -> Result<Self, NetworkDocumentError> {
        if samples.len() != forest.node_count() {
            return Err(NetworkDocumentError::NodeCountMismatch {
                nodes: forest.node_count(),
                samples: samples.len(),
            });
        }
        let edges = forest
            .edges()
            .iter()
            .map(|edge| NetworkEdge {
                source: edge.source(),
                target: edge.target(),
                weight: edge.weight(),
            })
            .collect();
        Ok(Self {
            nodes: samples.names().to_vec(),
            edges,
        })
    }

    /// Loads and validates a document from a JSON file.
    ///
    /// # Errors
    /// Returns [`NetworkDocumentError`] when the file cannot be opened, is
    /// not valid JSON, or fails endpoint validation.
    pub fn try_from_path(path: impl AsRef<Path>) -> Result<Self, NetworkDocumentError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| NetworkDocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawDocument = serde_json::from_reader(BufReader::new(file))?;
        Self::new(raw.nodes, raw.edges)
    }

    /// Serialises the document as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`NetworkDocumentError::Json`] when serialisation fails.
    pub fn to_json(&self) -> Result<String, NetworkDocumentError> {
        let raw = RawDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Writes the document to `path` as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`NetworkDocumentError`] when the file cannot be created or
    /// written.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), NetworkDocumentError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let file = File::create(path).map_err(|source| NetworkDocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(json.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| NetworkDocumentError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Returns the node names in document id order.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Returns the edges in document order.
    #[must_use]
    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }
}

impl PriorNetwork for NetworkDocument {
    fn node_names(&self) -> Vec<String> {
        self.nodes.clone()
    }

    fn labelled_edges(&self) -> Vec<LabelledEdge> {
        // Endpoints were validated against the node list at construction.
        self.edges
            .iter()
            .map(|edge| {
                LabelledEdge::new(
                    self.nodes[edge.source].clone(),
                    self.nodes[edge.target].clone(),
                    edge.weight,
                )
            })
            .collect()
    }
}
