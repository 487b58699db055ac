//! Rooted phylogenies derived from a spanning forest.
//!
//! The MST relates samples pairwise; downstream tooling wants a tree. Each
//! connected component is rooted at its highest-degree vertex (the hub of
//! the transmission neighbourhood, ties resolved towards the lowest id) and
//! rendered as one Newick line with edge weights as branch lengths.

use std::borrow::Cow;

use thiserror::Error;

use crate::{mst::MinimumSpanningForest, samples::SampleIndex};

/// Errors raised while converting a forest into a phylogeny.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum PhylogenyError {
    /// The forest and the sample index disagree on the number of vertices.
    #[error("forest spans {nodes} vertices but the sample index has {samples}")]
    NodeCountMismatch {
        /// Vertices in the forest.
        nodes: usize,
        /// Samples in the index.
        samples: usize,
    },
}

impl PhylogenyError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NodeCountMismatch { .. } => "NODE_COUNT_MISMATCH",
        }
    }
}

/// One node of a rooted phylogeny.
#[derive(Clone, Debug, PartialEq)]
pub struct PhyloNode {
    name: String,
    branch_length: Option<f32>,
    children: Vec<PhyloNode>,
}

impl PhyloNode {
    /// Returns the sample name at this node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the branch length to the parent (`None` at a root).
    #[must_use]
    pub const fn branch_length(&self) -> Option<f32> {
        self.branch_length
    }

    /// Returns the child nodes in ascending vertex-id order.
    #[must_use]
    pub fn children(&self) -> &[PhyloNode] {
        &self.children
    }
}

/// A rooted phylogeny, one tree per connected component of the forest.
#[derive(Clone, Debug, PartialEq)]
pub struct Phylogeny {
    roots: Vec<PhyloNode>,
}

impl Phylogeny {
    /// Builds a phylogeny from a spanning forest and its sample names.
    ///
    /// # Errors
    /// Returns [`PhylogenyError::NodeCountMismatch`] when the forest and
    /// the sample index disagree on the vertex count.
    pub fn from_forest(
        forest: &MinimumSpanningForest,
        samples: &SampleIndex,
    ) -> Result<Self, PhylogenyError> {
        let node_count = forest.node_count();
        if samples.len() != node_count {
            return Err(PhylogenyError::NodeCountMismatch {
                nodes: node_count,
                samples: samples.len(),
            });
        }

        let mut adjacency: Vec<Vec<(usize, f32)>> = vec![Vec::new(); node_count];
        for edge in forest.edges() {
            adjacency[edge.source()].push((edge.target(), edge.weight()));
            adjacency[edge.target()].push((edge.source(), edge.weight()));
        }
        for neighbours in &mut adjacency {
            neighbours.sort_by_key(|&(neighbour, _)| neighbour);
        }

        let mut visited = vec![false; node_count];
        let mut roots = Vec::new();
        for vertex in 0..node_count {
            if visited[vertex] {
                continue;
            }
            let members = component_members(vertex, &adjacency, &mut visited);
            let root = elect_root(&members, &adjacency);
            roots.push(build_node(root, None, None, &adjacency, samples));
        }

        Ok(Self { roots })
    }

    /// Returns the component roots in ascending vertex-id order.
    #[must_use]
    pub fn roots(&self) -> &[PhyloNode] {
        &self.roots
    }

    /// Returns the number of trees (connected components).
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.roots.len()
    }

    /// Renders the phylogeny as Newick text, one line per component.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use stemma_core::{Backend, EdgeList, MstEngine, Phylogeny, SampleIndex};
    ///
    /// let samples = SampleIndex::from_names(["a", "b", "c"])?;
    /// let graph = EdgeList::from_sparse(3, [(0, 1, 1.0), (1, 2, 2.0)])?;
    /// let forest = MstEngine::new(Backend::Sequential, NonZeroUsize::MIN).compute(graph)?;
    /// let tree = Phylogeny::from_forest(&forest, &samples)?;
    /// assert_eq!(tree.to_newick(), "(a:1,c:2)b;\n");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            render_newick(root, &mut out);
            out.push_str(";\n");
        }
        out
    }
}

fn component_members(
    start: usize,
    adjacency: &[Vec<(usize, f32)>],
    visited: &mut [bool],
) -> Vec<usize> {
    let mut members = Vec::new();
    let mut queue = vec![start];
    visited[start] = true;
    while let Some(vertex) = queue.pop() {
        members.push(vertex);
        for &(neighbour, _) in &adjacency[vertex] {
            if !visited[neighbour] {
                visited[neighbour] = true;
                queue.push(neighbour);
            }
        }
    }
    members
}

fn elect_root(members: &[usize], adjacency: &[Vec<(usize, f32)>]) -> usize {
    let mut root = members[0];
    for &member in members {
        let degree = adjacency[member].len();
        let best = adjacency[root].len();
        if degree > best || (degree == best && member < root) {
            root = member;
        }
    }
    root
}

fn build_node(
    vertex: usize,
    parent: Option<usize>,
    branch_length: Option<f32>,
    adjacency: &[Vec<(usize, f32)>],
    samples: &SampleIndex,
) -> PhyloNode {
    let children = adjacency[vertex]
        .iter()
        .filter(|&&(neighbour, _)| Some(neighbour) != parent)
        .map(|&(neighbour, weight)| {
            build_node(neighbour, Some(vertex), Some(weight), adjacency, samples)
        })
        .collect();
    PhyloNode {
        name: samples.name(vertex).unwrap_or_default().to_owned(),
        branch_length,
        children,
    }
}

fn render_newick(node: &PhyloNode, out: &mut String) {
    if !node.children.is_empty() {
        out.push('(');
        for (index, child) in node.children.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            render_newick(child, out);
        }
        out.push(')');
    }
    out.push_str(&quote_label(&node.name));
    if let Some(length) = node.branch_length {
        out.push(':');
        out.push_str(&length.to_string());
    }
}

/// Quotes a label when it contains Newick structural characters.
fn quote_label(name: &str) -> Cow<'_, str> {
    const STRUCTURAL: &[char] = &['(', ')', ',', ':', ';', '\'', '[', ']'];
    if name.is_empty() || name.contains(STRUCTURAL) || name.contains(char::is_whitespace) {
        let escaped = name.replace('\'', "''");
        Cow::Owned(format!("'{escaped}'"))
    } else {
        Cow::Borrowed(name)
    }
}
