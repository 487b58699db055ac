//! Stemma core library: sparse distance graphs, prior-tree merging, and
//! minimum spanning tree construction for sample transmission networks.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod clustering;
mod graph;
mod mst;
mod phylogeny;
mod prior;
mod samples;

#[cfg(feature = "data-parallel")]
pub use crate::mst::minimum_spanning_forest_from_arrays;
pub use crate::{
    clustering::{ClusteringProvider, DefaultClustering},
    graph::{Edge, EdgeList, GraphError},
    mst::{
        Backend, MinimumSpanningForest, MstEdge, MstEngine, MstError, MstErrorCode,
        data_parallel_available,
    },
    phylogeny::{PhyloNode, Phylogeny, PhylogenyError},
    prior::{LabelledEdge, PriorImportError, PriorNetwork, import_prior_network},
    samples::{SampleIndex, SampleIndexError},
};
