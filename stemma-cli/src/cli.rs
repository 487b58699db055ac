//! Command-line orchestration for the stemma spanning-tree pipeline.
//!
//! Validates the option surface, loads the sparse distances and sample
//! names, folds in a previously computed tree when one is supplied,
//! computes the minimum spanning tree, and exports the network, Newick,
//! and plot artifacts.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};

use stemma_core::{
    Backend, DefaultClustering, EdgeList, GraphError, MstEngine, MstError, Phylogeny,
    PhylogenyError, PriorImportError, PriorNetwork, SampleIndex, SampleIndexError,
    import_prior_network,
};
use stemma_providers_clustering::{ClusteringTable, ClusteringTableError};
use stemma_providers_network::{NetworkDocument, NetworkDocumentError};
use stemma_providers_sparse::{
    SampleListDocument, SampleListError, SparseDistances, SparseDistancesError,
};

use crate::artifacts::{self, ArtifactError};

/// Column name reported when no clustering table is supplied.
const DEFAULT_CLUSTER_COLUMN: &str = "Cluster";

/// Command-line options for building a spanning tree over sparse distances.
#[derive(Clone, Debug, Parser)]
#[command(
    name = "stemma",
    about = "Build a minimum spanning tree over sparse sample distances."
)]
pub struct Cli {
    /// Sparse distance matrix (Parquet with row/col/weight columns).
    #[arg(long = "rank-fit", value_name = "FILE")]
    pub rank_fit: PathBuf,

    /// Sample-name list (JSON) matching the distance matrix.
    #[arg(long, value_name = "FILE")]
    pub samples: PathBuf,

    /// Output directory for artifacts, created if absent.
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Previously computed network to merge into this run.
    #[arg(long = "previous-mst", value_name = "FILE")]
    pub previous_mst: Option<PathBuf>,

    /// Sample-name list (JSON) of the previous run.
    #[arg(long = "previous-samples", value_name = "FILE")]
    pub previous_samples: Option<PathBuf>,

    /// Clustering table (CSV) used to label the plot.
    #[arg(long = "previous-clustering", value_name = "FILE")]
    pub previous_clustering: Option<PathBuf>,

    /// Clustering column to colour the plot by.
    #[arg(long = "display-cluster", value_name = "NAME")]
    pub display_cluster: Option<String>,

    /// Skip the Graphviz plot export.
    #[arg(long = "no-plot", default_value_t = false)]
    pub no_plot: bool,

    /// Number of worker threads.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(usize))]
    pub threads: usize,

    /// Use the data-parallel MST backend when this build carries it.
    #[arg(long = "data-parallel", default_value_t = false)]
    pub data_parallel: bool,
}

/// Errors surfaced while executing the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Two options that must travel together were not both supplied.
    #[error("`{present}` also requires `{missing}` to be supplied")]
    MissingPairedOption {
        /// The option that was supplied.
        present: &'static str,
        /// The option that is missing.
        missing: &'static str,
    },
    /// A referenced input file does not exist.
    #[error("cannot find file `{path}`")]
    MissingInput {
        /// Path that does not exist.
        path: PathBuf,
    },
    /// The output directory could not be created.
    #[error("cannot create output directory `{path}`: {source}")]
    OutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The thread count must be at least one.
    #[error("--threads must be at least 1 (got {got})")]
    InvalidThreads {
        /// The rejected value.
        got: usize,
    },
    /// Sparse distance ingestion failed.
    #[error(transparent)]
    Distances(#[from] SparseDistancesError),
    /// Sample-list ingestion failed.
    #[error(transparent)]
    Samples(#[from] SampleListError),
    /// The sample list was internally inconsistent.
    #[error(transparent)]
    Index(#[from] SampleIndexError),
    /// The distance matrix did not fit the sample list.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The previous network could not be loaded.
    #[error(transparent)]
    Network(#[from] NetworkDocumentError),
    /// The previous network could not be remapped.
    #[error(transparent)]
    PriorImport(#[from] PriorImportError),
    /// The clustering table could not be loaded or queried.
    #[error(transparent)]
    Clustering(#[from] ClusteringTableError),
    /// MST computation failed.
    #[error(transparent)]
    Mst(#[from] MstError),
    /// Tree conversion failed.
    #[error(transparent)]
    Tree(#[from] PhylogenyError),
    /// Artifact export failed.
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),
}

impl CliError {
    /// Returns the stable code of the underlying error, when one exists.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::MissingPairedOption { .. } => Some("MISSING_PAIRED_OPTION"),
            Self::MissingInput { .. } => Some("MISSING_INPUT"),
            Self::OutputDir { .. } => Some("OUTPUT_DIR"),
            Self::InvalidThreads { .. } => Some("INVALID_THREADS"),
            Self::Index(err) => Some(err.code()),
            Self::Graph(err) => Some(err.code()),
            Self::PriorImport(PriorImportError::Samples(err)) => Some(err.code()),
            Self::PriorImport(PriorImportError::Graph(err)) => Some(err.code()),
            Self::Clustering(err) => Some(err.code()),
            Self::Mst(err) => Some(err.code().as_str()),
            Self::Tree(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// Summarises the outcome of one pipeline run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Number of samples in the (possibly extended) identity space.
    pub samples: usize,
    /// Number of edges in the combined graph handed to the engine.
    pub graph_edges: usize,
    /// Number of edges in the resulting spanning structure.
    pub spanning_edges: usize,
    /// Number of connected components.
    pub components: usize,
    /// Total weight of the spanning structure.
    pub total_weight: f64,
    /// Artifacts written, in write order.
    pub outputs: Vec<PathBuf>,
}

/// What to do about the plot artifact, decided before any computation.
enum PlotPlan {
    Skip,
    DefaultLabels,
    Table(ClusteringTable),
}

/// Executes the pipeline described by `cli`.
///
/// # Errors
/// Returns [`CliError`] when validation, loading, computation, or the
/// network/tree export fails. A failing plot export is only logged.
pub fn run_cli(cli: Cli) -> Result<RunSummary, CliError> {
    validate_option_pairs(&cli)?;
    ensure_input_exists(&cli.rank_fit)?;
    ensure_input_exists(&cli.samples)?;
    for path in [&cli.previous_mst, &cli.previous_samples, &cli.previous_clustering]
        .into_iter()
        .flatten()
    {
        ensure_input_exists(path)?;
    }
    let threads = NonZeroUsize::new(cli.threads)
        .ok_or(CliError::InvalidThreads { got: cli.threads })?;
    ensure_output_dir(&cli.output)?;

    // Resolve the plot inputs up front: an absent display column is a
    // configuration error and must abort before anything is computed.
    let plot_plan = resolve_plot_plan(&cli)?;

    info!("loading distances into graph");
    let names = SampleListDocument::try_from_path(&cli.samples)?.into_names(false)?;
    let mut samples = SampleIndex::from_names(names)?;
    let distances = SparseDistances::try_from_parquet_path(&cli.rank_fit)?;
    let new_edges = distances.edge_list(samples.len())?;

    let previous = cli
        .previous_mst
        .as_deref()
        .map(NetworkDocument::try_from_path)
        .transpose()?;
    let old_samples = cli
        .previous_samples
        .as_deref()
        .map(load_sample_index)
        .transpose()?;

    let prior_edges = import_prior_network(
        previous.as_ref().map(|document| document as &dyn PriorNetwork),
        old_samples.as_ref(),
        &mut samples,
    )?;

    let combined = EdgeList::merge(new_edges, prior_edges);
    let graph_edges = combined.len();

    let requested = if cli.data_parallel {
        Backend::DataParallel
    } else {
        Backend::Sequential
    };
    let forest = MstEngine::new(requested, threads).compute(combined)?;
    if !forest.is_tree() {
        warn!(
            components = forest.component_count(),
            "graph is disconnected; exporting a spanning forest"
        );
    }

    info!("generating output");
    let document = NetworkDocument::from_forest(&forest, &samples)?;
    let phylogeny = Phylogeny::from_forest(&forest, &samples)?;
    let base = output_basename(&cli.output);
    let mut outputs = artifacts::write_network_and_tree(&cli.output, &base, &document, &phylogeny)?;

    // The plot is best-effort: a failure here must not invalidate the
    // network and tree artifacts already on disk.
    let plot = match &plot_plan {
        PlotPlan::Skip => None,
        PlotPlan::DefaultLabels => Some(artifacts::write_plot(
            &cli.output,
            &base,
            &forest,
            &samples,
            &DefaultClustering::new(),
            DEFAULT_CLUSTER_COLUMN,
        )),
        PlotPlan::Table(table) => {
            let selected = table.select(cli.display_cluster.as_deref())?;
            Some(artifacts::write_plot(
                &cli.output,
                &base,
                &forest,
                &samples,
                &selected,
                selected.column(),
            ))
        }
    };
    match plot {
        Some(Ok(path)) => outputs.push(path),
        Some(Err(err)) => warn!(
            error = %err,
            "plot export failed; network and tree artifacts are unaffected"
        ),
        None => {}
    }

    Ok(RunSummary {
        samples: samples.len(),
        graph_edges,
        spanning_edges: forest.edges().len(),
        components: forest.component_count(),
        total_weight: forest.total_weight(),
        outputs,
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &RunSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "samples: {}", summary.samples)?;
    writeln!(writer, "graph edges: {}", summary.graph_edges)?;
    writeln!(writer, "spanning edges: {}", summary.spanning_edges)?;
    writeln!(writer, "components: {}", summary.components)?;
    writeln!(writer, "total weight: {}", summary.total_weight)?;
    for path in &summary.outputs {
        writeln!(writer, "wrote {}", path.display())?;
    }
    Ok(())
}

fn validate_option_pairs(cli: &Cli) -> Result<(), CliError> {
    if cli.previous_samples.is_some() && cli.previous_mst.is_none() {
        return Err(CliError::MissingPairedOption {
            present: "--previous-samples",
            missing: "--previous-mst",
        });
    }
    if cli.display_cluster.is_some() && cli.previous_clustering.is_none() {
        return Err(CliError::MissingPairedOption {
            present: "--display-cluster",
            missing: "--previous-clustering",
        });
    }
    Ok(())
}

fn ensure_input_exists(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::MissingInput {
            path: path.to_path_buf(),
        })
    }
}

fn ensure_output_dir(path: &Path) -> Result<(), CliError> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| CliError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve_plot_plan(cli: &Cli) -> Result<PlotPlan, CliError> {
    if cli.no_plot {
        return Ok(PlotPlan::Skip);
    }
    match &cli.previous_clustering {
        Some(path) => {
            let table = ClusteringTable::try_from_path(path)?;
            table.select(cli.display_cluster.as_deref())?;
            Ok(PlotPlan::Table(table))
        }
        None => Ok(PlotPlan::DefaultLabels),
    }
}

fn load_sample_index(path: &Path) -> Result<SampleIndex, CliError> {
    let names = SampleListDocument::try_from_path(path)?.into_names(false)?;
    Ok(SampleIndex::from_names(names)?)
}

fn output_basename(output: &Path) -> String {
    output
        .file_name()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "stemma".to_owned())
}
