//! Cluster label lookup for display purposes.
//!
//! Labels never influence the graph or the MST; they only colour exported
//! artifacts. The trait decouples label assignment from any particular
//! storage so that a delimited table, a database, or nothing at all can
//! stand behind it.

/// Maps a sample name to its display cluster label.
pub trait ClusteringProvider {
    /// Returns the label for `sample`, or `None` when the sample is not
    /// covered by this clustering.
    fn label_of(&self, sample: &str) -> Option<&str>;
}

/// Assigns every sample the same constant label.
///
/// Used when no clustering table is supplied: all samples belong to one
/// display cluster.
///
/// # Examples
/// ```
/// use stemma_core::{ClusteringProvider, DefaultClustering};
///
/// let clustering = DefaultClustering::new();
/// assert_eq!(clustering.label_of("anything"), Some("0"));
/// ```
#[derive(Clone, Debug)]
pub struct DefaultClustering {
    label: String,
}

impl DefaultClustering {
    /// Creates a clustering that answers `"0"` for every sample.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: "0".to_owned(),
        }
    }

    /// Creates a clustering that answers `label` for every sample.
    #[must_use]
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for DefaultClustering {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusteringProvider for DefaultClustering {
    fn label_of(&self, _sample: &str) -> Option<&str> {
        Some(&self.label)
    }
}
