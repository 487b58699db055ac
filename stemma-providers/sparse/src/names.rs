//! Sample-name list loading.
//!
//! The distance pipeline stores the names behind a matrix's integer indices
//! in a small JSON document alongside the matrix itself. The `self` flag
//! records whether the distances compare the sample set against itself;
//! spanning-tree construction only makes sense over self-comparisons.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::SampleListError;

/// A persisted sample-name list.
///
/// # Examples
/// ```
/// use stemma_providers_sparse::SampleListDocument;
///
/// let doc: SampleListDocument =
///     serde_json::from_str(r#"{"names": ["s1", "s2"], "self": true}"#)?;
/// assert_eq!(doc.names, ["s1", "s2"]);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SampleListDocument {
    /// Sample names in vertex-index order.
    pub names: Vec<String>,
    /// `true` when the distances compare the sample set against itself.
    #[serde(rename = "self", default = "default_self_comparison")]
    pub self_comparison: bool,
}

const fn default_self_comparison() -> bool {
    true
}

impl SampleListDocument {
    /// Loads a sample list from a JSON file.
    ///
    /// # Errors
    /// Returns [`SampleListError`] when the file cannot be opened or the
    /// document is malformed.
    pub fn try_from_path(path: impl AsRef<Path>) -> Result<Self, SampleListError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SampleListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Extracts the names, optionally insisting on a self-comparison list.
    ///
    /// # Errors
    /// Returns [`SampleListError::NonSelfDistances`] when `allow_non_self`
    /// is `false` and the document records a query-against-reference
    /// comparison.
    pub fn into_names(self, allow_non_self: bool) -> Result<Vec<String>, SampleListError> {
        if !allow_non_self && !self.self_comparison {
            return Err(SampleListError::NonSelfDistances);
        }
        Ok(self.names)
    }
}
