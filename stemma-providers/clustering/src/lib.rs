//! Clustering tables keyed by sample name.
//!
//! A clustering CSV names each sample in its first column and carries one
//! or more label columns after it. Labels only colour exported artifacts;
//! they never influence graph construction. Selecting a column yields a
//! view implementing the core clustering seam.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use thiserror::Error;

use stemma_core::ClusteringProvider;

/// Errors raised while loading or querying a clustering table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClusteringTableError {
    /// The CSV could not be opened or parsed.
    #[error("failed to read clustering table: {0}")]
    Csv(#[from] csv::Error),
    /// The table has no header row.
    #[error("clustering table `{path}` has no header row")]
    MissingHeader {
        /// Path of the offending table.
        path: PathBuf,
    },
    /// The table has a sample column but no label columns.
    #[error("clustering table `{path}` has no label columns")]
    NoLabelColumns {
        /// Path of the offending table.
        path: PathBuf,
    },
    /// The same sample appears in more than one row.
    #[error("clustering table lists sample `{name}` more than once")]
    DuplicateSample {
        /// The repeated sample name.
        name: String,
    },
    /// The requested display column does not exist.
    #[error("clustering column `{column}` not found in `{path}`")]
    ColumnNotFound {
        /// Name of the requested column.
        column: String,
        /// Path of the table that lacks it.
        path: PathBuf,
    },
}

impl ClusteringTableError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Csv(_) => "CLUSTERING_CSV",
            Self::MissingHeader { .. } => "CLUSTERING_MISSING_HEADER",
            Self::NoLabelColumns { .. } => "CLUSTERING_NO_LABEL_COLUMNS",
            Self::DuplicateSample { .. } => "CLUSTERING_DUPLICATE_SAMPLE",
            Self::ColumnNotFound { .. } => "CLUSTERING_COLUMN_NOT_FOUND",
        }
    }
}

/// A loaded clustering table.
#[derive(Clone, Debug)]
pub struct ClusteringTable {
    path: PathBuf,
    columns: Vec<String>,
    rows: HashMap<String, Vec<String>>,
}

impl ClusteringTable {
    /// Loads a table from a comma-delimited file with a header row.
    ///
    /// # Errors
    /// Returns [`ClusteringTableError`] when the file cannot be read, the
    /// header is missing or has no label columns, or a sample repeats.
    pub fn try_from_path(path: impl AsRef<Path>) -> Result<Self, ClusteringTableError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;

        let headers = reader.headers()?.clone();
        let mut header_fields = headers.iter();
        if header_fields.next().is_none() {
            return Err(ClusteringTableError::MissingHeader { path });
        }
        let columns: Vec<String> = header_fields.map(str::to_owned).collect();
        if columns.is_empty() {
            return Err(ClusteringTableError::NoLabelColumns { path });
        }

        let mut rows = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let Some(sample) = fields.next() else {
                continue;
            };
            let labels: Vec<String> = fields.map(str::to_owned).collect();
            if rows.insert(sample.to_owned(), labels).is_some() {
                return Err(ClusteringTableError::DuplicateSample {
                    name: sample.to_owned(),
                });
            }
        }

        Ok(Self {
            path,
            columns,
            rows,
        })
    }

    /// Returns the label column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of samples in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Selects a label column, defaulting to the first one.
    ///
    /// # Errors
    /// Returns [`ClusteringTableError::ColumnNotFound`] naming the column
    /// when an explicitly requested column is absent.
    pub fn select(
        &self,
        column: Option<&str>,
    ) -> Result<SelectedClustering<'_>, ClusteringTableError> {
        let index = match column {
            Some(name) => self.columns.iter().position(|c| c == name).ok_or_else(|| {
                ClusteringTableError::ColumnNotFound {
                    column: name.to_owned(),
                    path: self.path.clone(),
                }
            })?,
            None => 0,
        };
        Ok(SelectedClustering { table: self, index })
    }
}

/// A single label column of a [`ClusteringTable`].
#[derive(Clone, Copy, Debug)]
pub struct SelectedClustering<'a> {
    table: &'a ClusteringTable,
    index: usize,
}

impl SelectedClustering<'_> {
    /// Returns the name of the selected column.
    #[must_use]
    pub fn column(&self) -> &str {
        self.table
            .columns
            .get(self.index)
            .map_or("", String::as_str)
    }
}

impl ClusteringProvider for SelectedClustering<'_> {
    fn label_of(&self, sample: &str) -> Option<&str> {
        self.table
            .rows
            .get(sample)
            .and_then(|labels| labels.get(self.index))
            .map(String::as_str)
    }
}
