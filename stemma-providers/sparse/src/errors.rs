use std::io;
use std::path::PathBuf;

use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Errors raised while loading a sparse distance matrix from Parquet.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SparseDistancesError {
    /// The matrix file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A required column is missing from the Parquet schema.
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound {
        /// Name of the missing column.
        column: &'static str,
    },
    /// A column carries an unexpected Arrow type.
    #[error("column `{column}` must be {expected} but found {actual:?}")]
    InvalidColumnType {
        /// Name of the offending column.
        column: &'static str,
        /// Required Arrow type, as text.
        expected: &'static str,
        /// The type actually found.
        actual: DataType,
    },
    /// A column entry is null.
    #[error("column `{column}` contains a null at row {row}")]
    NullValue {
        /// Name of the offending column.
        column: &'static str,
        /// Row index of the null entry.
        row: usize,
    },
    /// An index value does not fit the host pointer width.
    #[error("column `{column}` value {value} exceeds the addressable index range")]
    IndexOverflow {
        /// Name of the offending column.
        column: &'static str,
        /// The oversized value.
        value: u64,
    },
    /// Arrow failed while decoding a record batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Parquet failed while reading the file.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Errors raised while loading a sample-name list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SampleListError {
    /// The sample list file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("invalid sample list document: {0}")]
    Json(#[from] serde_json::Error),
    /// A self-comparison list was required but the document holds
    /// query-against-reference names.
    #[error("sample list was produced by a query-against-reference comparison")]
    NonSelfDistances,
}
