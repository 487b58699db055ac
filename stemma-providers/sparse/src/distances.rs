//! Sparse distance-matrix ingestion.
//!
//! The matrix arrives as COO triples in a Parquet file with `row`, `col`,
//! and `weight` columns. Indices are validated against the sample list only
//! when the triples are turned into an edge list; this module checks types
//! and nulls.

use std::{fs::File, path::Path};

use arrow_array::{Array, Float32Array, RecordBatchReader, UInt64Array};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;

use stemma_core::{EdgeList, GraphError};

use crate::errors::SparseDistancesError;

/// Name of the row-index column.
pub const ROW_COLUMN: &str = "row";
/// Name of the column-index column.
pub const COL_COLUMN: &str = "col";
/// Name of the distance column.
pub const WEIGHT_COLUMN: &str = "weight";

/// A sparse pairwise-distance matrix in COO triple form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseDistances {
    triples: Vec<(usize, usize, f32)>,
}

impl SparseDistances {
    /// Creates a matrix from in-memory triples.
    #[must_use]
    pub const fn from_triples(triples: Vec<(usize, usize, f32)>) -> Self {
        Self { triples }
    }

    /// Loads a matrix from a Parquet file.
    ///
    /// # Errors
    /// Returns [`SparseDistancesError`] when the file cannot be opened or
    /// does not carry the expected `row`/`col`/`weight` columns.
    pub fn try_from_parquet_path(path: impl AsRef<Path>) -> Result<Self, SparseDistancesError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SparseDistancesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::try_from_parquet_reader(file)
    }

    /// Loads a matrix from a Parquet reader.
    ///
    /// # Errors
    /// Returns [`SparseDistancesError`] when the schema or the data do not
    /// match the expected COO layout.
    pub fn try_from_parquet_reader<R>(reader: R) -> Result<Self, SparseDistancesError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(
            builder.parquet_schema(),
            [ROW_COLUMN, COL_COLUMN, WEIGHT_COLUMN],
        );
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let row_index = column_index(&schema, ROW_COLUMN)?;
        let col_index = column_index(&schema, COL_COLUMN)?;
        let weight_index = column_index(&schema, WEIGHT_COLUMN)?;

        let mut triples = Vec::new();
        for batch in reader {
            let batch = batch?;
            let rows = index_column(batch.column(row_index), ROW_COLUMN)?;
            let cols = index_column(batch.column(col_index), COL_COLUMN)?;
            let weights = weight_column(batch.column(weight_index), WEIGHT_COLUMN)?;
            let offset = triples.len();
            for entry in 0..batch.num_rows() {
                let row = index_value(rows, entry, offset, ROW_COLUMN)?;
                let col = index_value(cols, entry, offset, COL_COLUMN)?;
                if weights.is_null(entry) {
                    return Err(SparseDistancesError::NullValue {
                        column: WEIGHT_COLUMN,
                        row: offset + entry,
                    });
                }
                triples.push((row, col, weights.value(entry)));
            }
        }
        Ok(Self { triples })
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` when the matrix stores no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns the triples in file order.
    #[must_use]
    pub fn triples(&self) -> &[(usize, usize, f32)] {
        &self.triples
    }

    /// Builds an edge list over `node_count` vertices.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when a stored index is at or
    /// beyond `node_count`; the matrix and the sample list disagree.
    pub fn edge_list(&self, node_count: usize) -> Result<EdgeList, GraphError> {
        EdgeList::from_sparse(node_count, self.triples.iter().copied())
    }
}

fn column_index(
    schema: &arrow_schema::SchemaRef,
    column: &'static str,
) -> Result<usize, SparseDistancesError> {
    schema
        .index_of(column)
        .map_err(|_| SparseDistancesError::ColumnNotFound { column })
}

fn index_column<'a>(
    array: &'a arrow_array::ArrayRef,
    column: &'static str,
) -> Result<&'a UInt64Array, SparseDistancesError> {
    array.as_any().downcast_ref::<UInt64Array>().ok_or_else(|| {
        SparseDistancesError::InvalidColumnType {
            column,
            expected: "UInt64",
            actual: array.data_type().clone(),
        }
    })
}

fn weight_column<'a>(
    array: &'a arrow_array::ArrayRef,
    column: &'static str,
) -> Result<&'a Float32Array, SparseDistancesError> {
    array
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| SparseDistancesError::InvalidColumnType {
            column,
            expected: "Float32",
            actual: array.data_type().clone(),
        })
}

fn index_value(
    array: &UInt64Array,
    entry: usize,
    offset: usize,
    column: &'static str,
) -> Result<usize, SparseDistancesError> {
    if array.is_null(entry) {
        return Err(SparseDistancesError::NullValue {
            column,
            row: offset + entry,
        });
    }
    let value = array.value(entry);
    usize::try_from(value).map_err(|_| SparseDistancesError::IndexOverflow { column, value })
}
