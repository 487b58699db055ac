//! Sparse distance-matrix and sample-list ingestion for stemma.

mod distances;
mod errors;
mod names;

pub use crate::{
    distances::{COL_COLUMN, ROW_COLUMN, SparseDistances, WEIGHT_COLUMN},
    errors::{SampleListError, SparseDistancesError},
    names::SampleListDocument,
};
