//! Sample identity bookkeeping.
//!
//! Sample names are the durable identity of an isolate across runs; vertex
//! ids are dense per-run indices assigned by insertion order. Reconciliation
//! maps a previous run's ids into the current run's numbering, extending the
//! current index with samples only the previous run knew about.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while constructing a [`SampleIndex`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SampleIndexError {
    /// The same sample name appeared more than once in the input list.
    #[error("duplicate sample name `{name}`")]
    DuplicateSample {
        /// The repeated name.
        name: String,
    },
}

impl SampleIndexError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateSample { .. } => "DUPLICATE_SAMPLE",
        }
    }
}

/// Ordered sample names with name-to-id lookup.
///
/// Insertion order defines vertex ids: the first name is id `0`, the second
/// id `1`, and so on. Ids are stable only for the lifetime of one pipeline
/// invocation; the names are what survives between runs.
///
/// # Examples
/// ```
/// use stemma_core::SampleIndex;
///
/// let index = SampleIndex::from_names(["s1", "s2", "s3"])?;
/// assert_eq!(index.len(), 3);
/// assert_eq!(index.id_of("s2"), Some(1));
/// assert_eq!(index.name(2), Some("s3"));
/// # Ok::<(), stemma_core::SampleIndexError>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SampleIndex {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl SampleIndex {
    /// Builds an index from an ordered list of sample names.
    ///
    /// # Errors
    /// Returns [`SampleIndexError::DuplicateSample`] when a name repeats;
    /// a graph built over an ambiguous identity space cannot be trusted.
    pub fn from_names<I, S>(names: I) -> Result<Self, SampleIndexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for name in names {
            let name = name.into();
            if index.ids.contains_key(&name) {
                return Err(SampleIndexError::DuplicateSample { name });
            }
            index.ids.insert(name.clone(), index.names.len());
            index.names.push(name);
        }
        Ok(index)
    }

    /// Returns the number of samples in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when the index holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name assigned to `id`, if `id` is in range.
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Returns the id assigned to `name`, if the name is known.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    /// Returns the names in id order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the id for `name`, inserting it at the end when unknown.
    pub fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len();
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    /// Maps every id of `old` to its id in `current`.
    ///
    /// Names present only in `old` are appended to `current`, preserving
    /// their relative order from `old`. The returned vector is indexed by
    /// old id. This models a previous run whose samples are a subset of,
    /// a superset of, or disjoint from the current run's samples.
    ///
    /// # Examples
    /// ```
    /// use stemma_core::SampleIndex;
    ///
    /// let old = SampleIndex::from_names(["a", "b"])?;
    /// let mut current = SampleIndex::from_names(["b", "c"])?;
    /// let map = SampleIndex::reconcile(&old, &mut current);
    /// assert_eq!(map, vec![2, 0]);
    /// assert_eq!(current.names(), ["b", "c", "a"]);
    /// # Ok::<(), stemma_core::SampleIndexError>(())
    /// ```
    pub fn reconcile(old: &Self, current: &mut Self) -> Vec<usize> {
        old.names
            .iter()
            .map(|name| current.get_or_insert(name))
            .collect()
    }
}
