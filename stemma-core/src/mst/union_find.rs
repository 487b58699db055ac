//! Striped-lock union-find for the data-parallel backend.
//!
//! Lock-free reads over atomic parent pointers, with one mutex stripe per
//! vertex id acquired by root id. A join locks the `(smaller, larger)` root
//! pair, then re-reads the roots: if the structure moved while the locks
//! were being acquired, the attempt retries from scratch. Disjoint joins
//! therefore proceed in parallel without a global lock, and no lock ordering
//! cycle can form.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicUsize, Ordering},
};

use super::MstError;

pub(super) struct StripedUnionFind {
    parents: Vec<AtomicUsize>,
    ranks: Vec<AtomicUsize>,
    components: AtomicUsize,
    stripes: Vec<Mutex<()>>,
}

impl StripedUnionFind {
    pub(super) fn new(node_count: usize) -> Self {
        Self {
            parents: (0..node_count).map(AtomicUsize::new).collect(),
            ranks: (0..node_count).map(|_| AtomicUsize::new(0)).collect(),
            components: AtomicUsize::new(node_count),
            stripes: (0..node_count).map(|_| Mutex::new(())).collect(),
        }
    }

    pub(super) fn component_count(&self) -> usize {
        self.components.load(Ordering::Acquire)
    }

    /// Joins the sets containing `left` and `right`.
    ///
    /// Returns `Ok(false)` when they were already joined.
    ///
    /// # Errors
    /// Returns [`MstError::LockPoisoned`] when a stripe mutex was poisoned
    /// by a panicking worker.
    pub(super) fn try_join(&self, left: usize, right: usize) -> Result<bool, MstError> {
        loop {
            let left_root = self.find(left);
            let right_root = self.find(right);
            if left_root == right_root {
                return Ok(false);
            }

            let (low, high) = ordered(left_root, right_root);
            let _low_guard = self.stripe(low)?;
            let _high_guard = (high != low).then(|| self.stripe(high)).transpose()?;

            // The roots may have moved while we waited for the stripes.
            let left_root = self.find(left);
            let right_root = self.find(right);
            if left_root == right_root {
                return Ok(false);
            }
            if ordered(left_root, right_root) != (low, high) {
                continue;
            }
            if !self.is_root(left_root) || !self.is_root(right_root) {
                continue;
            }

            self.link(left_root, right_root);
            return Ok(true);
        }
    }

    /// Links two current roots under the held stripe locks.
    fn link(&self, left_root: usize, right_root: usize) {
        let left_rank = self.ranks[left_root].load(Ordering::Relaxed);
        let right_rank = self.ranks[right_root].load(Ordering::Relaxed);

        let (parent, child) = if left_rank > right_rank {
            (left_root, right_root)
        } else if right_rank > left_rank {
            (right_root, left_root)
        } else {
            ordered(left_root, right_root)
        };

        self.parents[child].store(parent, Ordering::Release);
        if left_rank == right_rank {
            self.ranks[parent].fetch_add(1, Ordering::Relaxed);
        }
        self.components.fetch_sub(1, Ordering::AcqRel);
    }

    fn stripe(&self, root: usize) -> Result<MutexGuard<'_, ()>, MstError> {
        let stripe = self
            .stripes
            .get(root)
            .ok_or(MstError::InvariantViolation {
                invariant: "root id must be within the stripe table",
                index: root,
            })?;
        stripe.lock().map_err(|_| MstError::LockPoisoned {
            resource: "union-find stripe",
        })
    }

    fn is_root(&self, node: usize) -> bool {
        self.parents[node].load(Ordering::Acquire) == node
    }

    fn find(&self, node: usize) -> usize {
        let mut current = node;
        loop {
            let parent = self.parents[current].load(Ordering::Acquire);
            if parent == current {
                return current;
            }
            let grandparent = self.parents[parent].load(Ordering::Acquire);
            if grandparent != parent {
                self.parents[current].store(grandparent, Ordering::Release);
            }
            current = parent;
        }
    }
}

fn ordered(first: usize, second: usize) -> (usize, usize) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}
