//! Property-based tests for the MST engine.
//!
//! Verifies structural forest invariants across generated topologies,
//! checks true minimality against an exhaustive oracle on small graphs,
//! and pins determinism and backend equivalence.

mod exhaustive;
mod strategies;
#[cfg(test)]
mod tests;
mod types;
