//! Persisted text formats and the decomposed-crystal input.
//!
//! Every format here round-trips: reading a file and writing the result back
//! reproduces the original bytes. Downstream job deduplication depends on the
//! dimer numbering and group files staying stable between runs.
//!
//! - [`crystal`] - TOML description of a decomposed crystal
//! - [`ledger`] - Fixed-width dimer ledger
//! - [`groups`] - Equivalence-group files, one bracketed id list per line
//! - [`pairs`] - Equivalence-pair files, one list of tuples

pub mod crystal;
pub mod error;
pub mod groups;
pub mod ledger;
pub mod pairs;
pub mod traits;
