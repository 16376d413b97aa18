//! # Core Module
//!
//! Fundamental building blocks shared by the search and equivalence engines.
//!
//! ## Architecture
//!
//! - **Crystal Representation** ([`models`]) - Lattice, molecules, structures and dimers
//! - **File I/O** ([`io`]) - Decomposed-crystal input and the persisted ledger/group/pair formats
//! - **Bonding Knowledge** ([`topology`]) - Covalent radii and maximum bond lengths
//! - **Utilities** ([`utils`]) - Small geometric helpers
//!
//! Everything in this layer is stateless; algorithms that carry state across
//! calls (generators, clique builders) live in [`crate::engine`].

pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
