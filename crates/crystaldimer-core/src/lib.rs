//! # crystaldimer Core Library
//!
//! Prepares molecular-crystal structures for downstream electronic-structure
//! calculations: it finds every pair of molecules close enough to form a dimer
//! across the periodic lattice, and collapses molecules and dimers into minimal
//! sets of structurally and conformationally distinct representatives.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Lattice`, `Molecule`,
//!   `Structure`, `Dimer`), the covalent bond-length table, geometry helpers, and
//!   the persisted text formats (dimer ledger, equivalence groups and pairs).
//!
//! - **[`engine`]: The Logic Core.** The periodic displacement enumerator, the
//!   wrapped-component locator, the cooperative neighbor pair generators, the dimer
//!   assembler, the equivalence clique builder and the symmetry/comparator pipeline.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures tying the engine
//!   together: dimer discovery with ledger reuse, and equivalence grouping of
//!   molecules and dimers.

pub mod core;
pub mod engine;
pub mod workflows;
