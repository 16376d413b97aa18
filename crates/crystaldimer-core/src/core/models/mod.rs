//! # Core Models Module
//!
//! Data structures describing a decomposed molecular crystal.
//!
//! ## Key Components
//!
//! - [`ids`] - Stable identifiers for molecules and dimers
//! - [`element`] - Chemical element symbols
//! - [`lattice`] - Lattice matrix and integer lattice displacements
//! - [`structure`] - Atomic coordinates plus bond graph
//! - [`molecule`] - A crystal molecule with its stable id
//! - [`dimer`] - Numbered molecule pairs produced by the neighbor search
//! - [`crystal`] - The decomposed crystal: lattice, molecules and symmetry operations
//! - [`symmetry`] - Point-group operations supplied by an external detector
//! - [`equivalence`] - Equivalence pairs and partitions into groups
//!
//! Molecules are created once by an external decomposer and are read-only here.
//! Dimers are immutable once numbered.

pub mod crystal;
pub mod dimer;
pub mod element;
pub mod equivalence;
pub mod ids;
pub mod lattice;
pub mod molecule;
pub mod structure;
pub mod symmetry;
