//! # Engine Module
//!
//! Algorithms behind the two halves of the pipeline: the periodic neighbor
//! search that discovers dimers, and the equivalence machinery that groups
//! molecules and dimers into distinct species.
//!
//! ## Neighbor search
//!
//! - [`displacement`] walks integer lattice vectors shell by shell.
//! - [`components`] finds the fragments a molecule splits into when wrapped
//!   into the reference cell.
//! - [`neighbors`] turns both into candidate pairs, one suspension per
//!   candidate, in a per-pair and a whole-crystal variant.
//! - [`distance`] scores candidates; [`dimers`] sorts, numbers and recenters
//!   the accepted ones.
//!
//! ## Equivalence
//!
//! - [`symmetry`] matches entities under point-group rotations.
//! - [`equivalence`] holds the comparator seam, the conformational graph and
//!   group merging; [`cliques`] turns equivalence pairs into a partition.
//!
//! Settings live in [`config`], failures in [`error`], and long operations
//! report through [`progress`].

pub mod cliques;
pub mod components;
pub mod config;
pub mod dimers;
pub mod displacement;
pub mod distance;
pub mod equivalence;
pub mod error;
pub mod neighbors;
pub mod progress;
pub mod symmetry;
pub mod tasks;
