//! # Workflows Module
//!
//! End-to-end procedures built on the engine.
//!
//! - [`dimers`] searches the crystal for close molecule pairs and turns them
//!   into numbered, recentered dimers, optionally reusing the recentering of
//!   a previous run.
//! - [`equivalence`] groups molecules or dimers into structural and
//!   conformational species.
//!
//! Each workflow reports phases through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and fails
//! on the first consistency violation.

pub mod dimers;
pub mod equivalence;
