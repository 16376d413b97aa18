//! # Topology Module
//!
//! Bonding knowledge consumed by the wrapped-component locator.
//!
//! The neighbor search only needs one fact about chemistry: the longest
//! distance at which two atoms of given elements can still be covalently bonded.
//! That fact is expressed through the [`covalent::BondLengthTable`] trait so that
//! callers can substitute their own table; [`covalent::CovalentRadii`] is the
//! built-in default.

pub mod covalent;
