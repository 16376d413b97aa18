//! Batch jobs the workflows fan out over a thread pool.
//!
//! Each task owns its inputs per work item and returns owned results, which
//! are combined in a deterministic order.

pub mod neighbor_search;
pub mod pair_comparison;
