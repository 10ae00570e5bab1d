//! Graph algorithms used while building a dataset.
//!
//! - [`canonical`] - BFS node ordering
//! - [`augment`] - Random relabelings

pub mod augment;
pub mod canonical;

pub use augment::augment;
pub use canonical::{bfs_order, canonicalize};
