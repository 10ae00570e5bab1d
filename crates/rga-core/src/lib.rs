// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::len_without_is_empty)]

//! Graph preprocessing for recursive graph autoencoders.
//!
//! Turns arbitrary-size graphs into a deduplicated dataset of fixed-capacity
//! adjacency encodings:
//!
//! - [`AdjMatrix`] - Validated square 0/1 adjacency matrix
//! - [`algo::canonicalize`] - BFS node reordering
//! - [`algo::augment`] - Random relabelings of a graph
//! - [`encode`] / [`EncodedMatrix`] - Top-left anchored `capacity x capacity` buffer
//! - [`dedupe`] - Stable duplicate removal
//! - [`DatasetBuilder`] - The whole pipeline, parallel over graphs
//! - [`loader`] - In-memory and TU benchmark graph sources
//!
//! # Example
//!
//! ```rust
//! use rga_core::{AdjMatrix, DatasetBuilder, PipelineConfig};
//! use rga_core::loader::InMemoryLoader;
//!
//! let cycle = AdjMatrix::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
//! let path = AdjMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
//!
//! let config = PipelineConfig::default()
//!     .with_num_permutations(3)
//!     .with_bfs(true);
//! let dataset = DatasetBuilder::new(config)
//!     .build_from(&InMemoryLoader::from_matrices(&[cycle, path], None))
//!     .unwrap();
//!
//! assert_eq!(dataset.capacity, 4);
//! assert!(dataset.entries.iter().all(|e| e.matrix.capacity() == 4));
//! ```

pub mod algo;
pub mod config;
pub mod dataset;
pub mod dedup;
pub mod encoding;
mod error;
pub mod loader;
mod matrix;

pub use config::PipelineConfig;
pub use dataset::{
    split_train_val_test, BuildStats, Dataset, DatasetBuilder, DatasetEntry, Splits,
};
pub use dedup::dedupe;
pub use encoding::{encode, Cell, EncodedMatrix, EDGE, NO_EDGE, SENTINEL};
pub use error::{Error, Result};
pub use loader::{GraphLoader, Label, RawGraphs};
pub use matrix::{AdjMatrix, Permutation};

// Re-export petgraph for callers converting their own graphs
pub use petgraph;
