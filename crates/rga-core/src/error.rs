//! Error types for rga-core.

use thiserror::Error;

/// Pipeline error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Adjacency input that is not a square 0/1 matrix with at least one node.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Graph does not fit in the encoding buffer.
    #[error("graph has {nodes} nodes but encoding capacity is {capacity}")]
    CapacityExceeded { nodes: usize, capacity: usize },

    /// Labels requested but missing, or not one label per graph.
    #[error("label mismatch: {0}")]
    LabelMismatch(String),

    /// Nothing left to build a dataset from.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed loader input.
    #[error("parse error in {file} line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
