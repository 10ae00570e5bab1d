//! Error types for rga-nn.

use thiserror::Error;

/// Protocol and network error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Error from the preprocessing crate.
    #[error(transparent)]
    Core(#[from] rga_core::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Tree walk cannot proceed (zero-node graph, empty level).
    #[error("invalid tree: {0}")]
    InvalidTree(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
