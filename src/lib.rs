//! `rga` bundles the recursive graph autoencoder pieces:
//!
//! - [`pipeline`] (`rga-core`): canonicalization, augmentation, fixed-capacity
//!   encoding, deduplication and dataset construction
//! - [`nn`] (`rga-nn`): the merge/split tree protocol and candle reference
//!   networks

pub use rga_core as pipeline;
pub use rga_nn as nn;

pub use rga_core::{
    AdjMatrix, Dataset, DatasetBuilder, EncodedMatrix, GraphLoader, PipelineConfig,
};
pub use rga_nn::{decode_graph, encode_graph, MlpConfig, ProtocolConfig, TreeShape};
