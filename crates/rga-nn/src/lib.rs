// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! Recursive merge/split tree protocol for graph autoencoders.
//!
//! A graph encoded at a fixed capacity is cut into leaf blocks of
//! `block_size` node rows, folded pairwise into a single root embedding, and
//! unfolded again into edge logits.
//!
//! - [`TreeShape`] - Level sizes and placeholder pairings for one graph size
//! - [`MergeEncoder`] / [`SplitDecoder`] - Network collaborators
//! - [`encode_graph`] / [`decode_graph`] - Level-by-level tree walks
//! - [`Embedding`] - Width and memory-overwrite blend (`Vec<f32>`, candle `Tensor`)
//! - [`nets`] - Candle MLP encoder and memory edge decoder
//!
//! # Example
//!
//! ```rust
//! use candle_core::{DType, Device};
//! use candle_nn::{VarBuilder, VarMap};
//! use rga_core::{encode, AdjMatrix};
//! use rga_nn::nets::{MemoryEdgeDecoder, MlpMergeEncoder};
//! use rga_nn::{decode_graph, encode_graph, MlpConfig, ProtocolConfig, TreeShape};
//!
//! let varmap = VarMap::new();
//! let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
//! let protocol = ProtocolConfig::default().with_embedding_size(16).with_block_size(2);
//! let mlp = MlpConfig::default().with_encoder_hidden(vec![32]).with_decoder_hidden(vec![32]);
//!
//! let capacity = 6;
//! let encoder = MlpMergeEncoder::new(&protocol, &mlp, capacity, vb.pp("enc")).unwrap();
//! let decoder = MemoryEdgeDecoder::new(&protocol, &mlp, capacity, vb.pp("dec")).unwrap();
//!
//! let path = AdjMatrix::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
//! let encoded = encode_graph(&encoder, &encode(&path, capacity).unwrap(), 2).unwrap();
//!
//! let shape = TreeShape::new(capacity, 2).unwrap();
//! let decoded = decode_graph(&decoder, encoded.root, &shape, capacity, Some(4)).unwrap();
//! assert_eq!(decoded.edge_logits().len(), capacity * capacity);
//! ```

pub mod config;
pub mod embedding;
mod error;
pub mod nets;
pub mod protocol;
pub mod shape;

pub use config::{MlpConfig, ProtocolConfig};
pub use embedding::Embedding;
pub use error::{Error, Result};
pub use nets::Activation;
pub use protocol::{
    decode_graph, encode_graph, DecodedGraph, EncodedGraph, LeafBlock, LeafOutput, MergeEncoder,
    SplitDecoder, SplitOutput, StepRecord,
};
pub use shape::{MergeStep, SlotId, TreeShape};
