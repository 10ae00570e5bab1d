//! Protocol and network sizes.

use crate::error::{Error, Result};
use crate::nets::Activation;
use serde::{Deserialize, Serialize};

/// Sizes shared by every encoder/decoder pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Width of every tree embedding (default: 160).
    pub embedding_size: usize,
    /// Width of the per-slot edge feature vector; 0 disables it (default: 1).
    pub edge_size: usize,
    /// Node rows per leaf (default: 4).
    pub block_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            embedding_size: 160,
            edge_size: 1,
            block_size: 4,
        }
    }
}

impl ProtocolConfig {
    pub fn with_embedding_size(mut self, size: usize) -> Self {
        self.embedding_size = size;
        self
    }

    pub fn with_edge_size(mut self, size: usize) -> Self {
        self.edge_size = size;
        self
    }

    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Cells in one leaf block for a given encoding capacity.
    pub fn leaf_cells(&self, capacity: usize) -> usize {
        self.block_size * capacity
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_size == 0 {
            return Err(Error::InvalidConfig("embedding_size must be at least 1".into()));
        }
        if self.block_size == 0 {
            return Err(Error::InvalidConfig("block_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Hidden layers of the reference MLP networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    /// Hidden widths of the encoder's leaf and pair networks (default: [256]).
    pub encoder_hidden_layer_sizes: Vec<usize>,
    /// Hidden widths of the decoder's split and leaf networks (default: [256]).
    pub decoder_hidden_layer_sizes: Vec<usize>,
    pub encoder_activation: Activation,
    pub decoder_activation: Activation,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            encoder_hidden_layer_sizes: vec![256],
            decoder_hidden_layer_sizes: vec![256],
            encoder_activation: Activation::Relu,
            decoder_activation: Activation::Relu,
        }
    }
}

impl MlpConfig {
    pub fn with_encoder_hidden(mut self, sizes: Vec<usize>) -> Self {
        self.encoder_hidden_layer_sizes = sizes;
        self
    }

    pub fn with_decoder_hidden(mut self, sizes: Vec<usize>) -> Self {
        self.decoder_hidden_layer_sizes = sizes;
        self
    }

    /// Use the same activation on both sides.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.encoder_activation = activation;
        self.decoder_activation = activation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self
            .encoder_hidden_layer_sizes
            .iter()
            .chain(&self.decoder_hidden_layer_sizes)
            .any(|&w| w == 0)
        {
            return Err(Error::InvalidConfig("hidden layer sizes must be positive".into()));
        }
        for activation in [self.encoder_activation, self.decoder_activation] {
            if let Activation::Celu(alpha) = activation {
                if !(alpha.is_finite() && alpha > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "CELU alpha must be positive, got {}",
                        alpha
                    )));
                }
            }
        }
        Ok(())
    }
}
