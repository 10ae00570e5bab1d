//! Reference candle networks for the merge/split protocol.
//!
//! - [`MlpMergeEncoder`]: leaf MLP (`b*M -> E`), pair MLP (`2E -> E`) and a
//!   learned absent embedding
//! - [`MemoryEdgeDecoder`]: split MLP (`E -> 1 + F + 4E`) whose ratio heads go
//!   through a sigmoid, and a leaf MLP (`E -> b*M + 1 + F`)
//!
//! Embeddings are `(1, E)` tensors. `F` is the edge feature width.

use crate::config::{MlpConfig, ProtocolConfig};
use crate::error::{Error, Result};
use crate::protocol::{LeafBlock, LeafOutput, MergeEncoder, SplitDecoder, SplitOutput};
use candle_core::{Device, Tensor, D};
use candle_nn::{linear, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Nonlinearity between hidden layers.
///
/// In config files an activation is a name (`"ReLU"`, `"ELU"`, `"CELU"`,
/// parsed like [`FromStr`]) or `{"CELU": alpha}` for a non-default alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActivationRepr", into = "ActivationRepr")]
pub enum Activation {
    Relu,
    Elu,
    /// Continuously differentiable ELU with the given alpha.
    Celu(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ActivationRepr {
    Name(String),
    Celu {
        #[serde(rename = "CELU")]
        alpha: f64,
    },
}

impl TryFrom<ActivationRepr> for Activation {
    type Error = Error;

    fn try_from(repr: ActivationRepr) -> Result<Self> {
        match repr {
            ActivationRepr::Name(name) => name.parse(),
            ActivationRepr::Celu { alpha } => Ok(Activation::Celu(alpha)),
        }
    }
}

impl From<Activation> for ActivationRepr {
    fn from(activation: Activation) -> Self {
        match activation {
            Activation::Relu => ActivationRepr::Name("ReLU".into()),
            Activation::Elu => ActivationRepr::Name("ELU".into()),
            Activation::Celu(alpha) if alpha == 1.0 => ActivationRepr::Name("CELU".into()),
            Activation::Celu(alpha) => ActivationRepr::Celu { alpha },
        }
    }
}

impl Activation {
    pub fn apply(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match *self {
            Activation::Relu => xs.relu(),
            Activation::Elu => xs.elu(1.0),
            // celu(x) = alpha * elu(x / alpha)
            Activation::Celu(alpha) => xs.affine(1.0 / alpha, 0.0)?.elu(1.0)?.affine(alpha, 0.0),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    /// Parses `ReLU`, `ELU` or `CELU` (alpha 1), ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::Relu),
            "elu" => Ok(Activation::Elu),
            "celu" => Ok(Activation::Celu(1.0)),
            other => Err(Error::InvalidConfig(format!("unknown activation: {}", other))),
        }
    }
}

/// Fully connected stack with an activation between layers (none after the last).
pub struct Mlp {
    layers: Vec<Linear>,
    activation: Activation,
}

impl Mlp {
    /// Create an MLP `input -> hidden[0] -> ... -> output`.
    ///
    /// Layer `i` is stored under `layer{i}` in `vb`.
    pub fn new(
        input: usize,
        hidden: &[usize],
        output: usize,
        activation: Activation,
        vb: VarBuilder,
    ) -> candle_core::Result<Self> {
        let mut dims = Vec::with_capacity(hidden.len() + 2);
        dims.push(input);
        dims.extend_from_slice(hidden);
        dims.push(output);

        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(i, w)| linear(w[0], w[1], vb.pp(format!("layer{}", i))))
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(Self { layers, activation })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Module for Mlp {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut h = xs.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(&h)?;
            if i + 1 < self.layers.len() {
                h = self.activation.apply(&h)?;
            }
        }
        Ok(h)
    }
}

/// Candle encoder: one MLP per leaf block, one per pairing.
pub struct MlpMergeEncoder {
    leaf: Mlp,
    pair: Mlp,
    absent: Tensor,
    leaf_cells: usize,
    device: Device,
}

impl MlpMergeEncoder {
    /// Build the encoder for matrices encoded at `capacity`.
    ///
    /// Parameters live under `leaf.*`, `pair.*` and `absent` in `vb`; the
    /// absent embedding starts at zero.
    pub fn new(
        protocol: &ProtocolConfig,
        mlp: &MlpConfig,
        capacity: usize,
        vb: VarBuilder,
    ) -> Result<Self> {
        protocol.validate()?;
        mlp.validate()?;
        if capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }

        let e = protocol.embedding_size;
        let leaf_cells = protocol.leaf_cells(capacity);
        let hidden = &mlp.encoder_hidden_layer_sizes;
        let leaf = Mlp::new(leaf_cells, hidden, e, mlp.encoder_activation, vb.pp("leaf"))?;
        let pair = Mlp::new(2 * e, hidden, e, mlp.encoder_activation, vb.pp("pair"))?;
        let absent = vb.get_with_hints((1, e), "absent", candle_nn::init::ZERO)?;

        Ok(Self {
            leaf,
            pair,
            absent,
            leaf_cells,
            device: vb.device().clone(),
        })
    }
}

impl MergeEncoder for MlpMergeEncoder {
    type Embedding = Tensor;

    fn embed_leaf(&self, block: &LeafBlock) -> Result<Tensor> {
        if block.cells.len() != self.leaf_cells {
            return Err(Error::DimensionMismatch {
                expected: self.leaf_cells,
                got: block.cells.len(),
            });
        }
        let x = Tensor::from_vec(block.to_f32(), (1, self.leaf_cells), &self.device)?;
        Ok(self.leaf.forward(&x)?)
    }

    fn merge(&self, left: &Tensor, right: &Tensor) -> Result<Tensor> {
        let x = Tensor::cat(&[left, right], D::Minus1)?;
        Ok(self.pair.forward(&x)?)
    }

    fn absent(&self) -> Result<Tensor> {
        Ok(self.absent.clone())
    }
}

/// Candle decoder with memory-overwrite ratios.
pub struct MemoryEdgeDecoder {
    split: Mlp,
    leaf: Mlp,
    embedding_size: usize,
    edge_size: usize,
    leaf_cells: usize,
}

impl MemoryEdgeDecoder {
    /// Build the decoder for an output matrix of side `capacity`.
    ///
    /// Parameters live under `split.*` and `leaf.*` in `vb`.
    pub fn new(
        protocol: &ProtocolConfig,
        mlp: &MlpConfig,
        capacity: usize,
        vb: VarBuilder,
    ) -> Result<Self> {
        protocol.validate()?;
        mlp.validate()?;
        if capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }

        let e = protocol.embedding_size;
        let es = protocol.edge_size;
        let leaf_cells = protocol.leaf_cells(capacity);
        let hidden = &mlp.decoder_hidden_layer_sizes;
        let split = Mlp::new(e, hidden, 1 + es + 4 * e, mlp.decoder_activation, vb.pp("split"))?;
        let leaf = Mlp::new(e, hidden, leaf_cells + 1 + es, mlp.decoder_activation, vb.pp("leaf"))?;

        Ok(Self {
            split,
            leaf,
            embedding_size: e,
            edge_size: es,
            leaf_cells,
        })
    }
}

impl SplitDecoder for MemoryEdgeDecoder {
    type Embedding = Tensor;

    fn split(&self, parent: &Tensor) -> Result<SplitOutput<Tensor>> {
        let out = self.split.forward(parent)?;
        let e = self.embedding_size;
        let es = self.edge_size;
        let heads = 1 + es;

        let ratio = |k: usize| -> Result<Tensor> {
            Ok(candle_nn::ops::sigmoid(&out.narrow(D::Minus1, heads + k * e, e)?)?)
        };

        Ok(SplitOutput {
            mask_logit: first_value(&out)?,
            edge_features: values(&out, 1, es)?,
            fresh_left: out.narrow(D::Minus1, heads, e)?,
            fresh_right: out.narrow(D::Minus1, heads + e, e)?,
            ratio_left: ratio(2)?,
            ratio_right: ratio(3)?,
        })
    }

    fn emit_leaf(&self, leaf: &Tensor) -> Result<LeafOutput> {
        let out = self.leaf.forward(leaf)?;
        let flat: Vec<f32> = out.flatten_all()?.to_vec1()?;
        let expected = self.leaf_cells + 1 + self.edge_size;
        if flat.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                got: flat.len(),
            });
        }

        Ok(LeafOutput {
            edge_logits: flat[..self.leaf_cells].to_vec(),
            mask_logit: flat[self.leaf_cells],
            edge_features: flat[self.leaf_cells + 1..].to_vec(),
        })
    }
}

fn first_value(t: &Tensor) -> Result<f32> {
    values(t, 0, 1)?
        .first()
        .copied()
        .ok_or(Error::DimensionMismatch {
            expected: 1,
            got: 0,
        })
}

/// `len` values of the last dimension starting at `start`.
fn values(t: &Tensor, start: usize, len: usize) -> Result<Vec<f32>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    Ok(t.narrow(D::Minus1, start, len)?.flatten_all()?.to_vec1()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedding;
    use crate::protocol::{decode_graph, encode_graph};
    use crate::shape::TreeShape;
    use candle_core::DType;
    use candle_nn::VarMap;
    use rga_core::{encode, AdjMatrix};

    fn small_configs() -> (ProtocolConfig, MlpConfig) {
        let protocol = ProtocolConfig::default()
            .with_embedding_size(8)
            .with_edge_size(2)
            .with_block_size(2);
        let mlp = MlpConfig::default()
            .with_encoder_hidden(vec![16])
            .with_decoder_hidden(vec![16, 12]);
        (protocol, mlp)
    }

    fn to_vec(t: &Tensor) -> Vec<f32> {
        t.flatten_all().unwrap().to_vec1().unwrap()
    }

    #[test]
    fn test_activation_values() {
        let dev = Device::Cpu;
        let x = Tensor::new(&[-1.0f32, 0.0, 2.0], &dev).unwrap();

        assert_eq!(to_vec(&Activation::Relu.apply(&x).unwrap()), vec![0.0, 0.0, 2.0]);

        let elu = to_vec(&Activation::Elu.apply(&x).unwrap());
        assert!((elu[0] - ((-1.0f32).exp() - 1.0)).abs() < 1e-5);
        assert_eq!(elu[2], 2.0);

        let celu = to_vec(&Activation::Celu(2.0).apply(&x).unwrap());
        assert!((celu[0] - 2.0 * ((-0.5f32).exp() - 1.0)).abs() < 1e-5);
        assert!((celu[2] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_activation_parse() {
        assert_eq!("ReLU".parse::<Activation>().unwrap(), Activation::Relu);
        assert_eq!("elu".parse::<Activation>().unwrap(), Activation::Elu);
        assert_eq!("CELU".parse::<Activation>().unwrap(), Activation::Celu(1.0));
        assert!("tanh".parse::<Activation>().is_err());
    }

    #[test]
    fn test_activation_json_matches_parse() {
        for name in ["ReLU", "ELU", "CELU"] {
            let from_json: Activation = serde_json::from_str(&format!("\"{}\"", name)).unwrap();
            assert_eq!(from_json, name.parse::<Activation>().unwrap());
            assert_eq!(serde_json::to_string(&from_json).unwrap(), format!("\"{}\"", name));
        }

        let celu: Activation = serde_json::from_str(r#"{"CELU": 0.5}"#).unwrap();
        assert_eq!(celu, Activation::Celu(0.5));
        assert_eq!(serde_json::to_string(&celu).unwrap(), r#"{"CELU":0.5}"#);
        assert!(serde_json::from_str::<Activation>("\"tanh\"").is_err());
    }

    #[test]
    fn test_mlp_shape_and_layers() {
        let dev = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);

        let mlp = Mlp::new(10, &[6, 4], 3, Activation::Elu, vb.pp("m")).unwrap();
        assert_eq!(mlp.num_layers(), 3);
        let x = Tensor::randn(0f32, 1f32, (1, 10), &dev).unwrap();
        assert_eq!(mlp.forward(&x).unwrap().dims(), &[1, 3]);

        let single = Mlp::new(10, &[], 3, Activation::Relu, vb.pp("s")).unwrap();
        assert_eq!(single.num_layers(), 1);
    }

    #[test]
    fn test_encoder_shapes() {
        let dev = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);
        let (protocol, mlp) = small_configs();

        let enc = MlpMergeEncoder::new(&protocol, &mlp, 6, vb).unwrap();
        assert_eq!(to_vec(&enc.absent().unwrap()), vec![0.0; 8]);

        let cycle = AdjMatrix::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).unwrap();
        let m = encode(&cycle, 6).unwrap();
        let leaf = enc.embed_leaf(&LeafBlock::new(&m, 0, 2)).unwrap();
        assert_eq!(leaf.dims(), &[1, 8]);
        assert_eq!(enc.merge(&leaf, &leaf).unwrap().dims(), &[1, 8]);

        let wrong = LeafBlock::new(&m, 0, 3);
        assert!(matches!(
            enc.embed_leaf(&wrong),
            Err(Error::DimensionMismatch { expected: 12, got: 18 })
        ));
    }

    #[test]
    fn test_decoder_split_ratios_in_unit_interval() {
        let dev = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);
        let (protocol, mlp) = small_configs();

        let dec = MemoryEdgeDecoder::new(&protocol, &mlp, 6, vb).unwrap();
        let parent = Tensor::randn(0f32, 1f32, (1, 8), &dev).unwrap();
        let out = dec.split(&parent).unwrap();

        assert_eq!(out.edge_features.len(), 2);
        assert_eq!(out.fresh_left.dims(), &[1, 8]);
        assert_eq!(out.fresh_right.width(), 8);
        for r in to_vec(&out.ratio_left).into_iter().chain(to_vec(&out.ratio_right)) {
            assert!(r > 0.0 && r < 1.0);
        }

        let leaf = dec.emit_leaf(&parent).unwrap();
        assert_eq!(leaf.edge_logits.len(), 12);
        assert_eq!(leaf.edge_features.len(), 2);
    }

    #[test]
    fn test_decoder_without_edge_features() {
        let dev = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);
        let (protocol, mlp) = small_configs();

        let dec = MemoryEdgeDecoder::new(&protocol.with_edge_size(0), &mlp, 4, vb).unwrap();
        let parent = Tensor::randn(0f32, 1f32, (1, 8), &dev).unwrap();
        assert!(dec.split(&parent).unwrap().edge_features.is_empty());
        assert!(dec.emit_leaf(&parent).unwrap().edge_features.is_empty());
    }

    #[test]
    fn test_round_trip_through_networks() {
        let dev = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);
        let (protocol, mlp) = small_configs();
        let capacity = 7;

        let enc = MlpMergeEncoder::new(&protocol, &mlp, capacity, vb.pp("encoder")).unwrap();
        let dec = MemoryEdgeDecoder::new(&protocol, &mlp, capacity, vb.pp("decoder")).unwrap();

        let star = AdjMatrix::from_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let m = encode(&star, capacity).unwrap();
        let encoded = encode_graph(&enc, &m, protocol.block_size).unwrap();
        assert_eq!(encoded.shape.leaf_count(), 3);
        assert_eq!(encoded.root.dims(), &[1, 8]);

        let shape = TreeShape::new(capacity, protocol.block_size).unwrap();
        let decoded = decode_graph(&dec, encoded.root, &shape, capacity, Some(5)).unwrap();
        assert_eq!(decoded.leaves.len(), 4);
        assert!(decoded.edge_logits().iter().all(|l| l.is_finite()));
        let flags: Vec<bool> = decoded.leaves.iter().filter_map(|r| r.beyond_end).collect();
        assert_eq!(flags, vec![false, false, false, true]);
    }
}
