//! Recursive merge/split protocol.
//!
//! An encoder folds a graph's leaf blocks into one root embedding; a decoder
//! unfolds a root embedding back into per-leaf edge logits. Both walk the
//! tree described by [`TreeShape`] one level at a time. Only the current
//! level's slots are alive: children are moved into the merge (or out of the
//! split) and dropped afterwards.
//!
//! # Leaves
//!
//! Leaf `j` owns node rows `[j * b, (j + 1) * b)` of the encoded matrix,
//! across all `capacity` columns. Rows past the real graph (or past the
//! buffer) are sentinel, so every leaf block has exactly `b * capacity`
//! cells and positional meaning is the same for every graph.
//!
//! # Encode
//!
//! ```text
//! level 0: embed_leaf(block_j)                      for j in 0..k
//! level l+1: merge(slot[2p], slot[2p+1] or absent)  for p in 0..ceil(size_l / 2)
//! ```
//!
//! # Decode
//!
//! Each split yields a mask logit, edge features, two fresh children and two
//! memory-overwrite ratios. The children actually recursed into are
//! `ratio * fresh + (1 - ratio) * parent`. A right child that lands on a
//! placeholder slot is dropped. At the leaves the decoder emits edge logits
//! for the leaf block, written at the leaf's absolute rows.

use crate::embedding::Embedding;
use crate::error::{Error, Result};
use crate::shape::{SlotId, TreeShape};
use rga_core::{AdjMatrix, EncodedMatrix, SENTINEL};
use tracing::debug;

/// Cells of one leaf, read from an encoded matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafBlock {
    /// Leaf position.
    pub index: usize,
    /// First node row covered.
    pub start_row: usize,
    /// Rows covered (the block size).
    pub rows: usize,
    /// Columns per row (the encoding capacity).
    pub columns: usize,
    /// Row-major raw cells, sentinel outside the real graph.
    pub cells: Vec<i8>,
}

impl LeafBlock {
    pub fn new(matrix: &EncodedMatrix, index: usize, block_size: usize) -> Self {
        let start_row = index * block_size;
        Self {
            index,
            start_row,
            rows: block_size,
            columns: matrix.capacity(),
            cells: matrix.row_segment(start_row, block_size),
        }
    }

    /// Cells as network input.
    pub fn to_f32(&self) -> Vec<f32> {
        self.cells.iter().map(|&c| f32::from(c)).collect()
    }

    /// Whether every cell is padding.
    pub fn is_padding(&self) -> bool {
        self.cells.iter().all(|&c| c == SENTINEL)
    }
}

/// Encoder side of the protocol.
pub trait MergeEncoder {
    type Embedding: Embedding;

    /// Embed one leaf block.
    fn embed_leaf(&self, block: &LeafBlock) -> Result<Self::Embedding>;

    /// Fuse two sibling embeddings into their parent.
    fn merge(&self, left: &Self::Embedding, right: &Self::Embedding) -> Result<Self::Embedding>;

    /// Placeholder paired with the last slot of an odd-sized level.
    fn absent(&self) -> Result<Self::Embedding>;
}

/// Raw output of one decoder split, before blending.
#[derive(Debug, Clone)]
pub struct SplitOutput<E> {
    pub mask_logit: f32,
    pub edge_features: Vec<f32>,
    pub fresh_left: E,
    pub fresh_right: E,
    pub ratio_left: E,
    pub ratio_right: E,
}

/// Decoder output for one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafOutput {
    /// Row-major logits for the leaf block (`rows * capacity`).
    pub edge_logits: Vec<f32>,
    pub edge_features: Vec<f32>,
    pub mask_logit: f32,
}

/// Decoder side of the protocol.
pub trait SplitDecoder {
    type Embedding: Embedding;

    fn split(&self, parent: &Self::Embedding) -> Result<SplitOutput<Self::Embedding>>;

    fn emit_leaf(&self, leaf: &Self::Embedding) -> Result<LeafOutput>;
}

/// Result of [`encode_graph`].
#[derive(Debug, Clone)]
pub struct EncodedGraph<E> {
    pub root: E,
    pub shape: TreeShape,
}

/// Fold `matrix` into a single embedding.
///
/// The tree is shaped by the matrix's true node count.
///
/// # Errors
/// [`Error::InvalidTree`] for a zero block size, [`Error::DimensionMismatch`]
/// if the encoder returns embeddings of inconsistent width, and whatever the
/// encoder itself returns.
pub fn encode_graph<M: MergeEncoder>(
    encoder: &M,
    matrix: &EncodedMatrix,
    block_size: usize,
) -> Result<EncodedGraph<M::Embedding>> {
    let shape = TreeShape::new(matrix.node_count(), block_size)?;

    let mut slots: Vec<Option<M::Embedding>> = (0..shape.leaf_count())
        .map(|j| encoder.embed_leaf(&LeafBlock::new(matrix, j, block_size)).map(Some))
        .collect::<Result<_>>()?;
    let width = slots
        .first()
        .and_then(|s| s.as_ref())
        .map(|e| e.width())
        .ok_or_else(|| Error::InvalidTree("no leaves".into()))?;
    for leaf in slots.iter().flatten() {
        check_width(leaf, width)?;
    }

    for level in 0..shape.depth() {
        let mut next: Vec<Option<M::Embedding>> = Vec::with_capacity(shape.level_size(level + 1));
        for step in shape.merge_steps(level) {
            let left = take_slot(&mut slots, step.left)?;
            let right = match step.right {
                Some(r) => take_slot(&mut slots, r)?,
                None => {
                    let absent = encoder.absent()?;
                    check_width(&absent, width)?;
                    absent
                }
            };
            let parent = encoder.merge(&left, &right)?;
            check_width(&parent, width)?;
            next.push(Some(parent));
        }
        debug!(level = level + 1, slots = next.len(), "merged level");
        slots = next;
    }

    let root = take_slot(&mut slots, 0)?;
    Ok(EncodedGraph { root, shape })
}

fn check_width<E: Embedding>(embedding: &E, width: usize) -> Result<()> {
    if embedding.width() != width {
        return Err(Error::DimensionMismatch {
            expected: width,
            got: embedding.width(),
        });
    }
    Ok(())
}

fn take_slot<E>(slots: &mut [Option<E>], position: usize) -> Result<E> {
    slots
        .get_mut(position)
        .and_then(Option::take)
        .ok_or_else(|| Error::InvalidTree(format!("slot {} is empty", position)))
}

/// Mask and features produced for one tree slot while decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub slot: SlotId,
    /// First node row covered by the slot.
    pub span_start: usize,
    pub mask_logit: f32,
    pub edge_features: Vec<f32>,
    /// Mask target: the slot lies entirely beyond the true node count.
    /// `None` when decoding without a known node count.
    pub beyond_end: Option<bool>,
}

/// Output of [`decode_graph`].
#[derive(Debug, Clone)]
pub struct DecodedGraph {
    capacity: usize,
    shape: TreeShape,
    /// `capacity x capacity` logits; rows no leaf covered stay `-inf`.
    edge_logits: Vec<f32>,
    /// One record per split, top-down, left to right.
    pub splits: Vec<StepRecord>,
    /// One record per leaf, left to right.
    pub leaves: Vec<StepRecord>,
}

impl DecodedGraph {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shape(&self) -> &TreeShape {
        &self.shape
    }

    pub fn edge_logit(&self, row: usize, col: usize) -> f32 {
        self.edge_logits[row * self.capacity + col]
    }

    pub fn edge_logits(&self) -> &[f32] {
        &self.edge_logits
    }

    /// Node count implied by the leaf masks: rows before the first leaf whose
    /// mask logit is positive, capped at the capacity.
    pub fn predicted_node_count(&self) -> usize {
        let leaves_before_end = self
            .leaves
            .iter()
            .position(|r| r.mask_logit > 0.0)
            .unwrap_or(self.leaves.len());
        (leaves_before_end * self.shape.block_size()).min(self.capacity)
    }

    /// Threshold the logits inside the predicted node count.
    ///
    /// A pair is connected when either direction's logit exceeds `threshold`.
    pub fn to_adjacency(&self, threshold: f32) -> Result<AdjMatrix> {
        let n = self.predicted_node_count();
        let rows: Vec<Vec<u8>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        u8::from(self.edge_logit(i, j) > threshold || self.edge_logit(j, i) > threshold)
                    })
                    .collect()
            })
            .collect();
        Ok(AdjMatrix::from_rows(&rows)?)
    }
}

/// Unfold `root` into edge logits for a `capacity x capacity` matrix.
///
/// # Arguments
/// * `decoder` - Split/leaf network
/// * `root` - Graph embedding
/// * `shape` - Tree to walk; use [`TreeShape::new`]`(capacity, block_size)`
///   for a shape independent of the graph's size
/// * `capacity` - Output side length, equal to the encoding capacity
/// * `true_node_count` - When known, fills [`StepRecord::beyond_end`]
pub fn decode_graph<D: SplitDecoder>(
    decoder: &D,
    root: D::Embedding,
    shape: &TreeShape,
    capacity: usize,
    true_node_count: Option<usize>,
) -> Result<DecodedGraph> {
    let block_size = shape.block_size();
    let leaf_cells = block_size * capacity;
    let record = |slot: SlotId, mask_logit: f32, edge_features: Vec<f32>| StepRecord {
        slot,
        span_start: shape.span_start(slot),
        mask_logit,
        edge_features,
        beyond_end: true_node_count.map(|n| shape.beyond_end(slot, n)),
    };

    let mut splits = Vec::new();
    let mut slots: Vec<Option<D::Embedding>> = vec![Some(root)];

    for level in (0..shape.depth()).rev() {
        let size = shape.level_size(level);
        let mut next: Vec<Option<D::Embedding>> = Vec::with_capacity(size);
        for position in 0..slots.len() {
            let parent = take_slot(&mut slots, position)?;
            let out = decoder.split(&parent)?;
            splits.push(record(
                SlotId {
                    level: level + 1,
                    position,
                },
                out.mask_logit,
                out.edge_features,
            ));

            next.push(Some(D::Embedding::blend(
                &out.fresh_left,
                &parent,
                &out.ratio_left,
            )?));
            if 2 * position + 1 < size {
                next.push(Some(D::Embedding::blend(
                    &out.fresh_right,
                    &parent,
                    &out.ratio_right,
                )?));
            }
        }
        debug!(level, slots = next.len(), "split level");
        slots = next;
    }

    let mut edge_logits = vec![f32::NEG_INFINITY; capacity * capacity];
    let mut leaves = Vec::with_capacity(slots.len());
    for position in 0..slots.len() {
        let leaf = take_slot(&mut slots, position)?;
        let out = decoder.emit_leaf(&leaf)?;
        if out.edge_logits.len() != leaf_cells {
            return Err(Error::DimensionMismatch {
                expected: leaf_cells,
                got: out.edge_logits.len(),
            });
        }

        let (start, rows) = shape.leaf_rows(position);
        let end = (start + rows).min(capacity);
        if start < end {
            let n_cells = (end - start) * capacity;
            edge_logits[start * capacity..end * capacity]
                .copy_from_slice(&out.edge_logits[..n_cells]);
        }

        leaves.push(record(
            SlotId { level: 0, position },
            out.mask_logit,
            out.edge_features,
        ));
    }

    Ok(DecodedGraph {
        capacity,
        shape: shape.clone(),
        edge_logits,
        splits,
        leaves,
    })
}
