//! Shape of the merge tree.
//!
//! The tree is never materialized as linked nodes. A level is an index range
//! `0..level_size(l)`; slot `(l + 1, p)` is the parent of `(l, 2p)` and
//! `(l, 2p + 1)`. When a level has an odd size, its last slot is paired with
//! an absent placeholder, so every level halves the count rounding up:
//!
//! ```text
//!  n = 5, block_size = 1
//!
//!  level 3:              r
//!  level 2:        a           b
//!  level 1:     c     d     e     .
//!  level 0:    0 1   2 3   4 .
//! ```
//!
//! Everything here is a pure function of `(node_count, block_size)`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Address of an embedding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
    pub level: usize,
    pub position: usize,
}

/// One pairing between level `level` and level `level + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStep {
    /// Level of the children.
    pub level: usize,
    pub left: usize,
    /// `None` when the left child is paired with the absent placeholder.
    pub right: Option<usize>,
    /// Position of the parent at `level + 1`.
    pub parent: usize,
}

/// Leaf and level counts for one graph size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    node_count: usize,
    block_size: usize,
    level_sizes: Vec<usize>,
}

impl TreeShape {
    /// Shape for `node_count` nodes split into blocks of `block_size` rows.
    ///
    /// # Errors
    /// [`Error::InvalidTree`] if either argument is zero.
    pub fn new(node_count: usize, block_size: usize) -> Result<Self> {
        if node_count == 0 {
            return Err(Error::InvalidTree("graph has no nodes".into()));
        }
        if block_size == 0 {
            return Err(Error::InvalidTree("block size must be at least 1".into()));
        }

        let mut level_sizes = vec![node_count.div_ceil(block_size)];
        while let Some(&last) = level_sizes.last() {
            if last <= 1 {
                break;
            }
            level_sizes.push(last.div_ceil(2));
        }

        Ok(Self {
            node_count,
            block_size,
            level_sizes,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of leaves, `ceil(node_count / block_size)`.
    pub fn leaf_count(&self) -> usize {
        self.level_sizes[0]
    }

    /// Number of merge levels, `ceil(log2(leaf_count))`.
    pub fn depth(&self) -> usize {
        self.level_sizes.len() - 1
    }

    /// Slots at `level` (0 = leaves).
    pub fn level_size(&self, level: usize) -> usize {
        self.level_sizes.get(level).copied().unwrap_or(0)
    }

    pub fn level_sizes(&self) -> &[usize] {
        &self.level_sizes
    }

    pub fn root(&self) -> SlotId {
        SlotId {
            level: self.depth(),
            position: 0,
        }
    }

    /// Placeholder pairings per merge level (one entry per level below the root).
    pub fn placeholders(&self) -> Vec<usize> {
        self.level_sizes[..self.depth()]
            .iter()
            .map(|s| s % 2)
            .collect()
    }

    /// Total placeholder pairings in the tree.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders().iter().sum()
    }

    /// Pairings that build level `level + 1` from level `level`, left to right.
    pub fn merge_steps(&self, level: usize) -> impl Iterator<Item = MergeStep> + '_ {
        let size = self.level_size(level);
        let parents = if level < self.depth() {
            self.level_size(level + 1)
        } else {
            0
        };
        (0..parents).map(move |p| MergeStep {
            level,
            left: 2 * p,
            right: (2 * p + 1 < size).then_some(2 * p + 1),
            parent: p,
        })
    }

    /// First node row covered by a slot.
    pub fn span_start(&self, slot: SlotId) -> usize {
        (slot.position << slot.level) * self.block_size
    }

    /// Node rows `[start, start + rows)` covered by leaf `leaf`.
    pub fn leaf_rows(&self, leaf: usize) -> (usize, usize) {
        (leaf * self.block_size, self.block_size)
    }

    /// Whether a slot covers only rows at or beyond `true_node_count`.
    pub fn beyond_end(&self, slot: SlotId, true_node_count: usize) -> bool {
        self.span_start(slot) >= true_node_count
    }
}
