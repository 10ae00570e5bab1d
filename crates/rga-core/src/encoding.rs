//! Fixed-capacity adjacency encoding.
//!
//! Every graph of a dataset is written into a `capacity x capacity` buffer,
//! where `capacity` is the largest node count in the dataset. The real
//! `n x n` adjacency sits in the top-left corner; every other cell holds
//! [`SENTINEL`]. Because the anchoring is the same for every entry, cell
//! `(i, j)` means "edge between node `i` and node `j`" across the whole
//! dataset, which is what the merge protocol relies on when it addresses
//! blocks by absolute row.
//!
//! ```text
//!  n = 3, capacity = 5
//!
//!   0  1  0 -1 -1
//!   1  0  1 -1 -1
//!   0  1  0 -1 -1
//!  -1 -1 -1 -1 -1
//!  -1 -1 -1 -1 -1
//! ```

use crate::error::{Error, Result};
use crate::matrix::AdjMatrix;
use serde::{Deserialize, Serialize};

/// Cell value for "outside the real graph".
pub const SENTINEL: i8 = -1;
/// Cell value for a present edge.
pub const EDGE: i8 = 1;
/// Cell value for an absent edge inside the real graph.
pub const NO_EDGE: i8 = 0;

/// Typed view of one encoded cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Edge,
    NoEdge,
    /// Padding beyond the true node count.
    Absent,
}

impl Cell {
    fn from_raw(v: i8) -> Self {
        match v {
            EDGE => Self::Edge,
            NO_EDGE => Self::NoEdge,
            _ => Self::Absent,
        }
    }
}

/// A graph written into a fixed-capacity buffer, paired with its node count.
///
/// The two fields are only ever constructed together by [`encode`]; the node
/// count is what tells consumers where real data ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedMatrix {
    capacity: usize,
    node_count: usize,
    cells: Vec<i8>,
}

impl EncodedMatrix {
    /// Side length of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of real nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Raw cell value.
    #[must_use]
    pub fn raw(&self, row: usize, col: usize) -> i8 {
        self.cells[row * self.capacity + col]
    }

    /// Typed cell value. Sentinel cells are always [`Cell::Absent`].
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        Cell::from_raw(self.raw(row, col))
    }

    /// Row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[i8] {
        &self.cells
    }

    /// Rows `[start, start + rows)` across every column, row-major.
    ///
    /// Rows past the end of the buffer come back as sentinel, so the
    /// returned length is always `rows * capacity`.
    #[must_use]
    pub fn row_segment(&self, start: usize, rows: usize) -> Vec<i8> {
        let mut out = vec![SENTINEL; rows * self.capacity];
        let end = (start + rows).min(self.capacity);
        if start < end {
            let src = &self.cells[start * self.capacity..end * self.capacity];
            out[..src.len()].copy_from_slice(src);
        }
        out
    }

    /// The `[0, n) x [0, n)` region as an adjacency matrix.
    pub fn real_region(&self) -> Result<AdjMatrix> {
        let n = self.node_count;
        let rows: Vec<Vec<u8>> = (0..n)
            .map(|i| (0..n).map(|j| u8::from(self.cell(i, j) == Cell::Edge)).collect())
            .collect();
        AdjMatrix::from_rows(&rows)
    }
}

/// Write `adj` into a `capacity x capacity` buffer, top-left anchored.
///
/// # Errors
/// [`Error::CapacityExceeded`] if the graph has more nodes than `capacity`.
/// Graphs are never truncated.
pub fn encode(adj: &AdjMatrix, capacity: usize) -> Result<EncodedMatrix> {
    let n = adj.node_count();
    if n > capacity {
        return Err(Error::CapacityExceeded { nodes: n, capacity });
    }

    let mut cells = vec![SENTINEL; capacity * capacity];
    for i in 0..n {
        let dst = &mut cells[i * capacity..i * capacity + n];
        for (d, &s) in dst.iter_mut().zip(adj.row(i)) {
            *d = if s == 1 { EDGE } else { NO_EDGE };
        }
    }

    Ok(EncodedMatrix {
        capacity,
        node_count: n,
        cells,
    })
}
