//! Dense adjacency matrices and node relabelings.
//!
//! [`AdjMatrix`] is the validated form every graph enters the pipeline in:
//! square, non-empty, and holding only `0`/`1` cells. Validation happens once
//! at construction, so the rest of the crate never re-checks shape or values.

use crate::error::{Error, Result};
use petgraph::graph::{IndexType, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::{EdgeType, Graph};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Square 0/1 adjacency matrix of a graph with at least one node.
///
/// Stored row-major. Row `i` lists the neighbours of node `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjMatrix {
    n: usize,
    cells: Vec<u8>,
}

impl AdjMatrix {
    /// Build a matrix from raw rows.
    ///
    /// # Errors
    /// [`Error::InvalidGraph`] if there are no rows, a row length differs from
    /// the row count, or a cell is neither `0` nor `1`.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::InvalidGraph("graph has no nodes".into()));
        }
        let mut cells = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(Error::InvalidGraph(format!(
                    "matrix is not square: row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some((j, v)) = row.iter().enumerate().find(|(_, &v)| v > 1) {
                return Err(Error::InvalidGraph(format!(
                    "matrix is not binary: cell ({}, {}) = {}",
                    i, j, v
                )));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self { n, cells })
    }

    /// Build an undirected graph with `n` nodes from an edge list.
    ///
    /// Each `(u, v)` sets both `(u, v)` and `(v, u)`. Repeated edges are
    /// harmless.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidGraph("graph has no nodes".into()));
        }
        let mut m = Self {
            n,
            cells: vec![0; n * n],
        };
        for &(u, v) in edges {
            if u >= n || v >= n {
                return Err(Error::InvalidGraph(format!(
                    "edge ({}, {}) out of range for {} nodes",
                    u, v, n
                )));
            }
            m.cells[u * n + v] = 1;
            m.cells[v * n + u] = 1;
        }
        Ok(m)
    }

    /// Convert a petgraph graph, treating every edge as undirected.
    pub fn from_petgraph<N, E, Ty: EdgeType, Ix: IndexType>(
        graph: &Graph<N, E, Ty, Ix>,
    ) -> Result<Self> {
        let edges: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Self::from_edges(graph.node_count(), &edges)
    }

    /// Undirected petgraph view, one edge per connected pair.
    #[must_use]
    pub fn to_petgraph(&self) -> UnGraph<(), ()> {
        let mut graph = UnGraph::with_capacity(self.n, self.set_cell_count());
        for _ in 0..self.n {
            graph.add_node(());
        }
        for i in 0..self.n {
            for j in i..self.n {
                if self.has_edge(i, j) || self.has_edge(j, i) {
                    graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
                }
            }
        }
        graph
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Whether cell `(i, j)` is set.
    #[must_use]
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.n + j] == 1
    }

    /// Row `i` as raw cells.
    #[must_use]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// Neighbours of `i` in increasing index order.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i)
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 1)
            .map(|(j, _)| j)
    }

    /// Number of set cells (twice the edge count for a symmetric matrix).
    #[must_use]
    pub fn set_cell_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 1).count()
    }

    /// Out-degree of node `i` (row sum).
    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors(i).count()
    }

    /// Degrees of all nodes, sorted ascending.
    #[must_use]
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = (0..self.n).map(|i| self.degree(i)).collect();
        degrees.sort_unstable();
        degrees
    }

    /// Row-major cells.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Relabel nodes: node `i` becomes node `perm[i]`.
    ///
    /// # Errors
    /// [`Error::InvalidGraph`] if the permutation length differs from the
    /// node count.
    pub fn permuted(&self, perm: &Permutation) -> Result<Self> {
        if perm.len() != self.n {
            return Err(Error::InvalidGraph(format!(
                "permutation over {} nodes applied to a {}-node graph",
                perm.len(),
                self.n
            )));
        }
        let n = self.n;
        let mut cells = vec![0; n * n];
        for i in 0..n {
            let pi = perm.get(i);
            for j in 0..n {
                cells[pi * n + perm.get(j)] = self.cells[i * n + j];
            }
        }
        Ok(Self { n, cells })
    }
}

/// A bijection over `{0, .., n-1}`; entry `i` is the new index of node `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Validate and wrap a mapping.
    ///
    /// # Errors
    /// [`Error::InvalidGraph`] if `mapping` is not a bijection.
    pub fn new(mapping: Vec<usize>) -> Result<Self> {
        let n = mapping.len();
        let mut seen = vec![false; n];
        for &target in &mapping {
            if target >= n || seen[target] {
                return Err(Error::InvalidGraph(format!(
                    "mapping is not a bijection over {} nodes",
                    n
                )));
            }
            seen[target] = true;
        }
        Ok(Self(mapping))
    }

    /// Uniformly random permutation (Fisher-Yates).
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut mapping: Vec<usize> = (0..n).collect();
        mapping.shuffle(rng);
        Self(mapping)
    }

    /// Permutation sending `order[k]` to `k`.
    ///
    /// `order` lists old indices in their new order, as a traversal does.
    pub fn from_order(order: &[usize]) -> Result<Self> {
        let n = order.len();
        let mut mapping = vec![usize::MAX; n];
        for (new, &old) in order.iter().enumerate() {
            if old >= n || mapping[old] != usize::MAX {
                return Err(Error::InvalidGraph(format!(
                    "order is not a bijection over {} nodes",
                    n
                )));
            }
            mapping[old] = new;
        }
        Ok(Self(mapping))
    }

    /// New index of node `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> usize {
        self.0[i]
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the permutation over zero nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inverse mapping.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (i, &p) in self.0.iter().enumerate() {
            inv[p] = i;
        }
        Self(inv)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_from_rows_rejects_non_square() {
        let rows: Vec<Vec<u8>> = vec![vec![0, 1, 0], vec![1, 0]];
        let err = AdjMatrix::from_rows(&rows).unwrap_err();
        assert!(matches!(err, Error::InvalidGraph(_)));
    }

    #[test]
    fn test_from_rows_rejects_non_binary() {
        let rows: Vec<Vec<u8>> = vec![vec![0, 2], vec![1, 0]];
        let err = AdjMatrix::from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("not binary"));
    }

    #[test]
    fn test_from_rows_rejects_empty() {
        let rows: Vec<Vec<u8>> = vec![];
        assert!(AdjMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_from_edges_symmetric() {
        let m = AdjMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        assert!(m.has_edge(0, 1) && m.has_edge(1, 0));
        assert!(m.has_edge(2, 1));
        assert!(!m.has_edge(0, 2));
        assert_eq!(m.set_cell_count(), 4);
        assert_eq!(m.degree_sequence(), vec![1, 1, 2]);
        assert_eq!(m.neighbors(1).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_from_edges_out_of_range() {
        assert!(AdjMatrix::from_edges(2, &[(0, 2)]).is_err());
    }

    #[test]
    fn test_permuted_moves_edges() {
        // path 0-1-2, relabel 0->2, 1->0, 2->1
        let m = AdjMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let p = Permutation::new(vec![2, 0, 1]).unwrap();
        let q = m.permuted(&p).unwrap();
        assert!(q.has_edge(2, 0));
        assert!(q.has_edge(0, 1));
        assert!(!q.has_edge(2, 1));
        // inverse restores the original
        assert_eq!(q.permuted(&p.inverse()).unwrap(), m);
    }

    #[test]
    fn test_permutation_rejects_duplicates() {
        assert!(Permutation::new(vec![0, 0, 1]).is_err());
        assert!(Permutation::new(vec![0, 3, 1]).is_err());
        assert!(Permutation::from_order(&[1, 1]).is_err());
    }

    #[test]
    fn test_random_permutation_is_bijection() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let p = Permutation::random(20, &mut rng);
        assert!(Permutation::new(p.as_slice().to_vec()).is_ok());
    }

    #[test]
    fn test_petgraph_roundtrip() {
        let m = AdjMatrix::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        let g = m.to_petgraph();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(AdjMatrix::from_petgraph(&g).unwrap(), m);
    }
}
