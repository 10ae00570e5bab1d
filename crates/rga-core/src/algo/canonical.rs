//! Breadth-first canonical node ordering.
//!
//! The traversal starts at node 0 and proceeds one distance level at a time.
//! Nodes at the same distance from the root are ordered by original index,
//! not by the order their parents were visited. When a component is exhausted
//! the traversal restarts from the lowest-index unvisited node, so
//! disconnected graphs get their components laid out one after another.
//!
//! Relabelling a graph by its own BFS order is a fixed point: every distance
//! level becomes a contiguous, already sorted index range. That makes
//! [`canonicalize`] idempotent.

use crate::error::Result;
use crate::matrix::{AdjMatrix, Permutation};

/// Original node indices in BFS visitation order.
///
/// # Complexity
/// O(n^2) on the dense matrix.
#[must_use]
pub fn bfs_order(adj: &AdjMatrix) -> Vec<usize> {
    let n = adj.node_count();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut frontier = vec![root];

        while !frontier.is_empty() {
            order.extend_from_slice(&frontier);
            let mut next = Vec::new();
            for &node in &frontier {
                for nb in adj.neighbors(node) {
                    if !visited[nb] {
                        visited[nb] = true;
                        next.push(nb);
                    }
                }
            }
            next.sort_unstable();
            frontier = next;
        }
    }

    order
}

/// Relabel `adj` so node `k` is the `k`-th node visited by [`bfs_order`].
pub fn canonicalize(adj: &AdjMatrix) -> Result<AdjMatrix> {
    let perm = Permutation::from_order(&bfs_order(adj))?;
    adj.permuted(&perm)
}
