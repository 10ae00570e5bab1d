//! Permutation augmentation.
//!
//! Multiplies the training set with random relabelings of each graph. Every
//! copy is the same graph, only the node order changes.

use crate::algo::canonical::canonicalize;
use crate::error::{Error, Result};
use crate::matrix::{AdjMatrix, Permutation};
use rand::Rng;

/// Produce `copies` adjacency matrices for one graph.
///
/// # Arguments
/// * `graph` - Source graph
/// * `copies` - Total number of matrices to return (at least 1)
/// * `canonical_base` - Canonicalize the first copy
/// * `rng` - Source of the relabelings
///
/// # Returns
/// Index 0 is `graph` itself, canonicalized when `canonical_base` is set.
/// Indices `1..copies` are independent uniform relabelings of the original
/// `graph`; they are never canonicalized, so they keep a random node order.
pub fn augment<R: Rng + ?Sized>(
    graph: &AdjMatrix,
    copies: usize,
    canonical_base: bool,
    rng: &mut R,
) -> Result<Vec<AdjMatrix>> {
    if copies == 0 {
        return Err(Error::InvalidConfig(
            "number of permutations must be at least 1".into(),
        ));
    }

    let mut out = Vec::with_capacity(copies);
    out.push(if canonical_base {
        canonicalize(graph)?
    } else {
        graph.clone()
    });

    let n = graph.node_count();
    for _ in 1..copies {
        let perm = Permutation::random(n, rng);
        out.push(graph.permuted(&perm)?);
    }

    Ok(out)
}
