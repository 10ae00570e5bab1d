//! Embedding values carried through the merge tree.
//!
//! The protocol only needs two things from an embedding: its width, and the
//! memory-overwrite blend applied when a parent is split:
//!
//! ```text
//! child = ratio * fresh + (1 - ratio) * parent      (elementwise)
//! ```
//!
//! Implemented for plain `Vec<f32>` and for candle tensors of any shape whose
//! last dimension is the embedding width.

use crate::error::{Error, Result};
use candle_core::Tensor;

/// A fixed-width embedding.
pub trait Embedding: Sized {
    /// Number of features.
    fn width(&self) -> usize;

    /// `ratio * fresh + (1 - ratio) * previous`, elementwise.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if the three operands differ in shape.
    fn blend(fresh: &Self, previous: &Self, ratio: &Self) -> Result<Self>;
}

impl Embedding for Vec<f32> {
    fn width(&self) -> usize {
        self.len()
    }

    fn blend(fresh: &Self, previous: &Self, ratio: &Self) -> Result<Self> {
        for other in [fresh, ratio] {
            if other.len() != previous.len() {
                return Err(Error::DimensionMismatch {
                    expected: previous.len(),
                    got: other.len(),
                });
            }
        }
        Ok(fresh
            .iter()
            .zip(previous)
            .zip(ratio)
            .map(|((&f, &p), &r)| r * f + (1.0 - r) * p)
            .collect())
    }
}

impl Embedding for Tensor {
    fn width(&self) -> usize {
        self.dims().last().copied().unwrap_or(0)
    }

    fn blend(fresh: &Self, previous: &Self, ratio: &Self) -> Result<Self> {
        for other in [fresh, ratio] {
            if other.dims() != previous.dims() {
                return Err(Error::DimensionMismatch {
                    expected: previous.elem_count(),
                    got: other.elem_count(),
                });
            }
        }
        let keep = ratio.affine(-1.0, 1.0)?;
        Ok(ratio.mul(fresh)?.add(&keep.mul(previous)?)?)
    }
}
