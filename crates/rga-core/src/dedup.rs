//! Stable removal of duplicate encodings.
//!
//! Permutation augmentation regularly produces the same matrix twice (a
//! symmetric graph has many relabelings that coincide). Two entries are the
//! same iff their buffers are identical and their node counts match.
//!
//! Hashing runs in parallel; the keep/drop decision walks the entries in
//! order, so the first occurrence always wins.

use crate::encoding::EncodedMatrix;
use crate::error::{Error, Result};
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

fn content_hash(entry: &EncodedMatrix) -> u64 {
    let mut hasher = DefaultHasher::new();
    entry.node_count().hash(&mut hasher);
    entry.capacity().hash(&mut hasher);
    entry.as_slice().hash(&mut hasher);
    hasher.finish()
}

/// Indices of first occurrences, in input order.
#[must_use]
pub fn first_occurrences(entries: &[EncodedMatrix]) -> Vec<usize> {
    let hashes: Vec<u64> = entries.par_iter().map(content_hash).collect();

    // bucket -> indices already kept with that hash
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(entries.len());
    let mut keep = Vec::with_capacity(entries.len());

    for (idx, &h) in hashes.iter().enumerate() {
        let bucket = buckets.entry(h).or_default();
        if bucket.iter().any(|&kept| entries[kept] == entries[idx]) {
            continue;
        }
        bucket.push(idx);
        keep.push(idx);
    }

    keep
}

/// Drop later duplicates, and the labels at the same indices.
///
/// # Errors
/// [`Error::LabelMismatch`] if `labels` is present with a length different
/// from `entries`.
pub fn dedupe<L>(
    entries: Vec<EncodedMatrix>,
    labels: Option<Vec<L>>,
) -> Result<(Vec<EncodedMatrix>, Option<Vec<L>>)> {
    if let Some(labels) = &labels {
        if labels.len() != entries.len() {
            return Err(Error::LabelMismatch(format!(
                "{} labels for {} entries",
                labels.len(),
                entries.len()
            )));
        }
    }

    let keep = first_occurrences(&entries);
    let mut mask = vec![false; entries.len()];
    for &i in &keep {
        mask[i] = true;
    }

    let kept_entries: Vec<EncodedMatrix> = entries
        .into_iter()
        .zip(&mask)
        .filter_map(|(e, &k)| k.then_some(e))
        .collect();
    let kept_labels = labels.map(|labels| {
        labels
            .into_iter()
            .zip(&mask)
            .filter_map(|(l, &k)| k.then_some(l))
            .collect()
    });

    Ok((kept_entries, kept_labels))
}
