//! Dataset construction and splitting.
//!
//! [`DatasetBuilder`] runs the whole preprocessing pipeline once:
//!
//! 1. validate every raw graph (malformed ones are skipped with a warning)
//! 2. augment each graph with random relabelings, canonicalizing the base copy
//! 3. encode every copy at the dataset capacity
//! 4. drop duplicate encodings
//! 5. split into train / validation / test
//!
//! Steps 2 and 3 are independent per graph and run on the rayon pool. Each
//! graph gets its own RNG stream seeded from `seed + graph_index`, and results
//! are concatenated in input order, so a build is reproducible regardless of
//! thread count.

use crate::algo::augment;
use crate::config::{validate_ratios, PipelineConfig};
use crate::dedup::dedupe;
use crate::encoding::{encode, EncodedMatrix};
use crate::error::{Error, Result};
use crate::loader::{GraphLoader, Label, RawGraphs};
use crate::matrix::AdjMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One encoded graph and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub matrix: EncodedMatrix,
    pub label: Option<Label>,
}

impl DatasetEntry {
    pub fn node_count(&self) -> usize {
        self.matrix.node_count()
    }
}

/// Train / validation / test partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Splits<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
    pub test: Vec<T>,
    /// All three partitions are the full dataset because one came out empty.
    pub fallback: bool,
}

/// Split `items` into contiguous partitions by `ratios`.
///
/// Partition sizes are `floor(len * ratio)` for train and validation; test
/// takes the remainder. If any partition is empty, all three become the full
/// sequence. Tiny smoke-test datasets rely on this.
pub fn split_train_val_test<T: Clone>(items: &[T], ratios: [f64; 3]) -> Result<Splits<T>> {
    validate_ratios(&ratios)?;

    let len = items.len();
    let n_train = ((len as f64 * ratios[0]).floor() as usize).min(len);
    let n_val = ((len as f64 * ratios[1]).floor() as usize).min(len - n_train);

    let train = items[..n_train].to_vec();
    let val = items[n_train..n_train + n_val].to_vec();
    let test = items[n_train + n_val..].to_vec();

    if train.is_empty() || val.is_empty() || test.is_empty() {
        info!(
            len,
            train = train.len(),
            val = val.len(),
            test = test.len(),
            "empty split, using the full dataset for every partition"
        );
        return Ok(Splits {
            train: items.to_vec(),
            val: items.to_vec(),
            test: items.to_vec(),
            fallback: true,
        });
    }

    Ok(Splits {
        train,
        val,
        test,
        fallback: false,
    })
}

/// Counters from one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Graphs supplied by the loader.
    pub source_graphs: usize,
    /// Graphs rejected as malformed or too large.
    pub skipped_graphs: usize,
    /// Encoded matrices before deduplication.
    pub augmented: usize,
    /// Encoded matrices removed as duplicates.
    pub duplicates_removed: usize,
}

/// A finished dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All entries in build order.
    pub entries: Vec<DatasetEntry>,
    /// Side length of every encoded matrix.
    pub capacity: usize,
    pub splits: Splits<DatasetEntry>,
    pub stats: BuildStats,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs the preprocessing pipeline.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    config: PipelineConfig,
}

impl DatasetBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load graphs from `loader` and build.
    pub fn build_from<L: GraphLoader + ?Sized>(&self, loader: &L) -> Result<Dataset> {
        self.build(loader.load_graphs()?)
    }

    /// Build a dataset from raw loader output.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] for out-of-range settings
    /// - [`Error::EmptyDataset`] if there are no graphs, or none survive validation
    /// - [`Error::LabelMismatch`] if labels are requested but missing, or their
    ///   count differs from the graph count
    pub fn build(&self, raw: RawGraphs) -> Result<Dataset> {
        let cfg = &self.config;
        cfg.validate()?;

        if raw.is_empty() {
            return Err(Error::EmptyDataset("loader returned no graphs".into()));
        }
        let labels = match (cfg.use_labels, raw.labels) {
            (false, _) => None,
            (true, None) => {
                return Err(Error::LabelMismatch(
                    "labels requested but the loader provided none".into(),
                ))
            }
            (true, Some(labels)) if labels.len() != raw.adjacency.len() => {
                return Err(Error::LabelMismatch(format!(
                    "{} labels for {} graphs",
                    labels.len(),
                    raw.adjacency.len()
                )))
            }
            (true, Some(labels)) => Some(labels),
        };

        let source_graphs = raw.adjacency.len();
        let mut skipped_graphs = 0;
        let mut graphs: Vec<(usize, AdjMatrix)> = Vec::with_capacity(source_graphs);
        for (idx, rows) in raw.adjacency.iter().enumerate() {
            match AdjMatrix::from_rows(rows) {
                Ok(m) => graphs.push((idx, m)),
                Err(e) => {
                    warn!(graph = idx, error = %e, "skipping graph");
                    skipped_graphs += 1;
                }
            }
        }
        if graphs.is_empty() {
            return Err(Error::EmptyDataset(format!(
                "all {} graphs were rejected",
                source_graphs
            )));
        }

        let capacity = match cfg.max_nodes_capacity {
            Some(c) => c,
            None => graphs
                .iter()
                .map(|(_, m)| m.node_count())
                .max()
                .unwrap_or_default(),
        };
        debug!(capacity, graphs = graphs.len(), "encoding graphs");

        let per_graph: Vec<(usize, Result<Vec<EncodedMatrix>>)> = graphs
            .par_iter()
            .map(|(idx, m)| (*idx, self.process_graph(*idx, m, capacity)))
            .collect();

        let mut entries = Vec::new();
        let mut entry_labels = labels.as_ref().map(|_| Vec::new());
        for (idx, result) in per_graph {
            match result {
                Ok(encoded) => {
                    if let (Some(out), Some(labels)) = (entry_labels.as_mut(), labels.as_ref()) {
                        out.extend(std::iter::repeat(labels[idx]).take(encoded.len()));
                    }
                    entries.extend(encoded);
                }
                Err(e) => {
                    warn!(graph = idx, error = %e, "skipping graph");
                    skipped_graphs += 1;
                }
            }
        }
        if entries.is_empty() {
            return Err(Error::EmptyDataset(format!(
                "no graph of {} could be encoded at capacity {}",
                source_graphs, capacity
            )));
        }

        let augmented = entries.len();
        let (entries, entry_labels) = if cfg.remove_duplicates {
            dedupe(entries, entry_labels)?
        } else {
            (entries, entry_labels)
        };
        let duplicates_removed = augmented - entries.len();

        let entries: Vec<DatasetEntry> = match entry_labels {
            Some(labels) => entries
                .into_iter()
                .zip(labels)
                .map(|(matrix, label)| DatasetEntry {
                    matrix,
                    label: Some(label),
                })
                .collect(),
            None => entries
                .into_iter()
                .map(|matrix| DatasetEntry {
                    matrix,
                    label: None,
                })
                .collect(),
        };

        let stats = BuildStats {
            source_graphs,
            skipped_graphs,
            augmented,
            duplicates_removed,
        };
        info!(
            entries = entries.len(),
            capacity,
            source_graphs,
            skipped_graphs,
            duplicates_removed,
            "dataset built"
        );

        let splits = split_train_val_test(&entries, cfg.split_ratios)?;
        Ok(Dataset {
            entries,
            capacity,
            splits,
            stats,
        })
    }

    fn process_graph(&self, idx: usize, graph: &AdjMatrix, capacity: usize) -> Result<Vec<EncodedMatrix>> {
        // fail before spending time on permutations
        if graph.node_count() > capacity {
            return Err(Error::CapacityExceeded {
                nodes: graph.node_count(),
                capacity,
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(idx as u64));
        augment(
            graph,
            self.config.num_permutations,
            self.config.use_bfs_canonicalization,
            &mut rng,
        )?
        .iter()
        .map(|m| encode(m, capacity))
        .collect()
    }
}
