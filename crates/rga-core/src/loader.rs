//! Graph sources.
//!
//! A loader hands the pipeline raw adjacency rows plus optional labels.
//! Rows are not validated here; [`DatasetBuilder`](crate::DatasetBuilder)
//! does that per graph so one malformed graph does not sink the batch.
//!
//! # TU benchmark format
//!
//! [`TuDatasetLoader`] reads the text layout used by the TU graph
//! classification collection (MUTAG, IMDB-MULTI, REDDIT-BINARY, ...):
//!
//! ```text
//! <root>/<NAME>/<NAME>_A.txt                one edge per line: "u, v" (1-based global node ids)
//! <root>/<NAME>/<NAME>_graph_indicator.txt  line i: graph id (1-based) of node i
//! <root>/<NAME>/<NAME>_graph_labels.txt     line g: label of graph g (optional)
//! ```

use crate::error::{Error, Result};
use crate::matrix::AdjMatrix;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Graph class label.
pub type Label = i64;

/// Unvalidated loader output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGraphs {
    /// One row-major adjacency per graph.
    pub adjacency: Vec<Vec<Vec<u8>>>,
    /// One label per graph, when the source has them.
    pub labels: Option<Vec<Label>>,
}

impl RawGraphs {
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Anything that can supply graphs to the pipeline.
pub trait GraphLoader {
    fn load_graphs(&self) -> Result<RawGraphs>;
}

/// Loader over graphs already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    graphs: RawGraphs,
}

impl InMemoryLoader {
    pub fn new(graphs: RawGraphs) -> Self {
        Self { graphs }
    }

    /// Wrap validated matrices.
    pub fn from_matrices(matrices: &[AdjMatrix], labels: Option<Vec<Label>>) -> Self {
        let adjacency = matrices
            .iter()
            .map(|m| (0..m.node_count()).map(|i| m.row(i).to_vec()).collect())
            .collect();
        Self {
            graphs: RawGraphs { adjacency, labels },
        }
    }
}

impl GraphLoader for InMemoryLoader {
    fn load_graphs(&self) -> Result<RawGraphs> {
        Ok(self.graphs.clone())
    }
}

/// Loader for a TU benchmark dataset directory.
#[derive(Debug, Clone)]
pub struct TuDatasetLoader {
    root: PathBuf,
    name: String,
    max_nodes: Option<usize>,
}

impl TuDatasetLoader {
    /// # Arguments
    /// * `root` - Directory holding one sub-directory per dataset
    /// * `name` - Dataset name, e.g. `"MUTAG"`
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            max_nodes: None,
        }
    }

    /// Drop graphs with more than `max_nodes` nodes (and their labels).
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.root
            .join(&self.name)
            .join(format!("{}_{}.txt", self.name, suffix))
    }
}

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim().to_string()))
        .filter(|(_, l)| !l.is_empty())
        .collect())
}

fn parse_field<T: std::str::FromStr>(path: &Path, line: usize, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| Error::Parse {
        file: path.display().to_string(),
        line,
        message: format!("cannot parse {:?}", raw.trim()),
    })
}

impl GraphLoader for TuDatasetLoader {
    fn load_graphs(&self) -> Result<RawGraphs> {
        let indicator_path = self.file("graph_indicator");
        let edges_path = self.file("A");
        let labels_path = self.file("graph_labels");

        // graph id (0-based) of every node, in global node order
        let mut node_graph = Vec::new();
        for (line, raw) in read_lines(&indicator_path)? {
            let gid: usize = parse_field(&indicator_path, line, &raw)?;
            if gid == 0 {
                return Err(Error::Parse {
                    file: indicator_path.display().to_string(),
                    line,
                    message: "graph ids are 1-based".into(),
                });
            }
            node_graph.push(gid - 1);
        }

        let num_graphs = node_graph.iter().copied().max().map_or(0, |g| g + 1);
        let mut sizes = vec![0usize; num_graphs];
        let mut local = Vec::with_capacity(node_graph.len());
        for &g in &node_graph {
            local.push(sizes[g]);
            sizes[g] += 1;
        }

        let mut adjacency: Vec<Vec<Vec<u8>>> =
            sizes.iter().map(|&n| vec![vec![0u8; n]; n]).collect();

        for (line, raw) in read_lines(&edges_path)? {
            let mut parts = raw.split(',');
            let (Some(u), Some(v), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(Error::Parse {
                    file: edges_path.display().to_string(),
                    line,
                    message: format!("expected \"u, v\", got {:?}", raw),
                });
            };
            let u: usize = parse_field(&edges_path, line, u)?;
            let v: usize = parse_field(&edges_path, line, v)?;
            if u == 0 || v == 0 || u > node_graph.len() || v > node_graph.len() {
                return Err(Error::Parse {
                    file: edges_path.display().to_string(),
                    line,
                    message: format!("node id out of range: ({}, {})", u, v),
                });
            }
            let (u, v) = (u - 1, v - 1);
            let g = node_graph[u];
            if node_graph[v] != g {
                return Err(Error::Parse {
                    file: edges_path.display().to_string(),
                    line,
                    message: format!("edge ({}, {}) crosses graphs", u + 1, v + 1),
                });
            }
            adjacency[g][local[u]][local[v]] = 1;
            adjacency[g][local[v]][local[u]] = 1;
        }

        let mut labels = if labels_path.exists() {
            let mut labels = Vec::with_capacity(num_graphs);
            for (line, raw) in read_lines(&labels_path)? {
                labels.push(parse_field::<Label>(&labels_path, line, &raw)?);
            }
            if labels.len() != num_graphs {
                return Err(Error::LabelMismatch(format!(
                    "{} has {} labels for {} graphs",
                    labels_path.display(),
                    labels.len(),
                    num_graphs
                )));
            }
            Some(labels)
        } else {
            None
        };

        if let Some(max_nodes) = self.max_nodes {
            let keep: Vec<bool> = sizes.iter().map(|&n| n <= max_nodes).collect();
            let dropped = keep.iter().filter(|&&k| !k).count();
            if dropped > 0 {
                debug!(dropped, max_nodes, "dropping oversized graphs");
            }
            adjacency = adjacency
                .into_iter()
                .zip(&keep)
                .filter_map(|(a, &k)| k.then_some(a))
                .collect();
            labels = labels.map(|l| {
                l.into_iter()
                    .zip(&keep)
                    .filter_map(|(l, &k)| k.then_some(l))
                    .collect()
            });
        }

        info!(
            dataset = %self.name,
            graphs = adjacency.len(),
            labelled = labels.is_some(),
            "loaded TU dataset"
        );

        Ok(RawGraphs { adjacency, labels })
    }
}
