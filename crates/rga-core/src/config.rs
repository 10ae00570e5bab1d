//! Dataset construction settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for [`DatasetBuilder`](crate::DatasetBuilder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Copies of each graph, the original included (default: 10).
    pub num_permutations: usize,
    /// Reorder the base copy of each graph by BFS (default: false).
    pub use_bfs_canonicalization: bool,
    /// Carry graph labels into the dataset (default: false).
    pub use_labels: bool,
    /// Remove duplicate encodings after augmentation (default: true).
    pub remove_duplicates: bool,
    /// Encoding capacity; `None` derives it from the largest graph.
    pub max_nodes_capacity: Option<usize>,
    /// Train / validation / test fractions (default: 0.7 / 0.2 / 0.1).
    pub split_ratios: [f64; 3],
    /// Random seed (default: 42).
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_permutations: 10,
            use_bfs_canonicalization: false,
            use_labels: false,
            remove_duplicates: true,
            max_nodes_capacity: None,
            split_ratios: [0.7, 0.2, 0.1],
            seed: 42,
        }
    }
}

impl PipelineConfig {
    pub fn with_num_permutations(mut self, n: usize) -> Self {
        self.num_permutations = n;
        self
    }

    pub fn with_bfs(mut self, enabled: bool) -> Self {
        self.use_bfs_canonicalization = enabled;
        self
    }

    pub fn with_labels(mut self, enabled: bool) -> Self {
        self.use_labels = enabled;
        self
    }

    pub fn with_remove_duplicates(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.max_nodes_capacity = Some(capacity);
        self
    }

    pub fn with_split_ratios(mut self, ratios: [f64; 3]) -> Self {
        self.split_ratios = ratios;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Read a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.num_permutations == 0 {
            return Err(Error::InvalidConfig(
                "num_permutations must be at least 1".into(),
            ));
        }
        if self.max_nodes_capacity == Some(0) {
            return Err(Error::InvalidConfig(
                "max_nodes_capacity must be at least 1".into(),
            ));
        }
        validate_ratios(&self.split_ratios)
    }
}

pub(crate) fn validate_ratios(ratios: &[f64; 3]) -> Result<()> {
    if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return Err(Error::InvalidConfig(format!(
            "split ratios must be non-negative, got {:?}",
            ratios
        )));
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(Error::InvalidConfig(format!(
            "split ratios must sum to 1, got {:?} (sum {})",
            ratios, sum
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_permutations_invalid() {
        let c = PipelineConfig::default().with_num_permutations(0);
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_ratios_must_sum_to_one() {
        let c = PipelineConfig::default().with_split_ratios([0.5, 0.2, 0.1]);
        assert!(c.validate().is_err());
        let c = PipelineConfig::default().with_split_ratios([1.2, -0.1, -0.1]);
        assert!(c.validate().is_err());
        let c = PipelineConfig::default().with_split_ratios([1.0, 0.0, 0.0]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"num_permutations": 3, "use_bfs_canonicalization": true}}"#).unwrap();

        let c = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(c.num_permutations, 3);
        assert!(c.use_bfs_canonicalization);
        assert_eq!(c.seed, 42);
        assert!(c.remove_duplicates);
    }
}
