//! Build a dataset from a TU benchmark directory and print its statistics.
//!
//! ```text
//! cargo run -p rga-core --example build_dataset -- <datasets_dir> MUTAG [config.json]
//! ```
//!
//! Without arguments a handful of small synthetic graphs is used instead.

use rga_core::loader::{InMemoryLoader, TuDatasetLoader};
use rga_core::{AdjMatrix, DatasetBuilder, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn synthetic() -> anyhow::Result<Vec<AdjMatrix>> {
    let mut graphs = Vec::new();
    for n in 3..9 {
        let cycle: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        graphs.push(AdjMatrix::from_edges(n, &cycle)?);
        let star: Vec<(usize, usize)> = (1..n).map(|i| (0, i)).collect();
        graphs.push(AdjMatrix::from_edges(n, &star)?);
    }
    Ok(graphs)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.get(2) {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default().with_bfs(true),
    };
    let builder = DatasetBuilder::new(config);

    let dataset = match (args.first(), args.get(1)) {
        (Some(root), Some(name)) => builder.build_from(&TuDatasetLoader::new(root, name.as_str()))?,
        _ => builder.build_from(&InMemoryLoader::from_matrices(&synthetic()?, None))?,
    };

    println!("capacity:           {}", dataset.capacity);
    println!("entries:            {}", dataset.len());
    println!("source graphs:      {}", dataset.stats.source_graphs);
    println!("skipped graphs:     {}", dataset.stats.skipped_graphs);
    println!("duplicates removed: {}", dataset.stats.duplicates_removed);
    println!(
        "train/val/test:     {}/{}/{}{}",
        dataset.splits.train.len(),
        dataset.splits.val.len(),
        dataset.splits.test.len(),
        if dataset.splits.fallback { " (fallback)" } else { "" }
    );
    Ok(())
}
