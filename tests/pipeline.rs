//! End-to-end: loader -> dataset -> tree encode/decode.

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use rga::pipeline::loader::InMemoryLoader;
use rga::nn::nets::{MemoryEdgeDecoder, MlpMergeEncoder};
use rga::{
    decode_graph, encode_graph, AdjMatrix, DatasetBuilder, MlpConfig, PipelineConfig,
    ProtocolConfig, TreeShape,
};

fn cycle(n: usize) -> AdjMatrix {
    let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    AdjMatrix::from_edges(n, &edges).unwrap()
}

fn star(n: usize) -> AdjMatrix {
    let edges: Vec<(usize, usize)> = (1..n).map(|i| (0, i)).collect();
    AdjMatrix::from_edges(n, &edges).unwrap()
}

fn graphs() -> Vec<AdjMatrix> {
    (3..8).flat_map(|n| [cycle(n), star(n)]).collect()
}

#[test]
fn test_dataset_feeds_protocol() {
    let config = PipelineConfig::default()
        .with_num_permutations(4)
        .with_bfs(true)
        .with_seed(7);
    let dataset = DatasetBuilder::new(config)
        .build_from(&InMemoryLoader::from_matrices(&graphs(), None))
        .unwrap();
    assert_eq!(dataset.capacity, 7);
    assert!(!dataset.splits.train.is_empty());

    let device = Device::Cpu;
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let protocol = ProtocolConfig::default()
        .with_embedding_size(12)
        .with_block_size(2);
    let mlp = MlpConfig::default()
        .with_encoder_hidden(vec![24])
        .with_decoder_hidden(vec![24]);
    let encoder = MlpMergeEncoder::new(&protocol, &mlp, dataset.capacity, vb.pp("enc")).unwrap();
    let decoder = MemoryEdgeDecoder::new(&protocol, &mlp, dataset.capacity, vb.pp("dec")).unwrap();
    let shape = TreeShape::new(dataset.capacity, protocol.block_size).unwrap();

    for entry in dataset.splits.train.iter().take(5) {
        let n = entry.node_count();
        let encoded = encode_graph(&encoder, &entry.matrix, protocol.block_size).unwrap();
        assert_eq!(encoded.shape.leaf_count(), n.div_ceil(protocol.block_size));

        let decoded =
            decode_graph(&decoder, encoded.root, &shape, dataset.capacity, Some(n)).unwrap();
        assert_eq!(decoded.leaves.len(), 4);
        assert!(decoded.edge_logits().iter().all(|l| l.is_finite()));
        for record in &decoded.leaves {
            assert_eq!(record.beyond_end, Some(record.span_start >= n));
        }
    }
}

#[test]
fn test_labels_survive_dedup_into_splits() {
    let matrices = vec![cycle(4), cycle(4), star(4)];
    let config = PipelineConfig::default()
        .with_num_permutations(1)
        .with_labels(true)
        .with_split_ratios([1.0, 0.0, 0.0]);
    let dataset = DatasetBuilder::new(config)
        .build_from(&InMemoryLoader::from_matrices(&matrices, Some(vec![1, 2, 3])))
        .unwrap();

    let labels: Vec<Option<i64>> = dataset.entries.iter().map(|e| e.label).collect();
    assert_eq!(labels, vec![Some(1), Some(3)]);
    assert_eq!(dataset.stats.duplicates_removed, 1);
    // val and test are empty, so every partition falls back to the full set
    assert!(dataset.splits.fallback);
    assert_eq!(dataset.splits.val.len(), 2);
}
