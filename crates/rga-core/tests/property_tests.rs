//! Property-based tests for the preprocessing pipeline.
//!
//! These tests verify invariants that should hold for any graph:
//! - Canonical ordering is a fixed point
//! - Relabelings preserve structure
//! - Encoding keeps the real region intact and pads with the sentinel
//! - Deduplication is stable

use proptest::prelude::*;
use rga_core::{AdjMatrix, Permutation};

prop_compose! {
    fn arb_graph()(n in 1usize..12)(
        edges in prop::collection::vec((0..n, 0..n), 0..30),
        n in Just(n),
    ) -> AdjMatrix {
        AdjMatrix::from_edges(n, &edges).expect("edges are in range")
    }
}

mod canonical_props {
    use super::*;
    use rga_core::algo::{bfs_order, canonicalize};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn canonicalize_idempotent(g in arb_graph()) {
            let once = canonicalize(&g).unwrap();
            let twice = canonicalize(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn bfs_order_is_bijection(g in arb_graph()) {
            let order = bfs_order(&g);
            prop_assert_eq!(order.len(), g.node_count());
            prop_assert!(Permutation::from_order(&order).is_ok());
        }

        #[test]
        fn canonicalize_preserves_structure(g in arb_graph()) {
            let c = canonicalize(&g).unwrap();
            prop_assert_eq!(c.set_cell_count(), g.set_cell_count());
            prop_assert_eq!(c.degree_sequence(), g.degree_sequence());
        }

        #[test]
        fn canonical_form_traverses_in_index_order(g in arb_graph()) {
            let c = canonicalize(&g).unwrap();
            prop_assert_eq!(bfs_order(&c), (0..g.node_count()).collect::<Vec<_>>());
        }
    }
}

mod permutation_props {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rga_core::algo::augment;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn permuted_preserves_structure(g in arb_graph(), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = Permutation::random(g.node_count(), &mut rng);
            let q = g.permuted(&p).unwrap();

            prop_assert_eq!(q.set_cell_count(), g.set_cell_count());
            prop_assert_eq!(q.degree_sequence(), g.degree_sequence());
            prop_assert_eq!(q.permuted(&p.inverse()).unwrap(), g);
        }

        #[test]
        fn augment_copy_count(g in arb_graph(), copies in 1usize..8, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = augment(&g, copies, false, &mut rng).unwrap();
            prop_assert_eq!(out.len(), copies);
            prop_assert_eq!(&out[0], &g);
            for m in &out {
                prop_assert_eq!(m.degree_sequence(), g.degree_sequence());
            }
        }
    }
}

mod encoding_props {
    use super::*;
    use rga_core::{encode, Cell, SENTINEL};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn encode_roundtrip_and_padding(g in arb_graph(), extra in 0usize..5) {
            let n = g.node_count();
            let cap = n + extra;
            let e = encode(&g, cap).unwrap();

            prop_assert_eq!(e.node_count(), n);
            prop_assert_eq!(e.real_region().unwrap(), g);
            for i in 0..cap {
                for j in 0..cap {
                    if i >= n || j >= n {
                        prop_assert_eq!(e.raw(i, j), SENTINEL);
                        prop_assert_eq!(e.cell(i, j), Cell::Absent);
                    } else {
                        prop_assert_ne!(e.cell(i, j), Cell::Absent);
                    }
                }
            }
        }

        #[test]
        fn encode_never_truncates(g in arb_graph()) {
            let n = g.node_count();
            prop_assert!(encode(&g, n - 1).is_err());
        }
    }
}

mod dedup_props {
    use super::*;
    use rga_core::{dedupe, encode, EncodedMatrix};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn dedupe_stable_and_idempotent(
            graphs in prop::collection::vec(arb_graph(), 1..10),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..30),
        ) {
            let encoded: Vec<EncodedMatrix> = graphs
                .iter()
                .map(|g| encode(g, 12).unwrap())
                .collect();
            let entries: Vec<EncodedMatrix> = picks
                .iter()
                .map(|i| encoded[i.index(encoded.len())].clone())
                .collect();
            let labels: Vec<usize> = (0..entries.len()).collect();

            let (once, once_labels) = dedupe(entries.clone(), Some(labels)).unwrap();
            let once_labels = once_labels.unwrap();

            // no duplicates left
            for i in 0..once.len() {
                for j in (i + 1)..once.len() {
                    prop_assert_ne!(&once[i], &once[j]);
                }
            }
            // kept labels are the first index of each entry, increasing
            for (entry, &label) in once.iter().zip(&once_labels) {
                let first = entries.iter().position(|e| e == entry).unwrap();
                prop_assert_eq!(first, label);
            }
            prop_assert!(once_labels.windows(2).all(|w| w[0] < w[1]));

            let (twice, _) = dedupe::<()>(once.clone(), None).unwrap();
            prop_assert_eq!(twice, once);
        }
    }
}
