//! Property tests for search ordering guarantees

use firecode_core::{ChunkRecord, IndexBuilder, SourceRef};
use proptest::prelude::*;

fn record(id: usize, embedding: Vec<f32>) -> ChunkRecord {
    ChunkRecord {
        id: format!("chunk-{id:04}"),
        text: format!("body {id}"),
        section_path: vec!["9".to_string()],
        source_ref: SourceRef {
            document_id: "prop-doc".to_string(),
            char_start: (id * 100) as u64,
            char_end: (id * 100 + 80) as u64,
            page: None,
        },
        embedding,
    }
}

fn component() -> impl Strategy<Value = f32> {
    // Bounded away from the all-zero vector often enough to be useful.
    (-100i32..=100).prop_map(|n| n as f32 / 10.0)
}

proptest! {
    #[test]
    fn scores_are_non_increasing_and_ties_break_by_id(
        vectors in proptest::collection::vec(
            proptest::collection::vec(component(), 4),
            1..40,
        ),
        query in proptest::collection::vec(component(), 4),
        k in 1usize..50,
    ) {
        prop_assume!(query.iter().any(|x| *x != 0.0));

        let mut builder = IndexBuilder::new(4);
        let mut admitted = 0usize;
        for (i, v) in vectors.into_iter().enumerate() {
            if v.iter().any(|x| *x != 0.0) {
                builder.push(record(i, v)).unwrap();
                admitted += 1;
            }
        }
        let index = builder.finish();

        let hits = index.search(&query, k).unwrap();
        prop_assert_eq!(hits.len(), k.min(admitted));

        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].record.id < pair[1].record.id);
            }
        }

        for hit in &hits {
            prop_assert!(hit.score >= -1.0 - 1e-5 && hit.score <= 1.0 + 1e-5);
        }
    }
}
