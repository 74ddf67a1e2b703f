use std::sync::Arc;

use docqa_core::traits::VectorIndexer;
use docqa_core::types::{IndexEntry, IndexSpec, Metric, Passage};
use docqa_core::Error;
use docqa_vector::FlatIndex;

fn spec(dimension: usize) -> IndexSpec {
    IndexSpec { metric: Metric::Cosine, dimension, embedder_id: format!("test:d{dimension}") }
}

fn entry(id: &str, text: &str, embedding: Vec<f32>) -> IndexEntry {
    IndexEntry {
        passage: Passage {
            id: id.to_string(),
            doc_id: "doc".to_string(),
            doc_path: "/tmp/doc.txt".to_string(),
            text: text.to_string(),
            chunk_index: 0,
            total_chunks: 1,
        },
        embedding,
    }
}

#[test]
fn search_returns_sorted_by_descending_score() {
    let index = FlatIndex::new(spec(3));
    index
        .add(vec![
            entry("1", "far away", vec![0.0, 1.0, 0.0]),
            entry("2", "very close", vec![1.0, 0.0, 0.0]),
            entry("3", "medium", vec![0.5, 0.5, 0.0]),
        ])
        .unwrap();

    let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.passage.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "1"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn equal_scores_keep_insertion_order_across_calls() {
    let index = FlatIndex::new(spec(2));
    // all four are the same direction as the query
    index
        .add(vec![
            entry("c", "c", vec![1.0, 0.0]),
            entry("a", "a", vec![2.0, 0.0]),
            entry("d", "d", vec![0.0, 1.0]),
            entry("b", "b", vec![3.0, 0.0]),
        ])
        .unwrap();

    for _ in 0..5 {
        let ids: Vec<String> = index
            .search(&[1.0, 0.0], 10)
            .unwrap()
            .into_iter()
            .map(|m| m.passage.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }
}

#[test]
fn search_respects_k() {
    let index = FlatIndex::new(spec(2));
    index
        .add(vec![
            entry("1", "a", vec![1.0, 0.0]),
            entry("2", "b", vec![0.9, 0.1]),
            entry("3", "c", vec![0.8, 0.2]),
        ])
        .unwrap();

    assert_eq!(index.search(&[1.0, 0.0], 2).unwrap().len(), 2);
    assert_eq!(index.search(&[1.0, 0.0], 100).unwrap().len(), 3);
    assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn empty_index_search_is_empty() {
    let index = FlatIndex::new(spec(2));
    assert!(index.is_empty());
    assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
}

#[test]
fn re_adding_same_id_upserts_in_place() {
    let index = FlatIndex::new(spec(2));
    index.add(vec![entry("same-id", "first content", vec![1.0, 0.0])]).unwrap();
    index.add(vec![entry("other", "other", vec![1.0, 0.0])]).unwrap();
    index.add(vec![entry("same-id", "second content", vec![1.0, 0.0])]).unwrap();

    assert_eq!(index.len(), 2);
    let results = index.search(&[1.0, 0.0], 10).unwrap();
    let same: Vec<_> = results.iter().filter(|m| m.passage.id == "same-id").collect();
    assert_eq!(same.len(), 1, "no duplicates after upsert");
    assert_eq!(same[0].passage.text, "second content", "last write wins");
    // the replaced entry keeps its original slot for tie-breaking
    assert_eq!(results[0].passage.id, "same-id");
}

#[test]
fn dimension_mismatch_is_rejected_without_partial_insert() {
    let index = FlatIndex::new(spec(2));
    let err = index
        .add(vec![entry("ok", "ok", vec![1.0, 0.0]), entry("bad", "bad", vec![1.0, 0.0, 0.0])])
        .unwrap_err();
    assert!(matches!(err, Error::IndexCompatibility(_)), "{err:?}");
    assert!(index.is_empty(), "batch is all-or-nothing");

    let err = index.search(&[1.0], 1).unwrap_err();
    assert!(matches!(err, Error::IndexCompatibility(_)), "{err:?}");
}

#[test]
fn inner_product_metric_ranks_by_magnitude() {
    let index = FlatIndex::new(IndexSpec { metric: Metric::InnerProduct, dimension: 2, embedder_id: "ip".into() });
    index
        .add(vec![entry("small", "s", vec![1.0, 0.0]), entry("big", "b", vec![5.0, 0.0])])
        .unwrap();
    let results = index.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!(results[0].passage.id, "big");
    assert!((results[0].score - 5.0).abs() < 1e-6);
}

#[test]
fn concurrent_readers_see_consistent_results() {
    let index = Arc::new(FlatIndex::new(spec(2)));
    index
        .add((0..100).map(|i| entry(&i.to_string(), "t", vec![1.0, i as f32 / 100.0])).collect())
        .unwrap();
    let expected = index.search(&[1.0, 0.0], 10).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || index.search(&[1.0, 0.0], 10).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn index_reports_its_vector_space() {
    let index = FlatIndex::new(spec(4));
    assert_eq!(index.dimension(), 4);
    assert_eq!(index.metric(), Metric::Cosine);
    assert_eq!(index.embedder_id(), "test:d4");
}
