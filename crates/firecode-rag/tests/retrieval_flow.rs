//! End-to-end retrieval over a small building-code corpus

mod common;

use std::sync::Arc;

use common::HashEmbedder;
use firecode_rag::ingestion::{build_index, parse_document};
use firecode_rag::{QueryRequest, RagConfig, Retriever, SearchFilter};

const DIMS: usize = 256;

fn test_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.embedding.dimensions = DIMS;
    config.embedding.retry_base_delay_ms = 1;
    config
}

fn corpus() -> Vec<firecode_rag::Document> {
    let part3 = "\
3.1 Fire Protection

3.1.2 Fire Separations

[page 41]

Fire separations between dwelling units shall have a fire-resistance rating of not less than 45 minutes
";
    let egress = "\
9.9 Means of Egress

Every floor area shall be served by at least two exits located remotely from each other
";
    let sprinklers = "\
3.2 Building Fire Safety

3.2.5 Fire Suppression

Automatic sprinkler systems shall be installed throughout buildings classified as Group C occupancies
";

    vec![
        parse_document("NBC Part 3", "nbc_part3.txt", part3).unwrap(),
        parse_document("NBC Part 9", "nbc_part9.txt", egress).unwrap(),
        parse_document("NBC Sprinklers", "nbc_sprinklers.txt", sprinklers).unwrap(),
    ]
}

async fn built_retriever() -> Retriever {
    let config = test_config();
    let embedder = Arc::new(HashEmbedder::new(DIMS));
    let outcome = build_index(corpus(), &config, embedder.clone()).await.unwrap();
    assert!(outcome.is_complete());
    Retriever::new(Arc::new(outcome.index), embedder, &config).unwrap()
}

#[tokio::test]
async fn dwelling_unit_rating_query_finds_the_cited_provision() {
    let retriever = built_retriever().await;

    let request =
        QueryRequest::new("What fire-resistance rating is required between dwelling units?")
            .with_top_k(1);
    let result = retriever.retrieve(&request).await.unwrap();

    assert_eq!(result.len(), 1);
    let passage = &result.passages[0];
    assert!(passage.text.contains("fire-resistance rating of not less than 45 minutes"));
    assert_eq!(passage.citation.section_path, vec!["3.1", "3.1.2"]);
    assert_eq!(passage.citation.page, Some(41));
    assert_eq!(passage.citation.format_inline(), "[Source: 3.1 > 3.1.2, Page 41]");
}

#[tokio::test]
async fn unrelated_query_returns_empty_not_noise() {
    let retriever = built_retriever().await;

    let result = retriever
        .retrieve(&QueryRequest::new("What is the capital of France?"))
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn results_are_ordered_by_descending_score() {
    let retriever = built_retriever().await;

    let request = QueryRequest::new("What fire-resistance rating is required between dwelling units?")
        .with_top_k(3)
        .with_floor(-1.0);
    let result = retriever.retrieve(&request).await.unwrap();

    assert_eq!(result.len(), 3);
    for pair in result.passages.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(result.passages[0].text.contains("dwelling units"));
}

#[tokio::test]
async fn section_filter_narrows_the_candidate_set() {
    let retriever = built_retriever().await;

    // Filtered to Part 9, the dwelling-unit provision is out of reach.
    let request = QueryRequest::new("What fire-resistance rating is required between dwelling units?")
        .with_floor(-1.0)
        .with_filter(SearchFilter::section(vec!["9.9".to_string()]));
    let result = retriever.retrieve(&request).await.unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.passages[0].text.contains("two exits"));
}

#[tokio::test]
async fn concurrent_queries_share_one_index() {
    let retriever = Arc::new(built_retriever().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let retriever = Arc::clone(&retriever);
        handles.push(tokio::spawn(async move {
            retriever
                .retrieve(&QueryRequest::new(
                    "What fire-resistance rating is required between dwelling units?",
                ))
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(!result.is_empty());
        assert_eq!(result.passages[0].citation.section_path, vec!["3.1", "3.1.2"]);
    }
}
