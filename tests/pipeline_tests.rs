//! End-to-end pipeline tests with deterministic collaborators.

mod common;

use std::sync::Arc;

use futures::StreamExt;

use common::{
    FailingEmbedder, FailingGenerator, HashEmbedder, MidStreamFailingGenerator, StubGenerator,
};
use finrag::{
    Document, Embedder, FixedSizeChunker, Generator, InMemoryIndex, Query, RagConfig, RagError,
    RagPipeline, Stage, VectorIndex,
};

fn pipeline_with(
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> RagPipeline {
    let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap).unwrap();
    RagPipeline::builder()
        .config(config)
        .embedder(embedder)
        .index(Arc::new(InMemoryIndex::new()))
        .chunker(Arc::new(chunker))
        .generator(generator)
        .build()
        .unwrap()
}

fn default_pipeline(generator: Arc<dyn Generator>) -> RagPipeline {
    pipeline_with(RagConfig::default(), Arc::new(HashEmbedder::new(64)), generator)
}

#[tokio::test]
async fn answers_per_share_revenue_question_from_single_page() {
    let pipeline = default_pipeline(Arc::new(StubGenerator::fixed("$10 per share.")));
    let report = Document::from_text("report", "Revenue was $10 per share in 2023.");

    let chunks = pipeline.ingest(&report).await.unwrap();
    assert_eq!(chunks.len(), 1);

    let retrieved = pipeline.retrieve("What was the per-share revenue?", 1).await.unwrap();
    assert_eq!(retrieved.len(), 1);
    assert_eq!(retrieved[0].chunk.text, "Revenue was $10 per share in 2023.");

    let answer = pipeline.ask(Query::new("What was the per-share revenue?").with_top_k(1)).await.unwrap();
    assert_eq!(answer.text, "$10 per share.");
    assert_eq!(answer.sources, retrieved);
}

#[tokio::test]
async fn streaming_and_eager_paths_yield_the_same_answer() {
    let generator = Arc::new(StubGenerator::streaming(&["Revenue ", "was ", "$10."]));
    let pipeline = default_pipeline(generator);
    pipeline.ingest(&Document::from_text("r", "Revenue was $10 per share in 2023.")).await.unwrap();

    let eager = pipeline.ask("revenue?").await.unwrap();

    let mut streaming = pipeline.ask_streaming("revenue?").await.unwrap();
    assert_eq!(streaming.sources(), eager.sources.as_slice());

    // Fragments arrive in generation order, before the final answer exists.
    let mut fragments = Vec::new();
    while let Some(fragment) = streaming.next().await {
        fragments.push(fragment.unwrap());
    }
    assert_eq!(fragments, ["Revenue ", "was ", "$10."]);
    assert_eq!(fragments.concat(), eager.text);
}

#[tokio::test]
async fn drained_stream_equals_eager_answer() {
    let generator = Arc::new(StubGenerator::streaming(&["a", "b", "c"]));
    let pipeline = default_pipeline(generator);
    pipeline.ingest(&Document::from_text("r", "some context text")).await.unwrap();

    let eager = pipeline.ask("q").await.unwrap();
    let drained = pipeline.ask_streaming("q").await.unwrap().into_answer().await.unwrap();
    assert_eq!(eager, drained);
}

#[tokio::test]
async fn query_against_empty_index_answers_without_sources() {
    let pipeline = default_pipeline(Arc::new(StubGenerator::fixed("I don't know.")));

    let answer = pipeline.ask("anything?").await.unwrap();
    assert_eq!(answer.text, "I don't know.");
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn retrieval_with_fewer_entries_than_k_returns_all() {
    let pipeline = default_pipeline(Arc::new(StubGenerator::fixed("ok")));
    pipeline.ingest(&Document::from_text("r", "only one small chunk")).await.unwrap();

    let retrieved = pipeline.retrieve("chunk?", 10).await.unwrap();
    assert_eq!(retrieved.len(), 1);
}

#[tokio::test]
async fn embedding_failure_surfaces_at_retrieving_stage() {
    let pipeline = pipeline_with(
        RagConfig::default(),
        Arc::new(FailingEmbedder),
        Arc::new(StubGenerator::fixed("unused")),
    );

    match pipeline.ask("q").await {
        Err(RagError::Pipeline { stage: Stage::Retrieving, message }) => {
            assert!(message.contains("backend unavailable"));
        }
        other => panic!("expected Retrieving-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn embedding_failure_surfaces_at_ingesting_stage() {
    let pipeline = pipeline_with(
        RagConfig::default(),
        Arc::new(FailingEmbedder),
        Arc::new(StubGenerator::fixed("unused")),
    );

    match pipeline.ingest(&Document::from_text("r", "text")).await {
        Err(RagError::Pipeline { stage: Stage::Ingesting, .. }) => {}
        other => panic!("expected Ingesting-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn generation_failure_surfaces_at_generating_stage() {
    let pipeline = default_pipeline(Arc::new(FailingGenerator));
    pipeline.ingest(&Document::from_text("r", "context")).await.unwrap();

    match pipeline.ask("q").await {
        Err(RagError::Pipeline { stage: Stage::Generating, message }) => {
            assert!(message.contains("model crashed"));
        }
        other => panic!("expected Generating-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn mid_stream_failure_is_annotated_and_aborts_drain() {
    let pipeline = default_pipeline(Arc::new(MidStreamFailingGenerator));
    pipeline.ingest(&Document::from_text("r", "context")).await.unwrap();

    let mut streaming = pipeline.ask_streaming("q").await.unwrap();
    // First fragment is delivered before the failure.
    assert_eq!(streaming.next().await.unwrap().unwrap(), "partial ");
    match streaming.next().await.unwrap() {
        Err(RagError::Pipeline { stage: Stage::Generating, .. }) => {}
        other => panic!("expected Generating-stage failure, got {other:?}"),
    }

    // Eager drain surfaces the same failure instead of a partial answer.
    assert!(pipeline.ask("q").await.is_err());
}

#[tokio::test]
async fn rebuilding_from_same_documents_yields_equal_chunks() {
    let docs = vec![
        Document::from_text("tesla", "Tesla revenue grew twelve percent year over year."),
        Document::from_text("nvidia", "Nvidia data center revenue set a new record."),
    ];

    let first = default_pipeline(Arc::new(StubGenerator::fixed("ok")));
    let second = default_pipeline(Arc::new(StubGenerator::fixed("ok")));

    let chunks_a = first.ingest_all(&docs).await.unwrap();
    let chunks_b = second.ingest_all(&docs).await.unwrap();
    assert_eq!(chunks_a, chunks_b);
    assert_eq!(first.index().len().await, second.index().len().await);
}

#[tokio::test]
async fn short_embedding_batch_is_rejected_at_ingest() {
    struct ShortBatchEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ShortBatchEmbedder {
        async fn embed(&self, _text: &str) -> finrag::Result<Vec<f32>> {
            Ok(vec![0.0; 8])
        }
        // Misbehaving batch override: one vector fewer than inputs.
        async fn embed_batch(&self, texts: &[&str]) -> finrag::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![0.0f32; 8]).collect())
        }
        fn dimensions(&self) -> usize {
            8
        }
    }

    let config = RagConfig::builder().chunk_size(16).chunk_overlap(0).top_k(1).build().unwrap();
    let pipeline = pipeline_with(
        config,
        Arc::new(ShortBatchEmbedder),
        Arc::new(StubGenerator::fixed("unused")),
    );

    match pipeline.ingest(&Document::from_text("r", "a".repeat(64))).await {
        Err(RagError::Pipeline { stage: Stage::Ingesting, message }) => {
            assert!(message.contains("vectors"), "unexpected message: {message}");
        }
        other => panic!("expected Ingesting-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_input_is_rejected_by_the_embedder() {
    let embedder = HashEmbedder::new(8);
    match embedder.embed("").await {
        Err(RagError::Embedding { message, .. }) => {
            assert!(message.contains("empty"), "unexpected message: {message}");
        }
        other => panic!("expected Embedding error, got {other:?}"),
    }

    // An empty question surfaces the rejection at the retrieving stage.
    let pipeline = default_pipeline(Arc::new(StubGenerator::fixed("unused")));
    match pipeline.ask("").await {
        Err(RagError::Pipeline { stage: Stage::Retrieving, .. }) => {}
        other => panic!("expected Retrieving-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn dishonest_embedder_dimension_is_rejected_at_ingest() {
    struct WrongDimensionEmbedder;

    #[async_trait::async_trait]
    impl Embedder for WrongDimensionEmbedder {
        async fn embed(&self, _text: &str) -> finrag::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }
        fn dimensions(&self) -> usize {
            8
        }
    }

    let pipeline = pipeline_with(
        RagConfig::default(),
        Arc::new(WrongDimensionEmbedder),
        Arc::new(StubGenerator::fixed("unused")),
    );

    match pipeline.ingest(&Document::from_text("r", "text")).await {
        Err(RagError::Pipeline { stage: Stage::Ingesting, message }) => {
            assert!(message.contains("dimension"), "unexpected message: {message}");
        }
        other => panic!("expected Ingesting-stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn builder_rejects_missing_components() {
    let result = RagPipeline::builder().config(RagConfig::default()).build();
    match result {
        Err(RagError::Config(message)) => assert!(message.contains("required")),
        other => panic!("expected Config error, got {:?}", other.map(|_| "pipeline")),
    }
}

#[tokio::test]
async fn chunking_respects_configured_sizes_through_the_pipeline() {
    let config = RagConfig::builder().chunk_size(32).chunk_overlap(8).top_k(2).build().unwrap();
    let pipeline = pipeline_with(
        config,
        Arc::new(HashEmbedder::new(16)),
        Arc::new(StubGenerator::fixed("ok")),
    );

    let long_text = "Quarterly revenue and margin commentary. ".repeat(10);
    let chunks = pipeline.ingest(&Document::from_text("long", long_text)).await.unwrap();

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 32);
    }
}
