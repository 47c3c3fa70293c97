//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] composes an [`Embedder`], a [`VectorIndex`], a
//! [`Chunker`], and a [`Generator`]. The build phase (ingest: chunk →
//! embed → index) must run before the query phase (retrieve → assemble →
//! generate); the index is explicit state owned by the caller, never an
//! ambient global.
//!
//! # Example
//!
//! ```rust,ignore
//! use finrag::{FixedSizeChunker, InMemoryIndex, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .chunker(Arc::new(FixedSizeChunker::new(1024, 64)?))
//!     .generator(Arc::new(my_model))
//!     .build()?;
//!
//! pipeline.ingest_from(&TextDirectoryLoader::new("reports")).await?;
//! let answer = pipeline.ask("What was the per share revenue in 2023?").await?;
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, Query, ScoredChunk};
use crate::embedding::Embedder;
use crate::error::{RagError, Result, Stage};
use crate::generator::{GenerationStream, Generator};
use crate::index::{IndexEntry, VectorIndex};
use crate::loader::DocumentLoader;
use crate::prompt::PromptAssembler;
use crate::retriever::Retriever;

/// Wrap an error at the pipeline boundary, annotating the failing stage.
fn at_stage(stage: Stage, err: &RagError) -> RagError {
    error!(%stage, error = %err, "pipeline stage failed");
    RagError::Pipeline { stage, message: err.to_string() }
}

/// The RAG pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. A query moves through
/// retrieving, assembling, and generating; any failure surfaces as
/// [`RagError::Pipeline`] naming the stage, with no retry and no fabricated
/// fallback answer.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
    assembler: PromptAssembler,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Ingest a single document: chunk → embed → index.
    ///
    /// Returns the chunks that were indexed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] at the ingesting stage if embedding
    /// or indexing fails, including an embedder that reports one dimension
    /// and produces another.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>> {
        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings =
            self.embedder.embed_batch(&texts).await.map_err(|e| at_stage(Stage::Ingesting, &e))?;

        if embeddings.len() != chunks.len() {
            let err = RagError::Embedding {
                provider: "embedder".to_string(),
                message: format!(
                    "embedder returned {} vectors for {} inputs",
                    embeddings.len(),
                    chunks.len()
                ),
            };
            return Err(at_stage(Stage::Ingesting, &err));
        }

        let expected = self.embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            let err = RagError::Embedding {
                provider: "embedder".to_string(),
                message: format!(
                    "embedder reports {expected} dimensions but produced {}",
                    bad.len()
                ),
            };
            return Err(at_stage(Stage::Ingesting, &err));
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        self.index.add(entries).await.map_err(|e| at_stage(Stage::Ingesting, &e))?;

        info!(document.id = %document.id, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Ingest multiple documents, returning all indexed chunks.
    ///
    /// # Errors
    ///
    /// Fails on the first document that cannot be ingested.
    pub async fn ingest_all(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for document in documents {
            all_chunks.extend(self.ingest(document).await?);
        }
        Ok(all_chunks)
    }

    /// Load documents from `loader` and ingest them all.
    ///
    /// This is the build phase entry point: run it once before querying.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] at the ingesting stage if loading,
    /// embedding, or indexing fails.
    pub async fn ingest_from(&self, loader: &dyn DocumentLoader) -> Result<Vec<Chunk>> {
        let documents = loader.load().map_err(|e| at_stage(Stage::Ingesting, &e))?;
        self.ingest_all(&documents).await
    }

    /// Retrieve the chunks most similar to `question` without generating.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] at the retrieving stage on embedding
    /// or search failure.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        self.retriever.retrieve(question, top_k).await.map_err(|e| at_stage(Stage::Retrieving, &e))
    }

    /// Answer a query, draining the generation stream eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] naming the stage that failed.
    pub async fn ask(&self, query: impl Into<Query>) -> Result<Answer> {
        self.ask_streaming(query).await?.into_answer().await
    }

    /// Answer a query, exposing generated fragments as they are produced.
    ///
    /// The returned [`AnswerStream`] carries the retrieval results up front;
    /// fragments arrive in generation order. Dropping the stream cancels
    /// generation without retracting fragments already delivered.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] naming the stage that failed.
    pub async fn ask_streaming(&self, query: impl Into<Query>) -> Result<AnswerStream> {
        let query = query.into();
        let top_k = query.top_k.unwrap_or(self.config.top_k);

        // Retrieving
        let sources = self
            .retriever
            .retrieve(&query.question, top_k)
            .await
            .map_err(|e| at_stage(Stage::Retrieving, &e))?;
        if sources.is_empty() {
            warn!(question = %query.question, "no context retrieved, answering ungrounded");
        }

        // Assembling
        let prompt = self.assembler.assemble(&sources, &query.question);

        // Generating
        let fragments = self
            .generator
            .generate(&prompt.text, &self.config.generation)
            .await
            .map_err(|e| at_stage(Stage::Generating, &e))?;
        let fragments: GenerationStream = fragments
            .map(|item| item.map_err(|e| at_stage(Stage::Generating, &e)))
            .boxed();

        Ok(AnswerStream { sources, fragments })
    }
}

/// An in-flight answer: retrieval results plus the fragment stream.
///
/// Consume it incrementally via its [`Stream`] implementation or drain it
/// with [`into_answer`](AnswerStream::into_answer); both paths yield the
/// same final text.
pub struct AnswerStream {
    sources: Vec<ScoredChunk>,
    fragments: GenerationStream,
}

impl AnswerStream {
    /// The retrieval results the answer is being conditioned on.
    pub fn sources(&self) -> &[ScoredChunk] {
        &self.sources
    }

    /// Drain the remaining fragments into a complete [`Answer`].
    ///
    /// # Errors
    ///
    /// Returns the first mid-stream generation failure, annotated with the
    /// generating stage.
    pub async fn into_answer(mut self) -> Result<Answer> {
        let mut text = String::new();
        while let Some(fragment) = self.fragments.next().await {
            text.push_str(&fragment?);
        }
        info!(source_count = self.sources.len(), answer_chars = text.len(), "query completed");
        Ok(Answer { text, sources: self.sources })
    }
}

impl Stream for AnswerStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().fragments.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for AnswerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerStream").field("sources", &self.sources.len()).finish()
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
    generator: Option<Arc<dyn Generator>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index.
    #[must_use]
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document chunker.
    #[must_use]
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the generation model.
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`RagPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;

        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&index));
        let assembler =
            PromptAssembler::new(config.system_prompt.as_str(), config.max_prompt_chars);

        Ok(RagPipeline { config, embedder, index, chunker, generator, retriever, assembler })
    }
}
