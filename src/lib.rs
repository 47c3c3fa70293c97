//! # finrag
//!
//! Retrieval-augmented question answering over financial report documents.
//!
//! ## Overview
//!
//! The crate is a single-process RAG pipeline with two phases:
//!
//! - **Build**: a [`DocumentLoader`] produces page records, a [`Chunker`]
//!   cuts them into overlapping fixed-size passages, an [`Embedder`] maps
//!   each passage to a dense vector, and a [`VectorIndex`] stores the pairs.
//! - **Query**: the question is embedded and the top-k chunks retrieved,
//!   a [`PromptAssembler`] renders a bounded instruction prompt, and a
//!   [`Generator`] streams the grounded answer. The [`Answer`] carries the
//!   retrieval results it was conditioned on, for citation.
//!
//! The index must be built explicitly before querying; there is no ambient
//! global store. Queries run one at a time; ingestion is a one-time batch
//! step, not concurrent with queries.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finrag::{
//!     FixedSizeChunker, InMemoryIndex, RagConfig, RagPipeline, TextDirectoryLoader,
//! };
//!
//! let config = RagConfig::builder().chunk_size(1024).chunk_overlap(64).top_k(2).build()?;
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(InMemoryIndex::new()))
//!     .chunker(Arc::new(FixedSizeChunker::new(1024, 64)?))
//!     .generator(Arc::new(model))
//!     .build()?;
//!
//! pipeline.ingest_from(&TextDirectoryLoader::new("reports")).await?;
//! let answer = pipeline.ask("What was the per share revenue in 2023?").await?;
//! println!("{}", answer.text);
//! ```
//!
//! ## Features
//!
//! - `openai` - [`Embedder`] and [`Generator`] implementations for the
//!   OpenAI-compatible HTTP API (hosted or local).

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{DEFAULT_SYSTEM_PROMPT, GenerationConfig, RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, Page, Query, ScoredChunk};
pub use embedding::Embedder;
pub use error::{RagError, Result, Stage};
pub use generator::{GenerationStream, Generator};
pub use index::{InMemoryIndex, IndexEntry, VectorIndex};
pub use loader::{DocumentLoader, PreviewRenderer, TextDirectoryLoader};
pub use pipeline::{AnswerStream, RagPipeline, RagPipelineBuilder};
pub use prompt::{Prompt, PromptAssembler};
pub use retriever::Retriever;
