//! Vector index: storage and nearest-neighbour search over chunk embeddings.
//!
//! [`InMemoryIndex`] is a linear-scan index using cosine similarity, sized
//! for corpora of hundreds to low thousands of chunks. Insertion order is
//! preserved and breaks similarity ties, so repeated builds rank identically.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, ScoredChunk};
use crate::error::{RagError, Result};

/// A [`Chunk`] paired with its embedding vector, owned by the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// The stored chunk.
    pub chunk: Chunk,
    /// The chunk's embedding vector.
    pub embedding: Vec<f32>,
}

/// Stores (chunk, embedding) pairs and answers nearest-neighbour queries.
///
/// Duplicate chunks (identical text and source) are permitted and stored
/// independently. Searching an empty index returns an empty result rather
/// than an error, as does `top_k == 0`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add entries to the index.
    ///
    /// The batch is inserted atomically: a concurrent reader never observes
    /// part of it.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if an entry's dimension differs from
    /// the entries already stored, or [`RagError::Index`] if an embedding
    /// is empty.
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Return the `top_k` entries most similar to `embedding`, by descending
    /// cosine similarity, ties broken by insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the query dimension differs from
    /// the stored dimension.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>>;

    /// Return the number of stored entries.
    async fn len(&self) -> usize;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A linear-scan in-memory [`VectorIndex`] using cosine similarity.
///
/// Entries live in a `Vec` behind a `tokio::sync::RwLock`: one writer during
/// the build phase, many readers during the query phase.
///
/// # Example
///
/// ```rust,ignore
/// use finrag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.add(entries).await?;
/// let results = index.search(&query_embedding, 2).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` if the index holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Write a JSON snapshot of the index to `path`.
    ///
    /// The snapshot records chunk text, source identifiers, and embedding
    /// vectors losslessly; loading it back does not alter rankings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let entries = self.entries.read().await;
        let json = serde_json::to_string(&*entries)
            .map_err(|e| RagError::Index(format!("failed to serialize index: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            RagError::Index(format!("failed to write '{}': {e}", path.display()))
        })?;
        debug!(entry_count = entries.len(), path = %path.display(), "saved index snapshot");
        Ok(())
    }

    /// Load an index from a JSON snapshot written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RagError::Index(format!("failed to read '{}': {e}", path.display()))
        })?;
        let entries: Vec<IndexEntry> = serde_json::from_str(&json)
            .map_err(|e| RagError::Index(format!("failed to parse '{}': {e}", path.display())))?;
        debug!(entry_count = entries.len(), path = %path.display(), "loaded index snapshot");
        Ok(Self { entries: RwLock::new(entries) })
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn add(&self, new_entries: Vec<IndexEntry>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut expected = entries.first().map(|e| e.embedding.len());
        for entry in &new_entries {
            if entry.embedding.is_empty() {
                return Err(RagError::Index(format!(
                    "entry for chunk '{}' page {} has an empty embedding",
                    entry.chunk.document_id, entry.chunk.page
                )));
            }
            match expected {
                Some(dim) if entry.embedding.len() != dim => {
                    return Err(RagError::Embedding {
                        provider: "index".to_string(),
                        message: format!(
                            "dimension mismatch: index holds {dim}-dimensional vectors, got {}",
                            entry.embedding.len()
                        ),
                    });
                }
                Some(_) => {}
                None => expected = Some(entry.embedding.len()),
            }
        }
        entries.extend(new_entries);
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self.entries.read().await;
        if top_k == 0 || entries.is_empty() {
            return Ok(Vec::new());
        }
        let dim = entries[0].embedding.len();
        if embedding.len() != dim {
            return Err(RagError::Embedding {
                provider: "index".to_string(),
                message: format!(
                    "dimension mismatch: index holds {dim}-dimensional vectors, query has {}",
                    embedding.len()
                ),
            });
        }

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
