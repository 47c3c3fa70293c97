//! Query-side retrieval: embed the question, then search the index.

use std::sync::Arc;

use tracing::debug;

use crate::document::ScoredChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;

/// Retrieves the top-k chunks for a question.
///
/// Thin composition of an [`Embedder`] and a [`VectorIndex`]: the question
/// is embedded, then the index is searched with the resulting vector.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a retriever over the given embedder and index.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Return the `top_k` chunks most similar to `question`.
    ///
    /// `top_k == 0` yields an empty result; an index holding fewer than
    /// `top_k` entries yields all of them. Both are results, not errors.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Embedding`](crate::RagError::Embedding) from
    /// the embedder or a query/index dimension mismatch.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed(question).await?;
        let results = self.index.search(&embedding, top_k).await?;
        debug!(top_k, result_count = results.len(), "retrieved chunks");
        Ok(results)
    }
}
