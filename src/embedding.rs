//! Embedding trait for mapping text to dense vectors.

use async_trait::async_trait;

use crate::error::Result;

/// Maps a text string to a fixed-length dense vector.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](Embedder::embed_batch)
/// implementation calls [`embed`](Embedder::embed) sequentially; backends
/// with native batching should override it.
///
/// Empty input must be rejected with [`RagError::Embedding`](crate::RagError::Embedding)
/// rather than embedded: a zero-information vector would match everything
/// and nothing.
///
/// # Example
///
/// ```rust,ignore
/// use finrag::Embedder;
///
/// let embedding = embedder.embed("per share revenue").await?;
/// assert_eq!(embedding.len(), embedder.dimensions());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation embeds each input sequentially.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this embedder.
    ///
    /// Must be constant for the lifetime of the embedder; the index checks
    /// stored and query vectors against it.
    fn dimensions(&self) -> usize;
}
