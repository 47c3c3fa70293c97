//! Page-aware document chunking.
//!
//! [`FixedSizeChunker`] slides a fixed-size character window over a
//! document's concatenated page text, so a chunk may span a page boundary.
//! Each chunk records its char offset range and the page containing its
//! starting offset, for citation.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and source offsets;
/// embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no text. Never produces
    /// zero-length chunks.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits concatenated page text into fixed-size chunks with overlap.
///
/// The window advances `chunk_size - overlap` characters per step, so
/// consecutive chunks from contiguous text share their trailing/leading
/// `overlap` characters. The final chunk may be shorter than `chunk_size`.
///
/// # Example
///
/// ```rust,ignore
/// use finrag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1024, 64)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] unless `chunk_size > overlap`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(RagError::Config(format!(
                "chunk_size ({chunk_size}) must be greater than overlap ({overlap})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

/// Find the page whose text contains the given char offset.
///
/// `boundaries` holds `(starting char offset, page index)` pairs in
/// ascending offset order.
fn page_at(boundaries: &[(usize, usize)], offset: usize) -> usize {
    match boundaries.binary_search_by(|(start, _)| start.cmp(&offset)) {
        Ok(i) => boundaries[i].1,
        Err(0) => 0,
        Err(i) => boundaries[i - 1].1,
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        // Concatenate pages in order, recording where each page starts.
        // Empty pages contribute nothing.
        let mut boundaries: Vec<(usize, usize)> = Vec::with_capacity(document.pages.len());
        let mut chars: Vec<char> = Vec::new();
        for page in &document.pages {
            if page.text.is_empty() {
                continue;
            }
            boundaries.push((chars.len(), page.index));
            chars.extend(page.text.chars());
        }
        if chars.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();

            chunks.push(Chunk {
                document_id: document.id.clone(),
                page: page_at(&boundaries, start),
                start,
                end,
                text,
            });

            // Once the window reaches the end, a further step would only
            // re-emit text already covered by this chunk.
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
