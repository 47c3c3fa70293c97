//! Data types for documents, pages, chunks, queries, and answers.

use serde::{Deserialize, Serialize};

/// A single page of a source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// The ID of the document this page belongs to.
    pub document_id: String,
    /// Zero-based page index within the document.
    pub index: usize,
    /// The raw text content of the page.
    pub text: String,
}

/// A source document: an identifier plus its pages in order.
///
/// Documents are created at ingestion and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The document's pages, in reading order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a single-page document from raw text.
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        let page = Page { document_id: id.clone(), index: 0, text: text.into() };
        Self { id, pages: vec![page] }
    }
}

/// A bounded-length text fragment cut from a source document.
///
/// `start..end` is the char offset range within the document's concatenated
/// page text. A chunk that spans a page boundary is attributed to the page
/// containing its starting offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The ID of the source document.
    pub document_id: String,
    /// The page index containing the chunk's starting offset.
    pub page: usize,
    /// Starting char offset within the document text.
    pub start: usize,
    /// Ending char offset (exclusive) within the document text.
    pub end: usize,
    /// The chunk's text content.
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// A user question with an optional retrieval depth override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    /// The natural-language question.
    pub question: String,
    /// How many chunks to retrieve; the pipeline default applies when `None`.
    pub top_k: Option<usize>,
}

impl Query {
    /// Create a query that uses the pipeline's configured retrieval depth.
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), top_k: None }
    }

    /// Override the number of chunks to retrieve for this query.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

impl From<&str> for Query {
    fn from(question: &str) -> Self {
        Self::new(question)
    }
}

impl From<String> for Query {
    fn from(question: String) -> Self {
        Self::new(question)
    }
}

/// A generated answer together with the chunks it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// The retrieval results the answer was grounded in, in ranked order.
    pub sources: Vec<ScoredChunk>,
}
