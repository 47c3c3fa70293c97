//! Shared test fixtures: deterministic embedder and stub generators.

#![allow(dead_code)]

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;

use finrag::{Embedder, GenerationConfig, GenerationStream, Generator, RagError, Result};

/// Deterministic hash-based embedder: the vector direction depends only on
/// the text content, so identical texts embed identically across runs.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(RagError::Embedding {
                provider: "hash".to_string(),
                message: "input is empty".to_string(),
            });
        }
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalise so cosine similarity of identical texts is 1.0.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedder that always fails, for error propagation tests.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::Embedding {
            provider: "failing".to_string(),
            message: "backend unavailable".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// A generator that streams a fixed sequence of fragments.
pub struct StubGenerator {
    fragments: Vec<String>,
}

impl StubGenerator {
    /// A deterministic generator producing `text` as a single fragment.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self { fragments: vec![text.into()] }
    }

    /// A generator producing the given fragments in order.
    pub fn streaming(fragments: &[&str]) -> Self {
        Self { fragments: fragments.iter().map(|f| f.to_string()).collect() }
    }
}

#[async_trait]
impl Generator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationStream> {
        let fragments = self.fragments.clone();
        let stream = try_stream! {
            for fragment in fragments {
                yield fragment;
            }
        };
        Ok(Box::pin(stream))
    }
}

/// A generator that rejects every request.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationStream> {
        Err(RagError::Generation {
            model: "failing".to_string(),
            message: "model crashed".to_string(),
        })
    }
}

/// A generator whose stream fails after yielding one fragment.
pub struct MidStreamFailingGenerator;

#[async_trait]
impl Generator for MidStreamFailingGenerator {
    fn name(&self) -> &str {
        "mid-stream-failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationStream> {
        let items: Vec<Result<String>> = vec![
            Ok("partial ".to_string()),
            Err(RagError::Generation {
                model: "mid-stream-failing".to_string(),
                message: "decode error".to_string(),
            }),
        ];
        Ok(futures::stream::iter(items).boxed())
    }
}
