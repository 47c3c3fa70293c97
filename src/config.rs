//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The default system prompt: instructs the model to answer only from the
/// supplied context.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Sampling knobs passed through to the generation backend unchanged.
///
/// The pipeline never reinterprets these; each [`Generator`](crate::Generator)
/// maps them onto its own API. The defaults select deterministic decoding,
/// so repeating a query is safe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Maximum number of new tokens to generate.
    pub max_new_tokens: u32,
    /// Sampling temperature; `0.0` means deterministic decoding.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Penalty applied to repeated tokens.
    pub repetition_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_new_tokens: 1024, temperature: 0.0, top_p: 0.95, repetition_penalty: 1.15 }
    }
}

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of chunks to retrieve per query.
    pub top_k: usize,
    /// System instruction embedded in every prompt.
    pub system_prompt: String,
    /// Character budget for the assembled prompt; context is truncated
    /// lowest-ranked first when exceeded.
    pub max_prompt_chars: usize,
    /// Sampling configuration forwarded to the generator.
    pub generation: GenerationConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 64,
            top_k: 2,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_prompt_chars: 12_288,
            generation: GenerationConfig::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    #[must_use]
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of chunks to retrieve per query.
    #[must_use]
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the system instruction embedded in every prompt.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Set the character budget for the assembled prompt.
    #[must_use]
    pub fn max_prompt_chars(mut self, budget: usize) -> Self {
        self.config.max_prompt_chars = budget;
        self
    }

    /// Set the sampling configuration forwarded to the generator.
    #[must_use]
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_prompt_chars == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_prompt_chars == 0 {
            return Err(RagError::Config("max_prompt_chars must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
