//! Error types for the `finrag` crate.

use thiserror::Error;

/// The pipeline stage at which a query or ingest operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading, chunking, embedding, and index population.
    Ingesting,
    /// Query embedding and vector search.
    Retrieving,
    /// Prompt assembly.
    Assembling,
    /// Answer generation.
    Generating,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Ingesting => "ingesting",
            Stage::Retrieving => "retrieving",
            Stage::Assembling => "assembling",
            Stage::Generating => "generating",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in retrieval-augmented generation operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error occurred while loading source documents.
    #[error("Load error ({path}): {message}")]
    Load {
        /// The path that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation, including dimension
    /// mismatches between query and stored vectors.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index.
    #[error("Index error: {0}")]
    Index(String),

    /// An error occurred during text generation.
    #[error("Generation error ({model}): {message}")]
    Generation {
        /// The generation model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// An error surfaced at the pipeline boundary, annotated with the stage
    /// at which it occurred. The underlying error is never masked.
    #[error("Pipeline error ({stage} stage): {message}")]
    Pipeline {
        /// The stage the pipeline was in when the error occurred.
        stage: Stage,
        /// The underlying error, rendered.
        message: String,
    },
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
