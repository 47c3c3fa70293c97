//! Text generation trait with streaming output.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::config::GenerationConfig;
use crate::error::Result;

/// A lazy, finite, non-restartable stream of generated text fragments.
///
/// Fragments arrive in generation order and are never reordered. Dropping
/// the stream cancels generation and releases backend resources; fragments
/// already yielded are not retracted.
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A text-generation model consuming an assembled prompt.
///
/// Backends are treated as blocking collaborators with no internal retry;
/// a failure propagates immediately. Callers may drain the returned stream
/// eagerly into a single answer or forward fragments incrementally; both
/// use the same underlying call.
#[async_trait]
pub trait Generator: Send + Sync {
    /// The model name, used in error and log annotations.
    fn name(&self) -> &str;

    /// Start generating a completion for `prompt`.
    ///
    /// The knobs in `config` are passed through to the backend without
    /// reinterpretation.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`](crate::RagError::Generation) if the
    /// backend rejects the request; mid-stream failures surface as `Err`
    /// items on the returned stream.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationStream>;
}
