//! OpenAI-compatible embedding and generation backends.
//!
//! Both clients speak the OpenAI HTTP API via `reqwest`, so they also work
//! against compatible local servers (Ollama, vLLM, llama.cpp) by overriding
//! the base URL. Only available when the `openai` feature is enabled.

use async_stream::try_stream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::config::GenerationConfig;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generator::{GenerationStream, Generator};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model and its dimensionality.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Extract a readable message from an error response body.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ApiErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    format!("API returned {status}: {detail}")
}

fn resolve_api_key(api_key: &str) -> Result<String> {
    if !api_key.is_empty() {
        return Ok(api_key.to_string());
    }
    std::env::var("OPENAI_API_KEY").map_err(|_| RagError::Config(
        "no API key given and OPENAI_API_KEY environment variable not set".to_string(),
    ))
}

// ── Embedder ───────────────────────────────────────────────────────

/// An [`Embedder`] backed by the `/v1/embeddings` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use finrag::openai::OpenAiEmbedder;
///
/// let embedder = OpenAiEmbedder::new("sk-...")?;
/// let embedding = embedder.embed("quarterly revenue").await?;
/// ```
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create an embedder with the given API key.
    ///
    /// An empty key falls back to the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if no API key can be resolved.
    pub fn new(api_key: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: resolve_api_key(api_key.as_ref())?,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Point the client at an OpenAI-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the embedding model and its output dimensionality.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn embedding_error(&self, message: String) -> RagError {
        RagError::Embedding { provider: self.model.clone(), message }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .pop()
            .ok_or_else(|| self.embedding_error("API returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(pos) = texts.iter().position(|t| t.is_empty()) {
            return Err(self.embedding_error(format!("input {pos} is empty")));
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let body = json!({ "model": self.model, "input": texts });
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "embedding request failed");
                self.embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let detail = error_detail(response).await;
            error!(model = %self.model, "embedding API error");
            return Err(self.embedding_error(detail));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| self.embedding_error(format!("failed to parse response: {e}")))?;

        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(self.embedding_error(format!(
                "expected {}-dimensional vectors, got {}",
                self.dimensions,
                bad.len()
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Generator ──────────────────────────────────────────────────────

/// A [`Generator`] backed by the `/v1/chat/completions` endpoint.
///
/// The completion is requested in one call and delivered through the
/// [`GenerationStream`] as a single fragment.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiGenerator {
    /// Create a generator for the given model.
    ///
    /// An empty key falls back to the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if no API key can be resolved.
    pub fn new(api_key: impl AsRef<str>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: resolve_api_key(api_key.as_ref())?,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Point the client at an OpenAI-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn generation_error(model: &str, message: String) -> RagError {
    RagError::Generation { model: model.to_string(), message }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationStream> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "requesting completion");

        // repetition_penalty is honoured by OpenAI-compatible local servers
        // and ignored by the hosted API.
        let body = json!({
            "model": self.model,
            "messages": [ChatMessage { role: "user", content: prompt }],
            "max_tokens": config.max_new_tokens,
            "temperature": config.temperature,
            "top_p": config.top_p,
            "repetition_penalty": config.repetition_penalty,
        });

        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let url = format!("{}/chat/completions", self.base_url);
        let model = self.model.clone();

        let stream = try_stream! {
            let response = client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    error!(model = %model, error = %e, "completion request failed");
                    generation_error(&model, format!("request failed: {e}"))
                })?;

            if !response.status().is_success() {
                let detail = error_detail(response).await;
                error!(model = %model, "completion API error");
                Err(generation_error(&model, detail))?;
            } else {
                let parsed: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| generation_error(&model, format!("failed to parse response: {e}")))?;
                let text = parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .ok_or_else(|| generation_error(&model, "API returned no choices".to_string()))?;

                yield text;
            }
        };
        Ok(Box::pin(stream))
    }
}
