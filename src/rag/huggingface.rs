//! Hugging Face Inference API client for embeddings and text generation.
//!
//! Feature extraction: `POST {base}/{model}/pipeline/feature-extraction`
//! with `{"inputs": [...]}`. Generation: `POST {base}/{model}` with
//! `{"inputs": prompt, "parameters": {...}}`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Embedder, Generator, RagError};

pub const DEFAULT_MAX_NEW_TOKENS: u32 = 512;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a [String],
}

/// Sentence-transformer models return one vector per input; plain
/// encoders return one vector per token and are mean-pooled here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Pooled(Vec<Vec<f32>>),
    TokenLevel(Vec<Vec<Vec<f32>>>),
}

impl EmbeddingResponse {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResponse::Pooled(vectors) => vectors,
            EmbeddingResponse::TokenLevel(tokens) => tokens.iter().map(|t| mean_pool(t)).collect(),
        }
    }
}

fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = tokens.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f32; first.len()];
    for token in tokens {
        for (acc, value) in sum.iter_mut().zip(token) {
            *acc += value;
        }
    }
    let count = tokens.len() as f32;
    sum.iter_mut().for_each(|v| *v /= count);
    sum
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    token: String,
    embedding_model: String,
    generation_model: String,
    max_new_tokens: u32,
}

impl HuggingFaceClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        embedding_model: impl Into<String>,
        generation_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            embedding_model: embedding_model.into(),
            generation_model: generation_model.into(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    fn embedding_url(&self) -> String {
        format!("{}/{}/pipeline/feature-extraction", self.base_url, self.embedding_model)
    }

    fn generation_url(&self) -> String {
        format!("{}/{}", self.base_url, self.generation_model)
    }

    async fn send<T>(&self, request: RequestBuilder, model: &str) -> Result<T, RagError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RagError::Backend(format!("request to {} failed: {}", model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Hugging Face model {} returned HTTP {}", model, status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    RagError::Backend(format!("{} rejected the API token (HTTP {})", model, status))
                }
                _ => RagError::Backend(format!("{} returned HTTP {}: {}", model, status, body)),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RagError::InvalidResponse(format!("{}: {}", model, e)))
    }
}

#[async_trait]
impl Embedder for HuggingFaceClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} texts with {}", texts.len(), self.embedding_model);

        let request = self
            .client
            .post(self.embedding_url())
            .json(&EmbeddingRequest { inputs: texts });
        let response: EmbeddingResponse = self.send(request, &self.embedding_model).await?;
        let vectors = response.into_vectors();

        if vectors.len() != texts.len() || vectors.iter().any(|v| v.is_empty()) {
            return Err(RagError::InvalidResponse(format!(
                "{} returned {} embeddings for {} inputs",
                self.embedding_model,
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Generator for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let request = self.client.post(self.generation_url()).json(&GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                return_full_text: false,
            },
        });
        let response: GenerationResponse = self.send(request, &self.generation_model).await?;

        match response {
            GenerationResponse::Single(generated) => Ok(generated.generated_text),
            GenerationResponse::List(list) => list
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| RagError::InvalidResponse("empty generation response".to_string())),
        }
    }
}
