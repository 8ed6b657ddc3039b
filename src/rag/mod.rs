//! Retrieval-augmented answering over one fixed reference document.
//!
//! The document is loaded, split and embedded once; each question is
//! embedded, matched against the passages and answered by a generative
//! model from the best passages.

pub mod huggingface;
pub mod index;
pub mod loader;
pub mod prompt;
pub mod splitter;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use index::VectorIndex;

/// Passages sent to the embedder per request while indexing
const EMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Failed to load reference document: {0}")]
    Load(String),

    #[error("Reference document {0} contains no text")]
    EmptyDocument(PathBuf),

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("Model backend unavailable: {0}")]
    Backend(String),

    #[error("Unexpected model response: {0}")]
    InvalidResponse(String),
}

/// Turns text into dense vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed several texts; output order matches input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::InvalidResponse("empty embedding response".to_string()))
    }
}

/// Completes a prompt with free text
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

#[derive(Debug, Clone)]
pub struct RagOptions {
    pub top_k: usize,
    pub sentences_per_passage: usize,
}

impl Default for RagOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            sentences_per_passage: 2,
        }
    }
}

pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: VectorIndex,
    top_k: usize,
}

impl RagPipeline {
    /// Load, split and index the document at `path`
    pub async fn build(
        path: &Path,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: RagOptions,
    ) -> Result<Self, RagError> {
        let text = loader::load_document(path).await?;
        Self::from_text(&text, embedder, generator, options).await
    }

    /// Index already-extracted document text
    pub async fn from_text(
        text: &str,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: RagOptions,
    ) -> Result<Self, RagError> {
        let start = Instant::now();
        let passages = splitter::split_into_passages(text, options.sentences_per_passage);
        if passages.is_empty() {
            return Err(RagError::Load("document produced no passages".to_string()));
        }

        let mut embeddings = Vec::with_capacity(passages.len());
        for batch in passages.chunks(EMBED_BATCH_SIZE) {
            let vectors = embedder.embed_batch(batch).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let index = VectorIndex::from_embeddings(passages, embeddings);
        info!(
            "Indexed {} passages in {}ms",
            index.len(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            embedder,
            generator,
            index,
            top_k: options.top_k.max(1),
        })
    }

    pub fn passage_count(&self) -> usize {
        self.index.len()
    }

    /// Answer one question from the indexed document.
    ///
    /// The generator's text is returned as-is apart from surrounding
    /// whitespace; an "I don't know" reply is a valid answer.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let query_embedding = self.embedder.embed(question).await?;
        let passages = self.index.search(&query_embedding, self.top_k);
        debug!(
            "Retrieved passages {:?} for question",
            passages.iter().map(|p| p.passage.id).collect::<Vec<_>>()
        );

        let prompt = prompt::build_prompt(question, &passages);
        let answer = self.generator.generate(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}
