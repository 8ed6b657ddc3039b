pub mod config;
pub mod errors;
pub mod identity;
pub mod models;
pub mod ner;
pub mod ocr;
pub mod rag;
pub mod routes;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;


use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use config::Config;
use identity::IdentityExtractor;
use ner::create_ner_backend;
use ocr::{factory::create_ocr_engine, OcrConfig, OcrService};
use rag::{huggingface::HuggingFaceClient, RagOptions, RagPipeline};

/// Shared, read-only state handed to every request handler
pub struct AppState {
    pub config: Config,
    pub identity: Arc<IdentityExtractor>,
    pub rag: Arc<RagPipeline>,
}

impl AppState {
    /// Build every engine and index the reference document.
    ///
    /// Fails if any backend is misconfigured or the document cannot be
    /// indexed; the service never starts half-initialized.
    pub async fn from_config(config: Config) -> Result<Self> {
        let client = build_http_client(&config)?;
        let identity = build_identity_extractor(&config, client.clone())?;
        let rag = build_rag_pipeline(&config, client).await?;

        Ok(Self {
            config,
            identity: Arc::new(identity),
            rag: Arc::new(rag),
        })
    }
}

/// HTTP client shared by the remote OCR, NER and model backends
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .context("Failed to build HTTP client")
}

pub fn build_identity_extractor(config: &Config, client: reqwest::Client) -> Result<IdentityExtractor> {
    let engine = create_ocr_engine(config, client.clone())?;
    let ner = create_ner_backend(config, client)?;
    info!("Identity pipeline: OCR={} NER={}", engine.engine_id(), ner.backend_id());

    let ocr = OcrService::new_with_config(
        engine,
        OcrConfig {
            confidence_threshold: config.ocr_confidence_threshold,
            deskew: config.deskew_images,
        },
    );
    Ok(IdentityExtractor::new(ocr, ner))
}

pub async fn build_rag_pipeline(config: &Config, client: reqwest::Client) -> Result<RagPipeline> {
    let token = config.require_huggingface_token()?;
    let document = config.require_reference_document()?;

    let models = Arc::new(HuggingFaceClient::new(
        client,
        config.hf_inference_url.clone(),
        token,
        config.embedding_model.clone(),
        config.generation_model.clone(),
    ));

    info!("Indexing reference document {}", document.display());
    RagPipeline::build(
        document,
        models.clone(),
        models,
        RagOptions {
            top_k: config.rag_top_k,
            sentences_per_passage: config.rag_sentences_per_passage,
        },
    )
    .await
    .with_context(|| format!("Failed to index reference document {}", document.display()))
}
